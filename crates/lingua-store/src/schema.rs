//! Collection and index names.
//!
//! The `RocksDB` backend maps each name to a column family. Entity names are
//! also used in error messages.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// User documents, keyed by user id.
    pub const USERS: &str = "users";

    /// Index: user id by email. Enforces email uniqueness.
    pub const USERS_BY_EMAIL: &str = "users_by_email";

    /// Program documents, keyed by program id.
    pub const PROGRAMS: &str = "programs";

    /// Instructor documents, keyed by instructor id.
    pub const INSTRUCTORS: &str = "instructors";

    /// Selected-program documents, keyed by selection id.
    pub const SELECTED_PROGRAMS: &str = "selected_programs";

    /// Index: selections by student, keyed by `email || 0x00 || selection_id`.
    /// Value is empty (index only).
    pub const SELECTED_PROGRAMS_BY_EMAIL: &str = "selected_programs_by_email";

    /// Index: selection id by `email || 0x00 || program_id`. Enforces one
    /// active selection per pair.
    pub const SELECTED_PROGRAMS_BY_PAIR: &str = "selected_programs_by_pair";

    /// Payment documents, keyed by payment id (ULID).
    pub const PAYMENTS: &str = "payments";

    /// Index: payments by student, keyed by `email || 0x00 || payment_id`.
    /// Value is empty (index only).
    pub const PAYMENTS_BY_EMAIL: &str = "payments_by_email";
}

/// Entity names used in errors.
pub mod entity {
    /// A user document.
    pub const USER: &str = "user";
    /// A program document.
    pub const PROGRAM: &str = "program";
    /// A selected-program document.
    pub const SELECTION: &str = "selection";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::USERS,
        cf::USERS_BY_EMAIL,
        cf::PROGRAMS,
        cf::INSTRUCTORS,
        cf::SELECTED_PROGRAMS,
        cf::SELECTED_PROGRAMS_BY_EMAIL,
        cf::SELECTED_PROGRAMS_BY_PAIR,
        cf::PAYMENTS,
        cf::PAYMENTS_BY_EMAIL,
    ]
}
