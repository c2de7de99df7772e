//! Document storage layer for LinguaEase.
//!
//! This crate provides persistent storage for the five marketplace
//! collections: users, programs, instructors, selected programs, and payments.
//!
//! # Backends
//!
//! - [`MemoryStore`]: collections held in process memory behind one lock.
//!   Always available; used by tests and when no data directory is configured.
//! - `RocksStore` (feature `rocksdb-backend`): one column family per
//!   collection plus secondary indexes, with compound operations committed as a
//!   single `WriteBatch`.
//!
//! # Atomicity
//!
//! Operations that must not race are single trait methods, so each backend can
//! make them atomic:
//!
//! - [`Store::insert_user`] rejects a second user with the same email.
//! - [`Store::insert_selection`] rejects a second active selection for the same
//!   (email, program) pair.
//! - [`Store::complete_payment`] increments the program's enrollment counter,
//!   removes the selection, and records the payment as one unit.
//!
//! # Example
//!
//! ```
//! use lingua_core::{NewProgram, Program, SelectedProgram};
//! use lingua_store::{MemoryStore, Store};
//!
//! let store = MemoryStore::new();
//!
//! let program = Program::submit(NewProgram {
//!     name: "Beginner Japanese".into(),
//!     image: None,
//!     instructor_name: "Kenji".into(),
//!     instructor_email: "kenji@example.com".into(),
//!     available_seats: 12,
//!     price: 80.0,
//! });
//! store.put_program(&program).unwrap();
//!
//! let selection = SelectedProgram::new("a@example.com", program.id.clone());
//! store.insert_selection(&selection).unwrap();
//! assert!(store.insert_selection(&SelectedProgram::new("a@example.com", program.id)).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use lingua_core::{
    Instructor, Payment, PaymentCompletion, PaymentId, Program, ProgramId, ProgramStatus, Role,
    SelectedProgram, SelectionId, User, UserId, WithProgram,
};

/// The storage trait defining all database operations.
///
/// Emails passed to and stored through this trait are expected to be
/// normalized already (see `lingua_core::normalize_email`).
pub trait Store: Send + Sync {
    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if a user with the same email exists.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Find a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users in storage order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_users(&self) -> Result<Vec<User>>;

    /// Change a user's role, returning the updated user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user doesn't exist.
    fn set_user_role(&self, id: &UserId, role: Role) -> Result<User>;

    // =========================================================================
    // Program Operations
    // =========================================================================

    /// Insert or replace a program.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_program(&self, program: &Program) -> Result<()>;

    /// Insert a program unless its id is already stored.
    ///
    /// Returns `false` and leaves the stored program untouched when the id
    /// exists, so its counter and moderation state survive.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn insert_program_if_absent(&self, program: &Program) -> Result<bool>;

    /// Get a program by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_program(&self, id: &ProgramId) -> Result<Option<Program>>;

    /// List all programs in storage (id) order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_programs(&self) -> Result<Vec<Program>>;

    /// List programs whose `instructor_email` equals `email`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_programs_by_instructor(&self, email: &str) -> Result<Vec<Program>> {
        Ok(self
            .list_programs()?
            .into_iter()
            .filter(|p| p.instructor_email.eq_ignore_ascii_case(email))
            .collect())
    }

    /// Change a program's approval status, returning the updated program.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the program doesn't exist.
    fn set_program_status(&self, id: &ProgramId, status: ProgramStatus) -> Result<Program>;

    /// Replace a program's admin feedback, returning the updated program.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the program doesn't exist.
    fn set_program_feedback(&self, id: &ProgramId, feedback: &str) -> Result<Program>;

    // =========================================================================
    // Instructor Operations
    // =========================================================================

    /// Insert or replace an instructor profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_instructor(&self, instructor: &Instructor) -> Result<()>;

    /// Insert an instructor profile unless its id is already stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn insert_instructor_if_absent(&self, instructor: &Instructor) -> Result<bool>;

    /// List all instructors in storage (id) order.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_instructors(&self) -> Result<Vec<Instructor>>;

    // =========================================================================
    // Selected Program Operations
    // =========================================================================

    /// Insert a selection unless one already exists for its (email, program) pair.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::AlreadyExists` if the pair already has a selection.
    fn insert_selection(&self, selection: &SelectedProgram) -> Result<()>;

    /// Get a selection by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_selection(&self, id: &SelectionId) -> Result<Option<SelectedProgram>>;

    /// List selections for an email, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_selections_by_email(&self, email: &str) -> Result<Vec<SelectedProgram>>;

    /// Delete a selection by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the selection doesn't exist.
    fn delete_selection(&self, id: &SelectionId) -> Result<()>;

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Get a payment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_payment(&self, id: &PaymentId) -> Result<Option<Payment>>;

    /// List payments for an email, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_payments_by_email(&self, email: &str) -> Result<Vec<Payment>>;

    // =========================================================================
    // Compound Operations
    // =========================================================================

    /// Settle a selection: increment the program's enrollment counter, delete
    /// the selection, and insert the payment, all or nothing.
    ///
    /// Returns the program with its updated counter.
    ///
    /// # Errors
    ///
    /// - `StoreError::StaleSelection` if the selection no longer exists
    ///   (already settled, removed, or never created). Nothing is written.
    /// - `StoreError::SelectionMismatch` if the selection belongs to a different
    ///   email or program than the payment.
    /// - `StoreError::NotFound` if the program doesn't exist.
    fn complete_payment(&self, completion: &PaymentCompletion) -> Result<Program>;

    // =========================================================================
    // Joins
    // =========================================================================

    /// Selections for an email, each paired with its program.
    ///
    /// A selection whose program no longer exists is returned with
    /// `program: None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_selections_with_programs(
        &self,
        email: &str,
    ) -> Result<Vec<WithProgram<SelectedProgram>>> {
        self.list_selections_by_email(email)?
            .into_iter()
            .map(|s| {
                let program = self.get_program(&s.program_id)?;
                Ok(WithProgram::new(s, program))
            })
            .collect()
    }

    /// Payments for an email (newest first), each paired with its program.
    ///
    /// A payment whose program no longer exists is returned with
    /// `program: None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_payments_with_programs(&self, email: &str) -> Result<Vec<WithProgram<Payment>>> {
        self.list_payments_by_email(email)?
            .into_iter()
            .map(|p| {
                let program = self.get_program(&p.program_id)?;
                Ok(WithProgram::new(p, program))
            })
            .collect()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Flush pending writes before shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to flush.
    fn close(&self) -> Result<()>;
}
