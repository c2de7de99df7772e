//! Error types for LinguaEase storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Collection the record was looked up in.
        entity: &'static str,
        /// The id or key that was looked up.
        id: String,
    },

    /// A uniqueness constraint was violated.
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// Collection holding the conflicting record.
        entity: &'static str,
        /// The duplicated key.
        key: String,
    },

    /// The selection a payment settles no longer exists.
    #[error("selection already settled or removed: {selection_id}")]
    StaleSelection {
        /// The selection id named by the payment.
        selection_id: String,
    },

    /// The selection a payment settles belongs to another email or program.
    #[error("selection {selection_id} does not match the payment")]
    SelectionMismatch {
        /// The selection id named by the payment.
        selection_id: String,
    },
}

impl StoreError {
    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub(crate) fn poisoned() -> Self {
        Self::Database("store lock poisoned".into())
    }
}
