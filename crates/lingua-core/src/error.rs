//! Error types for domain validation.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised while validating marketplace input.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Unknown role name.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// Unknown program status name.
    #[error("unknown program status: {0}")]
    UnknownStatus(String),

    /// Invalid monetary amount.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid program submission.
    #[error("invalid program: {0}")]
    InvalidProgram(String),

    /// Invalid email address.
    #[error("invalid email: {0}")]
    InvalidEmail(String),

    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),
}
