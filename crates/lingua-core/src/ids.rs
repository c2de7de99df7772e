//! Identifier types for LinguaEase documents.
//!
//! Every document id is an opaque, non-empty string. Ids minted by this
//! service are ULIDs from one process-wide monotonic generator, so they sort
//! strictly by creation order even within a millisecond. Ids coming in over
//! the wire (or from a seed file) are accepted as-is.
//!
//! # Macro-based ID Types
//!
//! The `document_id_type!` macro reduces boilerplate for the string-backed
//! identifier types, keeping serialization, parsing, and display consistent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock, PoisonError};
use ulid::{Generator, Ulid};

/// Maximum accepted length of an identifier, in bytes.
pub const MAX_ID_LEN: usize = 128;

/// Macro to define a string-backed identifier type with standard trait implementations.
///
/// This macro generates a newtype wrapper around `String` with implementations for:
/// - `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as string, validated)
/// - `FromStr`, `Display`, `Debug`
/// - `TryFrom<String>`, `Into<String>`
/// - `AsRef<str>`
///
/// # Example
///
/// ```ignore
/// document_id_type!(MyId, "A custom identifier type.");
/// let id = MyId::generate();
/// let parsed: MyId = id.to_string().parse().unwrap();
/// ```
macro_rules! document_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(next_ulid().to_string())
            }

            /// Return the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return the bytes of the identifier (used for storage keys).
            #[must_use]
            pub fn as_bytes(&self) -> &[u8] {
                self.0.as_bytes()
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                validate(s)?;
                Ok(Self(s.to_string()))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                validate(&value)?;
                Ok(Self(value))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

document_id_type!(UserId, "A user document identifier.");
document_id_type!(ProgramId, "A program (course offering) identifier.\n\nReferenced by selections and payments as `programId`.");
document_id_type!(InstructorId, "An instructor profile identifier.");
document_id_type!(SelectionId, "A selected-program identifier (a pending enrollment intent).");
document_id_type!(PaymentId, "A payment record identifier.");

/// Next ULID from the shared generator.
///
/// Falls back to a fresh random ULID if the random part overflows within one
/// millisecond.
fn next_ulid() -> Ulid {
    static GENERATOR: OnceLock<Mutex<Generator>> = OnceLock::new();
    let mut generator = GENERATOR
        .get_or_init(|| Mutex::new(Generator::new()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    generator.generate().unwrap_or_else(|_| Ulid::new())
}

fn validate(s: &str) -> Result<(), IdError> {
    if s.trim().is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() > MAX_ID_LEN {
        return Err(IdError::TooLong { len: s.len() });
    }
    // Ids are embedded in composite storage keys separated by NUL.
    if s.contains('\0') {
        return Err(IdError::InvalidCharacter);
    }
    Ok(())
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input is empty or whitespace.
    #[error("identifier must not be empty")]
    Empty,

    /// The input exceeds [`MAX_ID_LEN`].
    #[error("identifier too long ({len} bytes)")]
    TooLong {
        /// Length of the rejected input.
        len: usize,
    },

    /// The input contains a NUL byte.
    #[error("identifier contains an invalid character")]
    InvalidCharacter,
}
