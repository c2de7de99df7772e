//! User types.
//!
//! A user record is created on first sign-in and keyed by email. The role is
//! the only field mutated afterwards (by an admin).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::UserId;

/// Role string returned by role lookups for emails with no user record.
pub const ROLE_NONE: &str = "none";

/// A marketplace user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document id.
    pub id: UserId,

    /// Email address (unique).
    pub email: String,

    /// Display name, if supplied at sign-in.
    pub name: Option<String>,

    /// Profile photo URL, if supplied at sign-in.
    pub photo_url: Option<String>,

    /// Current role.
    pub role: Role,

    /// When the user first signed in.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new student user.
    #[must_use]
    pub fn new(email: impl Into<String>, name: Option<String>, photo_url: Option<String>) -> Self {
        Self {
            id: UserId::generate(),
            email: email.into(),
            name,
            photo_url,
            role: Role::default(),
            created_at: Utc::now(),
        }
    }
}

/// Normalize an email used as a lookup key.
///
/// Emails are compared case-insensitively and without surrounding whitespace.
///
/// # Errors
///
/// Returns `CatalogError::InvalidEmail` if the input is blank or has no `@`.
pub fn normalize_email(email: &str) -> Result<String, CatalogError> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.contains('\0') {
        return Err(CatalogError::InvalidEmail(trimmed.to_string()));
    }
    Ok(trimmed.to_ascii_lowercase())
}

/// User roles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enrolls in programs. Every new user starts here.
    #[default]
    Student,

    /// Submits programs for approval.
    Instructor,

    /// Approves programs and manages roles.
    Admin,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            other => Err(CatalogError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_is_student() {
        let user = User::new("a@x.com", None, None);
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" instructor ".parse::<Role>().unwrap(), Role::Instructor);
        assert!(matches!(
            "tutor".parse::<Role>(),
            Err(CatalogError::UnknownRole(r)) if r == "tutor"
        ));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  A@X.com ").unwrap(), "a@x.com");
        assert!(normalize_email("").is_err());
        assert!(normalize_email("nobody").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(Role::Instructor.to_string(), "instructor");
    }
}
