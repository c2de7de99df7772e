//! Program and instructor types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::{InstructorId, ProgramId};

/// Feedback value of a program no admin has commented on.
pub const DEFAULT_FEEDBACK: &str = "N/A";

/// A course offering.
///
/// `instructor_email` references an instructor by value; nothing enforces that
/// an instructor with that email exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    /// Document id.
    pub id: ProgramId,

    /// Program title.
    pub name: String,

    /// Cover image URL.
    pub image: Option<String>,

    /// Instructor display name.
    pub instructor_name: String,

    /// Instructor email.
    pub instructor_email: String,

    /// Seats advertised for the program.
    pub available_seats: u32,

    /// Price in the store currency's major unit.
    pub price: f64,

    /// Number of completed payments referencing this program.
    pub enrolled: u64,

    /// Approval status.
    pub status: ProgramStatus,

    /// Admin feedback.
    pub feedback: String,

    /// When the program was submitted.
    pub created_at: DateTime<Utc>,
}

impl Program {
    /// Create a freshly submitted program: pending, nobody enrolled, no feedback.
    #[must_use]
    pub fn submit(submission: NewProgram) -> Self {
        Self {
            id: ProgramId::generate(),
            name: submission.name,
            image: submission.image,
            instructor_name: submission.instructor_name,
            instructor_email: submission.instructor_email,
            available_seats: submission.available_seats,
            price: submission.price,
            enrolled: 0,
            status: ProgramStatus::Pending,
            feedback: DEFAULT_FEEDBACK.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Fields an instructor supplies when submitting a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProgram {
    /// Program title.
    pub name: String,
    /// Cover image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Instructor display name.
    pub instructor_name: String,
    /// Instructor email.
    pub instructor_email: String,
    /// Seats advertised.
    #[serde(default)]
    pub available_seats: u32,
    /// Price.
    pub price: f64,
}

impl NewProgram {
    /// Check the submission for obviously bad input.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidProgram` if a required field is blank or
    /// the price is negative or not finite.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::InvalidProgram("name is required".into()));
        }
        if self.instructor_email.trim().is_empty() {
            return Err(CatalogError::InvalidProgram(
                "instructor_email is required".into(),
            ));
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CatalogError::InvalidProgram(
                "price must be a non-negative number".into(),
            ));
        }
        Ok(())
    }
}

/// Approval status of a program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramStatus {
    /// Awaiting admin review.
    #[default]
    Pending,

    /// Visible to students.
    Approved,

    /// Rejected by an admin.
    Denied,
}

impl ProgramStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgramStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "denied" => Ok(Self::Denied),
            other => Err(CatalogError::UnknownStatus(other.to_string())),
        }
    }
}

/// An instructor profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    /// Document id.
    pub id: InstructorId,

    /// Display name.
    pub name: String,

    /// Email, matched against `Program::instructor_email`.
    pub email: String,

    /// Portrait URL.
    #[serde(default)]
    pub image: Option<String>,

    /// Free-form profile fields (bio, languages, ...).
    #[serde(default)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> NewProgram {
        NewProgram {
            name: "Conversational Spanish".into(),
            image: None,
            instructor_name: "Ana".into(),
            instructor_email: "ana@x.com".into(),
            available_seats: 20,
            price: 49.5,
        }
    }

    #[test]
    fn submitted_program_defaults() {
        let program = Program::submit(submission());
        assert_eq!(program.status, ProgramStatus::Pending);
        assert_eq!(program.enrolled, 0);
        assert_eq!(program.feedback, "N/A");
    }

    #[test]
    fn submission_validation() {
        assert!(submission().validate().is_ok());

        let mut bad = submission();
        bad.name = " ".into();
        assert!(bad.validate().is_err());

        let mut bad = submission();
        bad.price = f64::NAN;
        assert!(bad.validate().is_err());

        let mut bad = submission();
        bad.price = -1.0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn status_parsing() {
        assert_eq!("approved".parse::<ProgramStatus>().unwrap(), ProgramStatus::Approved);
        assert_eq!("DENIED".parse::<ProgramStatus>().unwrap(), ProgramStatus::Denied);
        assert!("archived".parse::<ProgramStatus>().is_err());
    }
}
