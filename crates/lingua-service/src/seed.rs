//! Catalog seeding at startup.
//!
//! Instructors are read-only over HTTP, so they are loaded from a JSON file:
//!
//! ```json
//! { "instructors": [ { "id": "...", "name": "...", "email": "..." } ],
//!   "programs":    [ { "id": "...", "name": "...", ... } ] }
//! ```
//!
//! Documents are inserted only when their id is not stored yet. A restart
//! against a persistent store keeps enrollment counters and moderation
//! state instead of resetting them to the file's values.

use std::path::Path;

use serde::Deserialize;

use lingua_core::{normalize_email, Instructor, Program};
use lingua_store::{Store, StoreError};

/// Seed file contents.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    /// Instructor profiles.
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    /// Programs.
    #[serde(default)]
    pub programs: Vec<Program>,
}

/// Errors loading a seed file.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    /// The file could not be read.
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid seed JSON.
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Writing to the store failed.
    #[error("failed to store seed data: {0}")]
    Store(#[from] StoreError),
}

/// Counts of documents handled by a seed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    /// Instructors inserted.
    pub instructors: usize,
    /// Programs inserted.
    pub programs: usize,
    /// Documents skipped because their id was already stored.
    pub skipped: usize,
}

impl SeedData {
    /// Read seed data from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `SeedError` if the file is missing or malformed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Insert every document whose id is not in `store` yet. Emails are
    /// normalized first.
    ///
    /// # Errors
    ///
    /// Returns `SeedError::Store` on the first failed write.
    pub fn apply(self, store: &dyn Store) -> Result<SeedSummary, SeedError> {
        let mut summary = SeedSummary::default();

        for mut instructor in self.instructors {
            if let Ok(email) = normalize_email(&instructor.email) {
                instructor.email = email;
            }
            if store.insert_instructor_if_absent(&instructor)? {
                summary.instructors += 1;
            } else {
                summary.skipped += 1;
            }
        }

        for mut program in self.programs {
            if let Ok(email) = normalize_email(&program.instructor_email) {
                program.instructor_email = email;
            }
            if store.insert_program_if_absent(&program)? {
                summary.programs += 1;
            } else {
                summary.skipped += 1;
            }
        }

        tracing::info!(
            instructors = summary.instructors,
            programs = summary.programs,
            skipped = summary.skipped,
            "Seed data loaded"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lingua_core::{PaymentCompletion, ProgramStatus, SelectedProgram};
    use lingua_store::MemoryStore;

    const SEED: &str = r#"{
        "instructors": [
            {"id": "I1", "name": "Ana", "email": "Ana@X.com"}
        ],
        "programs": [
            {
                "id": "P1",
                "name": "Spanish",
                "image": null,
                "instructor_name": "Ana",
                "instructor_email": "ana@x.com",
                "available_seats": 10,
                "price": 20.0,
                "enrolled": 3,
                "status": "approved",
                "feedback": "N/A",
                "created_at": "2024-01-01T00:00:00Z"
            }
        ]
    }"#;

    #[test]
    fn seed_is_applied_and_normalized() {
        let store = MemoryStore::new();
        let seed: SeedData = serde_json::from_str(SEED).unwrap();

        let summary = seed.apply(&store).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                instructors: 1,
                programs: 1,
                skipped: 0
            }
        );
        let instructors = store.list_instructors().unwrap();
        assert_eq!(instructors[0].email, "ana@x.com");
        assert_eq!(store.list_programs().unwrap()[0].enrolled, 3);
    }

    #[test]
    fn reapplying_is_idempotent() {
        let store = MemoryStore::new();
        let first: SeedData = serde_json::from_str(SEED).unwrap();
        first.apply(&store).unwrap();

        let second: SeedData = serde_json::from_str(SEED).unwrap();
        let summary = second.apply(&store).unwrap();

        assert_eq!(
            summary,
            SeedSummary {
                instructors: 0,
                programs: 0,
                skipped: 2
            }
        );
        assert_eq!(store.list_programs().unwrap().len(), 1);
        assert_eq!(store.list_instructors().unwrap().len(), 1);
    }

    #[test]
    fn reapplying_keeps_enrollment_and_moderation() {
        let store = MemoryStore::new();
        let seed: SeedData = serde_json::from_str(SEED).unwrap();
        seed.apply(&store).unwrap();

        let program_id: lingua_core::ProgramId = "P1".parse().unwrap();
        let selection = SelectedProgram::new("a@x.com", program_id.clone());
        store.insert_selection(&selection).unwrap();
        store
            .complete_payment(&PaymentCompletion::new(
                selection.id,
                "a@x.com",
                program_id.clone(),
                2000,
                None,
            ))
            .unwrap();
        store
            .set_program_status(&program_id, ProgramStatus::Denied)
            .unwrap();
        store
            .set_program_feedback(&program_id, "Needs a syllabus")
            .unwrap();

        let reload: SeedData = serde_json::from_str(SEED).unwrap();
        reload.apply(&store).unwrap();

        let program = store.get_program(&program_id).unwrap().unwrap();
        assert_eq!(program.enrolled, 4);
        assert_eq!(program.status, ProgramStatus::Denied);
        assert_eq!(program.feedback, "Needs a syllabus");
        assert_eq!(store.list_payments_by_email("a@x.com").unwrap().len(), 1);
    }

    #[test]
    fn empty_object_is_valid() {
        let seed: SeedData = serde_json::from_str("{}").unwrap();
        assert!(seed.instructors.is_empty());
        assert!(seed.programs.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            SeedData::from_file("/nonexistent/seed.json"),
            Err(SeedError::Io(_))
        ));
    }
}
