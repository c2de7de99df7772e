//! Enrollment types: pending selections and completed payments.
//!
//! A student's interest in a program moves through
//! `none -> selected -> paid`. A [`SelectedProgram`] is the `selected` state;
//! completing payment removes it and records an immutable [`Payment`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PaymentId, Program, ProgramId, SelectionId};

/// A student's pending (unpaid) intent to enroll in a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedProgram {
    /// Document id.
    pub id: SelectionId,

    /// Student email.
    pub email: String,

    /// The selected program.
    pub program_id: ProgramId,

    /// When the program was selected.
    pub created_at: DateTime<Utc>,
}

impl SelectedProgram {
    /// Create a new selection with a fresh id.
    #[must_use]
    pub fn new(email: impl Into<String>, program_id: ProgramId) -> Self {
        Self {
            id: SelectionId::generate(),
            email: email.into(),
            program_id,
            created_at: Utc::now(),
        }
    }
}

/// A completed payment.
///
/// Created in the same atomic write that increments the program's enrollment
/// counter and removes the originating selection. Never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Document id.
    pub id: PaymentId,

    /// Student email.
    pub email: String,

    /// The program paid for.
    pub program_id: ProgramId,

    /// Amount paid, in minor currency units.
    pub amount_cents: i64,

    /// Gateway transaction reference, if the client supplied one.
    pub transaction_id: Option<String>,

    /// When the payment was recorded.
    pub date: DateTime<Utc>,
}

/// A payment submission: the payment to record plus the selection it settles.
#[derive(Debug, Clone)]
pub struct PaymentCompletion {
    /// The selection to remove. Not persisted on the payment.
    pub selection_id: SelectionId,

    /// The payment to insert.
    pub payment: Payment,
}

impl PaymentCompletion {
    /// Build a completion for `email` paying `amount_cents` for `program_id`.
    #[must_use]
    pub fn new(
        selection_id: SelectionId,
        email: impl Into<String>,
        program_id: ProgramId,
        amount_cents: i64,
        transaction_id: Option<String>,
    ) -> Self {
        Self {
            selection_id,
            payment: Payment {
                id: PaymentId::generate(),
                email: email.into(),
                program_id,
                amount_cents,
                transaction_id,
                date: Utc::now(),
            },
        }
    }
}

/// A record joined with the program it references.
///
/// `program` is `None` when no program with the referenced id exists; a
/// dangling reference is not an error.
#[derive(Debug, Clone)]
pub struct WithProgram<T> {
    /// The record that carries the reference.
    pub record: T,

    /// The matched program, if any.
    pub program: Option<Program>,
}

impl<T> WithProgram<T> {
    /// Pair a record with an optional program.
    #[must_use]
    pub const fn new(record: T, program: Option<Program>) -> Self {
        Self { record, program }
    }
}
