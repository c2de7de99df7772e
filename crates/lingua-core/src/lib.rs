//! Core types for the LinguaEase course marketplace.
//!
//! This crate provides the domain types shared by the store and the HTTP
//! service:
//!
//! - **Identifiers**: `UserId`, `ProgramId`, `InstructorId`, `SelectionId`, `PaymentId`
//! - **Users**: `User`, `Role`
//! - **Catalog**: `Program`, `ProgramStatus`, `Instructor`
//! - **Enrollment**: `SelectedProgram`, `Payment`, `PaymentCompletion`
//! - **Rankings**: popular programs and instructors
//!
//! # Money
//!
//! Prices are quoted in the currency's major unit. Payments are stored as
//! `i64` minor units (cents) to avoid floating point drift.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod enrollment;
pub mod error;
pub mod ids;
pub mod money;
pub mod program;
pub mod ranking;
pub mod user;

pub use enrollment::{Payment, PaymentCompletion, SelectedProgram, WithProgram};
pub use error::{CatalogError, Result};
pub use ids::{IdError, InstructorId, PaymentId, ProgramId, SelectionId, UserId};
pub use program::{Instructor, NewProgram, Program, ProgramStatus, DEFAULT_FEEDBACK};
pub use ranking::{
    popular_instructors, popular_limit, popular_programs, RankedInstructor,
    DEFAULT_POPULAR_LIMIT, MAX_POPULAR_LIMIT,
};
pub use user::{normalize_email, Role, User, ROLE_NONE};
