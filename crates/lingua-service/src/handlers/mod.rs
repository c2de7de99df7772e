//! API handlers.

pub mod health;
pub mod instructors;
pub mod payments;
pub mod programs;
pub mod selections;
pub mod tokens;
pub mod users;
