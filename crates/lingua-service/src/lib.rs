//! LinguaEase HTTP API Service.
//!
//! This crate provides the HTTP API for the LinguaEase course marketplace:
//!
//! - Users and roles
//! - Program catalog and popularity rankings
//! - Program selection, payment intents and payment completion
//!
//! # Authentication
//!
//! `POST /jwt` signs whatever claims the client submits into a one-hour
//! bearer token. Payment routes require that token. Moderation routes can
//! additionally require an admin token (`ENFORCE_ADMIN_ROLES`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Store calls are sync; handlers stay async for Axum

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod seed;
pub mod state;
pub mod stripe;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use seed::SeedData;
pub use state::AppState;
pub use stripe::{PaymentGateway, StripeClient, StripeError};
