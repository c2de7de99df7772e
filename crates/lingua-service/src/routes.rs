//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, instructors, payments, programs, selections, tokens, users};
use crate::state::AppState;

// ============================================================================
// Concurrency Limiting Constants
// ============================================================================

/// Maximum concurrent requests for payment endpoints.
/// Each one may wait on the payment gateway.
const PAYMENT_MAX_CONCURRENT_REQUESTS: usize = 25;

/// Maximum concurrent requests for general API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /`, `GET /health` - Health check
/// - `POST /jwt` - Issue an access token
///
/// ## Users
/// - `GET /users`, `POST /users`
/// - `GET /users/role/:email`
/// - `PATCH /users/:id` - Set role (admin gate)
///
/// ## Programs
/// - `GET /programs`, `POST /programs`
/// - `GET /programs/popular`
/// - `GET /programs/:email` - By instructor; `PATCH /programs/:id` - Set status (admin gate)
/// - `GET /programs/program/:id`
/// - `PATCH /programs/feedback/:id` - Set feedback (admin gate)
///
/// ## Instructors
/// - `GET /instructors`, `GET /instructors/popular`
///
/// ## Enrollment
/// - `GET /selected-programs/:email`; `DELETE /selected-programs/:id`
/// - `GET /selected-programs/program/:id`
/// - `POST /selected-programs`
/// - `POST /create-payment-intent` (bearer token)
/// - `POST /payments` (bearer token)
/// - `GET /enrolled-programs/:email`, `GET /payment-history/:email`
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let payment_routes = Router::new()
        .route(
            "/create-payment-intent",
            post(payments::create_payment_intent),
        )
        .route("/payments", post(payments::complete_payment))
        .layer(ConcurrencyLimitLayer::new(PAYMENT_MAX_CONCURRENT_REQUESTS));

    let api_routes = Router::new()
        .route("/jwt", post(tokens::issue))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/role/:email", get(users::get_role))
        .route("/users/:id", patch(users::set_role))
        // Programs
        .route(
            "/programs",
            get(programs::list_programs).post(programs::create_program),
        )
        .route("/programs/popular", get(programs::popular))
        .route(
            "/programs/:key",
            get(programs::by_instructor).patch(programs::set_status),
        )
        .route("/programs/program/:id", get(programs::get_program))
        .route("/programs/feedback/:id", patch(programs::set_feedback))
        // Instructors
        .route("/instructors", get(instructors::list_instructors))
        .route("/instructors/popular", get(instructors::popular))
        // Enrollment
        .route("/selected-programs", post(selections::select))
        .route(
            "/selected-programs/:key",
            get(selections::list_for_email).delete(selections::unselect),
        )
        .route(
            "/selected-programs/program/:id",
            get(selections::get_selection),
        )
        .route(
            "/enrolled-programs/:email",
            get(payments::enrolled_programs),
        )
        .route("/payment-history/:email", get(payments::payment_history))
        .merge(payment_routes)
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/", get(health::health))
        .route("/health", get(health::health))
        .merge(api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
