//! Common test utilities for lingua-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use axum_test::TestServer;

use lingua_core::{Instructor, NewProgram, Program, ProgramId};
use lingua_service::auth::issue_token;
use lingua_service::{create_router, AppState, PaymentGateway, ServiceConfig, StripeError};
use lingua_store::{MemoryStore, Store};

/// Token signing secret used by every harness.
pub const TEST_SECRET: &str = "test-secret";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct setup and inspection.
    pub store: Arc<MemoryStore>,
    /// The configuration the server was built with.
    pub config: ServiceConfig,
}

impl TestHarness {
    /// Create a new test harness with a fresh store.
    pub fn new() -> Self {
        Self::build(test_config(), None)
    }

    /// Create a harness with custom configuration.
    pub fn with_config(config: ServiceConfig) -> Self {
        Self::build(config, None)
    }

    /// Create a harness whose payment gateway is `gateway`.
    pub fn with_gateway(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self::build(test_config(), Some(gateway))
    }

    fn build(config: ServiceConfig, gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        let store = Arc::new(MemoryStore::new());

        let mut state = AppState::new(Arc::clone(&store) as Arc<dyn Store>, config.clone());
        if let Some(gateway) = gateway {
            state = state.with_payment_gateway(gateway);
        }
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            config,
        }
    }

    /// A valid token whose `email` claim is `email`.
    pub fn token_for(&self, email: &str) -> String {
        let serde_json::Value::Object(claims) = serde_json::json!({ "email": email }) else {
            unreachable!()
        };
        issue_token(TEST_SECRET, 3600, claims).expect("Failed to issue token")
    }

    /// Authorization header for `email`.
    pub fn auth_header(&self, email: &str) -> (HeaderName, HeaderValue) {
        bearer(&self.token_for(email))
    }

    /// Store a program with the given instructor and enrollment.
    pub fn seed_program(&self, id: &str, instructor_email: &str, enrolled: u64) -> Program {
        let mut program = Program::submit(NewProgram {
            name: format!("Program {id}"),
            image: None,
            instructor_name: "Instructor".into(),
            instructor_email: instructor_email.into(),
            available_seats: 20,
            price: 50.0,
        });
        program.id = id.parse::<ProgramId>().expect("valid program id");
        program.enrolled = enrolled;
        self.store.put_program(&program).expect("Failed to store program");
        program
    }

    /// Store an instructor.
    pub fn seed_instructor(&self, id: &str, email: &str) -> Instructor {
        let instructor = Instructor {
            id: id.parse().expect("valid instructor id"),
            name: id.to_uppercase(),
            email: email.into(),
            image: None,
            profile: serde_json::Map::new(),
        };
        self.store
            .put_instructor(&instructor)
            .expect("Failed to store instructor");
        instructor
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration with a token secret and no external services.
pub fn test_config() -> ServiceConfig {
    ServiceConfig {
        listen_addr: "127.0.0.1:0".into(),
        token_secret: Some(TEST_SECRET.into()),
        ..ServiceConfig::default()
    }
}

/// `Authorization: Bearer <token>` header.
pub fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("valid header"),
    )
}

/// Payment gateway that records requests instead of calling Stripe.
#[derive(Default)]
pub struct FakeGateway {
    /// `(amount_cents, currency)` of each request.
    pub calls: Mutex<Vec<(i64, String)>>,
    /// Fail every request.
    pub fail: bool,
}

impl FakeGateway {
    /// A gateway that always fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<String, StripeError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((amount_cents, currency.to_string()));

        if self.fail {
            return Err(StripeError::Api {
                error_type: "card_error".into(),
                message: "Your card was declined.".into(),
                code: Some("card_declined".into()),
            });
        }
        Ok(format!("pi_test_{amount_cents}_secret"))
    }
}
