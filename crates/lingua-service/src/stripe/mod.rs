//! Stripe integration for course payments.
//!
//! The browser confirms card payments itself; the server only creates the
//! payment intent and hands back its client secret.

pub mod client;
pub mod types;

use async_trait::async_trait;

pub use client::StripeClient;
pub use client::StripeError;
pub use types::*;

/// Creates payment intents with an external gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an intent to charge `amount_cents` and return its client secret.
    async fn create_payment_intent(
        &self,
        amount_cents: i64,
        currency: &str,
    ) -> Result<String, StripeError>;
}
