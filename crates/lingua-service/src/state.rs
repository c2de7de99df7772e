//! Application state.

use std::sync::Arc;

use lingua_store::Store;

use crate::config::ServiceConfig;
use crate::stripe::{PaymentGateway, StripeClient};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Payment gateway (optional).
    pub payments: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// A Stripe client is built when a secret key is configured.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let payments = config.stripe_secret_key.as_ref().and_then(|key| {
            match StripeClient::new(key, config.stripe_api_base.clone()) {
                Ok(client) => {
                    tracing::info!("Stripe integration enabled");
                    Some(Arc::new(client) as Arc<dyn PaymentGateway>)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Stripe client");
                    None
                }
            }
        });

        if payments.is_none() {
            tracing::warn!("Stripe not configured - payment intents will not be available");
        }

        if config.token_secret.is_none() {
            tracing::warn!("ACCESS_TOKEN_SECRET not set - protected routes will reject every request");
        }

        Self {
            store,
            config,
            payments,
        }
    }

    /// Replace the payment gateway.
    #[must_use]
    pub fn with_payment_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.payments = Some(gateway);
        self
    }

    /// Check if a payment gateway is configured.
    #[must_use]
    pub fn has_payments(&self) -> bool {
        self.payments.is_some()
    }
}
