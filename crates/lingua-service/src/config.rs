//! Service configuration.

use serde::Deserialize;
use std::path::Path;

/// Default address to listen on.
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5000";

/// Default Stripe API base URL.
pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:5000", `PORT` overrides the port).
    pub listen_addr: String,

    /// Path to the `RocksDB` data directory. Only used with the
    /// `rocksdb-backend` feature; otherwise data lives in memory.
    pub data_dir: Option<String>,

    /// Secret used to sign and verify access tokens.
    pub token_secret: Option<String>,

    /// Access token lifetime in seconds (default: 3600).
    pub token_ttl_seconds: u64,

    /// Stripe secret key (optional).
    pub stripe_secret_key: Option<String>,

    /// Stripe API base URL.
    pub stripe_api_base: String,

    /// ISO currency code for payment intents (default: "usd").
    pub payment_currency: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Require an admin token on role and program moderation routes.
    pub enforce_admin_roles: bool,

    /// JSON file with instructors and programs loaded at startup (optional).
    pub seed_file: Option<String>,
}

/// Stripe secrets file structure.
#[derive(Debug, Deserialize)]
struct StripeSecrets {
    secret_key: String,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let listen_addr = std::env::var("LISTEN_ADDR").unwrap_or_else(|_| {
            std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .map_or_else(|| DEFAULT_LISTEN_ADDR.into(), |port| format!("0.0.0.0:{port}"))
        });

        Self {
            listen_addr,
            data_dir: std::env::var("DATA_DIR").ok(),
            token_secret: std::env::var("ACCESS_TOKEN_SECRET").ok(),
            token_ttl_seconds: parse_env("TOKEN_TTL_SECONDS").unwrap_or(defaults.token_ttl_seconds),
            stripe_secret_key: load_stripe_secret(),
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| DEFAULT_STRIPE_API_BASE.into()),
            payment_currency: std::env::var("PAYMENT_CURRENCY")
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or(defaults.payment_currency),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: parse_env("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: parse_env("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
            enforce_admin_roles: std::env::var("ENFORCE_ADMIN_ROLES")
                .is_ok_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes")),
            seed_file: std::env::var("SEED_FILE").ok(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

/// Load the Stripe secret key from file or environment.
fn load_stripe_secret() -> Option<String> {
    let secret_paths = [".secrets/stripe.json", "../.secrets/stripe.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<StripeSecrets>(path) {
            tracing::info!(path = %path, "Loaded Stripe secrets from file");
            return Some(secrets.secret_key);
        }
    }

    // Fall back to environment variables
    tracing::debug!("Stripe secrets file not found, using environment variables");
    std::env::var("STRIPE_SECRET_KEY")
        .or_else(|_| std::env::var("PAYMENT_SECRET_KEY"))
        .ok()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.into(),
            data_dir: None,
            token_secret: None,
            token_ttl_seconds: 3600,
            stripe_secret_key: None,
            stripe_api_base: DEFAULT_STRIPE_API_BASE.into(),
            payment_currency: "usd".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            enforce_admin_roles: false,
            seed_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.listen_addr, "0.0.0.0:5000");
        assert_eq!(config.token_ttl_seconds, 3600);
        assert_eq!(config.payment_currency, "usd");
        assert!(!config.enforce_admin_roles);
        assert!(config.token_secret.is_none());
    }

    #[test]
    fn missing_secrets_file_is_not_found() {
        let err = load_secrets_file::<StripeSecrets>("/nonexistent/stripe.json").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
