//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CLEMENTINE_DATABASE_URL` - `PostgreSQL` connection string
//! - `ACCESS_TOKEN_SECRET` - HS256 signing secret for access tokens (min 32 chars, high entropy)
//! - `REFRESH_TOKEN_SECRET` - HS256 signing secret for refresh tokens (min 32 chars, high entropy)
//! - `PAYMENT_API_KEY` - Payment provider API key
//! - `PAYMENT_WEBHOOK_SECRET` - Shared secret for webhook signature verification
//! - `PAYMENT_API_BASE` - Payment provider base URL
//! - `FRONTEND_ORIGIN` - Allowed CORS origin for the web frontend
//!
//! ## Optional
//! - `CLEMENTINE_HOST` - Bind address (default: 127.0.0.1)
//! - `CLEMENTINE_PORT` - Listen port (default: 3000)
//! - `MEDIA_BASE_URL` - Public base URL for product image links
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// HS256 signing secret for short-lived access tokens
    pub access_token_secret: SecretString,
    /// HS256 signing secret for long-lived refresh tokens
    pub refresh_token_secret: SecretString,
    /// Payment provider configuration
    pub payment: PaymentConfig,
    /// Allowed CORS origin for the web frontend
    pub frontend_origin: String,
    /// Public base URL for product image links
    pub media_base_url: Option<String>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Payment provider configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct PaymentConfig {
    /// Provider base URL (e.g., `https://api.payments.example`)
    pub api_base: String,
    /// Provider API key, sent as a bearer credential
    pub api_key: SecretString,
    /// Shared secret for verifying webhook signatures
    pub webhook_secret: SecretString,
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .field("webhook_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CLEMENTINE_DATABASE_URL")?;
        let host = get_env_or_default("CLEMENTINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("CLEMENTINE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLEMENTINE_PORT".to_string(), e.to_string())
            })?;

        let access_token_secret = get_validated_secret("ACCESS_TOKEN_SECRET")?;
        validate_token_secret(&access_token_secret, "ACCESS_TOKEN_SECRET")?;
        let refresh_token_secret = get_validated_secret("REFRESH_TOKEN_SECRET")?;
        validate_token_secret(&refresh_token_secret, "REFRESH_TOKEN_SECRET")?;

        let payment = PaymentConfig::from_env()?;
        let frontend_origin = get_required_env("FRONTEND_ORIGIN")?;
        let media_base_url = get_optional_env("MEDIA_BASE_URL");
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            access_token_secret,
            refresh_token_secret,
            payment,
            frontend_origin,
            media_base_url,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl PaymentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_base: get_required_env("PAYMENT_API_BASE")?,
            api_key: get_validated_secret("PAYMENT_API_KEY")?,
            webhook_secret: get_validated_secret("PAYMENT_WEBHOOK_SECRET")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., CLEMENTINE_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by managed postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a token signing secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_token_secret(&secret, "TEST_TOKEN");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_token_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_token_secret(&secret, "TEST_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            access_token_secret: SecretString::from("x".repeat(32)),
            refresh_token_secret: SecretString::from("y".repeat(32)),
            payment: PaymentConfig {
                api_base: "https://api.payments.test".to_string(),
                api_key: SecretString::from("key"),
                webhook_secret: SecretString::from("whsec"),
            },
            frontend_origin: "http://localhost:5173".to_string(),
            media_base_url: None,
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_payment_config_debug_redacts_secrets() {
        let config = PaymentConfig {
            api_base: "https://api.payments.test".to_string(),
            api_key: SecretString::from("super_secret_api_key"),
            webhook_secret: SecretString::from("super_secret_webhook"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("https://api.payments.test"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_key"));
        assert!(!debug_output.contains("super_secret_webhook"));
    }
}
