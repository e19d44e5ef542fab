//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::services::auth::TokenKeys;
use crate::services::payment::PaymentClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    payment: PaymentClient,
    token_keys: TokenKeys,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let payment = PaymentClient::new(config.payment.clone());
        let token_keys = TokenKeys::new(&config.access_token_secret, &config.refresh_token_secret);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                payment,
                token_keys,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment provider client.
    #[must_use]
    pub fn payment(&self) -> &PaymentClient {
        &self.inner.payment
    }

    /// Get a reference to the JWT signing/verification keys.
    #[must_use]
    pub fn token_keys(&self) -> &TokenKeys {
        &self.inner.token_keys
    }
}
