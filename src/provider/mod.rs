use std::sync::Arc;
use std::time::Duration;

use crate::auth::Store;
use crate::core::types::Timestamp;
use crate::util::hash::HashingService;

pub mod access_token;
pub mod authorization;
pub mod claims;
pub mod consent;
pub mod error;
pub mod token;
pub mod validation;

pub use error::Error;
use token::TokenService;

use tracing::{event, Level};

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// `iss` claim of every issued token.
    pub issuer: String,
    /// How long a pending authorization waits for consent.
    pub pending_lifetime: Duration,
    /// How long an approved code stays redeemable.
    pub code_lifetime: Duration,
    /// Lifetime embedded in `exp` and reported as `expires_in`.
    pub token_lifetime: Duration,
    /// Accept `http` redirect URIs whose host is a loopback address.
    pub allow_insecure_loopback: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            issuer: "authorization-service".to_string(),
            pending_lifetime: Duration::from_secs(60 * 60),
            code_lifetime: Duration::from_secs(10 * 60),
            token_lifetime: Duration::from_secs(60 * 60),
            allow_insecure_loopback: false,
        }
    }
}

/// The authorization-code protocol core. Storage is injected.
#[derive(Debug)]
pub struct OAuth2Provider<S> {
    store: S,
    hasher: HashingService,
    token: TokenService,
    config: ProviderConfig,
}

impl<S: Store> OAuth2Provider<S> {
    pub fn new(store: S, hasher: HashingService, token: TokenService, config: ProviderConfig) -> Self {
        Self {
            store,
            hasher,
            token,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Periodically drops expired rows. Expiry is also checked at the point
    /// of use, so this only bounds storage growth.
    pub async fn start_clean_up_worker(self: Arc<Self>, period: Duration) {
        let mut interval = tokio::time::interval(period);

        loop {
            interval.tick().await;
            if let Err(e) = self.store.clean_up(Timestamp::now()).await {
                event!(Level::ERROR, error = %e, "Failed to clean up expired authorizations");
            }
        }
    }
}
