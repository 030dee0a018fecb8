use std::time::Duration;

use chrono::Utc;
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;

use platter_common::session::{issue_token, SessionClaims};

use crate::store::MarketStore;

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: MarketStore,
    signing_key: SigningKey,
    /// How long issued sessions stay valid.
    pub session_ttl: chrono::Duration,
    /// Upper bound on a single store commit before the request gives up.
    pub commit_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: MarketStore,
        signing_key: SigningKey,
        session_ttl: chrono::Duration,
        commit_timeout: Duration,
    ) -> Self {
        Self {
            store,
            signing_key,
            session_ttl,
            commit_timeout,
        }
    }

    /// In-memory state with a throwaway key and default limits. What tests
    /// and `--ephemeral` runs use.
    pub fn ephemeral() -> Self {
        Self::new(
            MarketStore::in_memory(),
            SigningKey::generate(&mut OsRng),
            chrono::Duration::hours(180),
            Duration::from_secs(5),
        )
    }

    /// Mint a session token for `email`, expiring after the configured TTL.
    pub fn issue_session(&self, email: String) -> (String, SessionClaims) {
        let claims = SessionClaims {
            email,
            expires_at: Utc::now() + self.session_ttl,
        };
        let token = issue_token(&claims, &self.signing_key);
        (token, claims)
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }
}
