//! The [`OAuthClient`] facade.
//!
//! Login initiation lives in [`crate::redirect`], callback handling in
//! [`crate::exchange`] and token refresh in [`crate::refresh`]; each adds an
//! `impl OAuthClient` block. This module holds the client itself and the
//! read/logout side of the API.

use std::sync::Arc;

use crate::errors::AuthError;
use crate::ports::{Clock, KeyValueStore, Navigator, OsRandom, RandomSource, SystemClock};
use crate::storage::{TokenStore, TransientStore};
use crate::types::{OAuthConfig, TokenRecord};

/// OAuth 2.0 authorization code + PKCE client bound to one configuration.
///
/// Construct one per configuration; instances share nothing.
#[derive(Clone)]
pub struct OAuthClient {
    pub(crate) config: OAuthConfig,
    pub(crate) http: reqwest::Client,
    pub(crate) durable_backend: Arc<dyn KeyValueStore>,
    pub(crate) transient: TransientStore,
    pub(crate) tokens: TokenStore,
    pub(crate) random: Arc<dyn RandomSource>,
    pub(crate) navigator: Arc<dyn Navigator>,
}

impl OAuthClient {
    /// Create a client with the system clock, OS randomness and a fresh
    /// HTTP client.
    ///
    /// `session_store` must not outlive the session that starts a login;
    /// `durable_store` should survive restarts.
    pub fn new(
        config: OAuthConfig,
        session_store: Arc<dyn KeyValueStore>,
        durable_store: Arc<dyn KeyValueStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self {
            config,
            http: reqwest::Client::new(),
            transient: TransientStore::new(session_store),
            tokens: TokenStore::new(durable_store.clone(), clock),
            durable_backend: durable_store,
            random: Arc::new(OsRandom),
            navigator,
        }
    }

    /// Use `clock` for expiry checks and `obtained_at` timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.tokens = TokenStore::new(self.durable_backend.clone(), clock);
        self
    }

    /// Use `random` for verifier and state generation.
    #[must_use]
    pub fn with_random(mut self, random: Arc<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Use a shared HTTP client for token endpoint requests.
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Access token of the stored record, if present and not expired.
    ///
    /// An expired record without a refresh token is deleted on the way out.
    /// One that can still be refreshed is kept for [`OAuthClient::refresh`].
    pub fn get_access_token(&self) -> Option<String> {
        if let Some(record) = self.tokens.load() {
            return Some(record.access_token);
        }
        if let Some(expired) = self.tokens.load_unchecked() {
            if expired.refresh_token.is_some() {
                tracing::debug!("stored token expired, keeping it for refresh");
            } else {
                tracing::debug!("removing expired token");
                if let Err(e) = self.tokens.clear() {
                    tracing::warn!("failed to remove expired token: {e}");
                }
            }
        }
        None
    }

    /// Whether a usable access token is stored.
    pub fn is_authenticated(&self) -> bool {
        self.get_access_token().is_some()
    }

    /// The stored record regardless of expiry, for consumers that need the
    /// ID token or the refresh token.
    pub fn get_token(&self) -> Option<TokenRecord> {
        self.tokens.load_unchecked()
    }

    /// Clear the stored token and any in-flight login attempt.
    ///
    /// Every store is cleared even if an earlier one fails; the first
    /// failure is returned. Calling this repeatedly is harmless.
    pub fn logout(&self) -> Result<(), AuthError> {
        let token = self.tokens.clear();
        let attempt = self.transient.clear();
        if token.is_ok() && attempt.is_ok() {
            tracing::info!("logged out");
        }
        token.and(attempt)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryStore;
    use crate::storage::{CODE_VERIFIER_KEY, STATE_KEY, TOKEN_KEY};
    use crate::testing::{ManualClock, RecordingNavigator};

    const NOW: i64 = 1_700_000_000_000;

    struct Harness {
        session: Arc<MemoryStore>,
        durable: Arc<MemoryStore>,
        clock: Arc<ManualClock>,
        client: OAuthClient,
    }

    fn harness() -> Harness {
        let session = Arc::new(MemoryStore::new());
        let durable = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(NOW));
        let client = OAuthClient::new(
            OAuthConfig::default(),
            session.clone(),
            durable.clone(),
            Arc::new(RecordingNavigator::default()),
        )
        .with_clock(clock.clone());
        Harness {
            session,
            durable,
            clock,
            client,
        }
    }

    fn store_record(h: &Harness, obtained_at: i64) {
        let record = TokenRecord {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            refresh_token: None,
            id_token: Some("id".to_string()),
            obtained_at,
        };
        h.durable
            .set(TOKEN_KEY, &serde_json::to_string(&record).unwrap())
            .unwrap();
    }

    #[test]
    fn empty_client_is_not_authenticated() {
        let h = harness();
        assert!(h.client.get_access_token().is_none());
        assert!(!h.client.is_authenticated());
        assert!(h.client.get_token().is_none());
    }

    #[test]
    fn valid_token_is_returned() {
        let h = harness();
        store_record(&h, NOW);
        assert_eq!(h.client.get_access_token().as_deref(), Some("tok"));
        assert!(h.client.is_authenticated());
    }

    #[test]
    fn token_inside_skew_buffer_is_absent_and_removed() {
        let h = harness();
        // Server expiry is 59s away, inside the 60s buffer.
        store_record(&h, NOW - (3_600_000 - 59_000));
        assert!(h.client.get_access_token().is_none());
        assert!(h.durable.get(TOKEN_KEY).is_none());
    }

    #[test]
    fn expired_refreshable_token_is_absent_but_kept() {
        let h = harness();
        let record = TokenRecord {
            access_token: "tok".to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
            refresh_token: Some("rt".to_string()),
            id_token: None,
            obtained_at: NOW - 2 * 3_600_000,
        };
        h.durable
            .set(TOKEN_KEY, &serde_json::to_string(&record).unwrap())
            .unwrap();

        assert!(h.client.get_access_token().is_none());
        assert!(!h.client.is_authenticated());
        assert_eq!(h.client.get_token(), Some(record));
    }

    #[test]
    fn token_just_outside_skew_buffer_is_valid() {
        let h = harness();
        store_record(&h, NOW - (3_600_000 - 61_000));
        assert_eq!(h.client.get_access_token().as_deref(), Some("tok"));
    }

    #[test]
    fn token_expires_as_clock_advances() {
        let h = harness();
        store_record(&h, NOW);
        h.clock.advance_ms(3_600_000 - 60_000);
        assert!(!h.client.is_authenticated());
    }

    #[test]
    fn corrupt_token_is_absent_and_cleared() {
        let h = harness();
        h.durable.set(TOKEN_KEY, "][").unwrap();
        assert!(h.client.get_access_token().is_none());
        assert!(h.durable.get(TOKEN_KEY).is_none());
        assert!(h.client.tokens.load().is_none());
    }

    #[test]
    fn get_token_ignores_expiry() {
        let h = harness();
        store_record(&h, NOW - 10 * 3_600_000);
        let record = h.client.get_token().unwrap();
        assert_eq!(record.id_token.as_deref(), Some("id"));
    }

    #[test]
    fn logout_clears_both_stores() {
        let h = harness();
        store_record(&h, NOW);
        h.session.set(CODE_VERIFIER_KEY, "v").unwrap();
        h.session.set(STATE_KEY, "s").unwrap();

        h.client.logout().unwrap();

        assert!(h.durable.get(TOKEN_KEY).is_none());
        assert!(h.session.get(CODE_VERIFIER_KEY).is_none());
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[test]
    fn logout_is_idempotent() {
        let h = harness();
        store_record(&h, NOW);
        h.client.logout().unwrap();
        h.client.logout().unwrap();
        assert!(!h.client.is_authenticated());
        assert!(h.client.get_token().is_none());
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[test]
    fn clients_do_not_share_state() {
        let a = harness();
        let b = harness();
        store_record(&a, NOW);
        assert!(a.client.is_authenticated());
        assert!(!b.client.is_authenticated());
    }
}
