//! Authorization request construction and redirect.

use crate::client::OAuthClient;
use crate::errors::AuthError;
use crate::pkce::PkceAttempt;
use crate::types::OAuthConfig;

/// Build the authorization URL for browser redirect.
///
/// `scope` is only present when the configuration lists at least one scope.
pub fn authorization_url(config: &OAuthConfig, attempt: &PkceAttempt) -> String {
    let mut params = vec![
        ("client_id", config.client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("state", attempt.state.as_str()),
        ("code_challenge", attempt.code_challenge.as_str()),
        ("code_challenge_method", "S256"),
    ];
    let scope = config.scopes.join(" ");
    if !config.scopes.is_empty() {
        params.push(("scope", scope.as_str()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{query}", config.authorization_endpoint)
}

impl OAuthClient {
    /// Start a login attempt without navigating.
    ///
    /// Generates fresh PKCE parameters, records the verifier and state in
    /// session storage (replacing any earlier attempt) and returns the URL
    /// the user agent must visit.
    pub fn prepare_login(&self) -> Result<String, AuthError> {
        let attempt = PkceAttempt::generate(self.random.as_ref());
        self.transient
            .save(&attempt.code_verifier, &attempt.state)?;
        tracing::debug!("login attempt recorded");
        Ok(authorization_url(&self.config, &attempt))
    }

    /// Start a login attempt and send the user agent to the authorization
    /// server.
    ///
    /// Navigation failures are returned as-is. The recorded attempt stays
    /// behind until the next login replaces it or a callback consumes it.
    pub fn initiate_login(&self) -> Result<(), AuthError> {
        let url = self.prepare_login()?;
        tracing::info!(endpoint = %self.config.authorization_endpoint, "redirecting to authorization server");
        self.navigator.navigate(&url)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
