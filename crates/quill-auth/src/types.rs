//! Core authentication types.

use serde::{Deserialize, Serialize};

/// Safety margin subtracted from a token's lifetime before it counts as expired.
pub const EXPIRY_SKEW_MS: i64 = 60_000;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

/// Token type assumed when the token endpoint omits `token_type`.
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

/// OAuth client configuration.
///
/// Values are passed through as given; validating them is the job of
/// whoever loads the configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OAuthConfig {
    /// OAuth client ID.
    pub client_id: String,
    /// Authorization URL for browser redirect.
    pub authorization_endpoint: String,
    /// Token exchange URL.
    pub token_endpoint: String,
    /// OAuth redirect URI, matched exactly by the authorization server.
    pub redirect_uri: String,
    /// OAuth scopes, in request order. May be empty.
    pub scopes: Vec<String>,
}

/// The persisted result of a successful code exchange or refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Bearer credential for protected resources.
    pub access_token: String,
    /// Token type, `Bearer` unless the server says otherwise.
    pub token_type: String,
    /// Lifetime in seconds as reported by the server.
    pub expires_in: i64,
    /// Refresh token, if the server issued one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// OpenID Connect ID token, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
    /// Client-side timestamp (ms since epoch) of the successful exchange.
    pub obtained_at: i64,
}

impl TokenRecord {
    /// Build a record from a token endpoint response.
    ///
    /// `previous` supplies the refresh and ID tokens when the response omits
    /// them (refresh grants commonly do).
    pub fn from_response(
        response: TokenResponse,
        previous: Option<&TokenRecord>,
        obtained_at: i64,
    ) -> Self {
        let refresh_token = non_empty(response.refresh_token)
            .or_else(|| previous.and_then(|p| p.refresh_token.clone()));
        let id_token =
            non_empty(response.id_token).or_else(|| previous.and_then(|p| p.id_token.clone()));

        Self {
            access_token: response.access_token,
            token_type: non_empty(response.token_type)
                .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string()),
            expires_in: response
                .expires_in
                .filter(|s| *s > 0)
                .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS),
            refresh_token,
            id_token,
            obtained_at,
        }
    }

    /// Instant (ms since epoch) from which the record is no longer usable.
    ///
    /// This is the server-declared expiry minus [`EXPIRY_SKEW_MS`].
    pub fn usable_until_ms(&self) -> i64 {
        self.obtained_at
            .saturating_add(self.expires_in.saturating_mul(1000))
            .saturating_sub(EXPIRY_SKEW_MS)
    }

    /// Whether the record may still be used at `now_ms`.
    pub fn is_valid_at(&self, now_ms: i64) -> bool {
        now_ms < self.usable_until_ms()
    }
}

/// Token endpoint response body.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Issued access token.
    pub access_token: String,
    /// Token type.
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds. Accepts a number or a numeric string; anything
    /// else is treated as absent.
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<i64>,
    /// Refresh token.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// OpenID Connect ID token.
    #[serde(default)]
    pub id_token: Option<String>,
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f as i64))
        }
        _ => None,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
