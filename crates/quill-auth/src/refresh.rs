//! Refresh token grant.

use crate::client::OAuthClient;
use crate::errors::AuthError;
use crate::exchange::post_token_request;
use crate::types::{OAuthConfig, TokenRecord};

/// Redeem `previous.refresh_token` for a new record.
///
/// Refresh and ID tokens missing from the response are carried over from
/// `previous`. Returns `Ok(None)` if `previous` has no refresh token.
#[tracing::instrument(skip_all, fields(grant = "refresh_token"))]
pub async fn refresh_with_client(
    client: &reqwest::Client,
    config: &OAuthConfig,
    previous: &TokenRecord,
    now_ms: impl FnOnce() -> i64,
) -> Result<Option<TokenRecord>, AuthError> {
    let Some(refresh_token) = previous.refresh_token.as_deref() else {
        return Ok(None);
    };

    let form = [
        ("grant_type", "refresh_token"),
        ("client_id", config.client_id.as_str()),
        ("refresh_token", refresh_token),
    ];
    let data = post_token_request(client, &config.token_endpoint, "refresh_token", &form).await?;
    Ok(Some(TokenRecord::from_response(
        data,
        Some(previous),
        now_ms(),
    )))
}

impl OAuthClient {
    /// Replace the stored record using its refresh token.
    ///
    /// Works on expired records too, since refresh tokens usually outlive
    /// access tokens. Returns `Ok(None)` without any network traffic when
    /// there is no record or it carries no refresh token.
    ///
    /// A rejected or unparseable refresh deletes the stored record: the
    /// refresh token cannot be retried and the user must log in again. A
    /// transport failure leaves the record in place.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self) -> Result<Option<TokenRecord>, AuthError> {
        let Some(previous) = self.tokens.load_unchecked() else {
            tracing::debug!("no stored token to refresh");
            return Ok(None);
        };

        let tokens = &self.tokens;
        match refresh_with_client(&self.http, &self.config, &previous, || tokens.now_ms()).await {
            Ok(Some(record)) => {
                if let Err(e) = self.tokens.save(&record) {
                    tracing::warn!("failed to store refreshed token: {e}");
                    return Err(e);
                }
                tracing::info!("token refreshed");
                Ok(Some(record))
            }
            Ok(None) => {
                tracing::debug!("stored token has no refresh token");
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("token refresh failed: {e}");
                if matches!(e, AuthError::TokenEndpoint { .. } | AuthError::Json(_)) {
                    if let Err(clear_err) = self.tokens.clear() {
                        tracing::warn!("failed to clear rejected token: {clear_err}");
                    }
                }
                Err(e)
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
