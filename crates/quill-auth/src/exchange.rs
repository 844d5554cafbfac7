//! Authorization code exchange.
//!
//! Validates the callback against the recorded attempt, trades the code for
//! tokens and persists the result. The attempt is burned whatever the
//! outcome.

use crate::callback::CallbackParams;
use crate::client::OAuthClient;
use crate::errors::AuthError;
use crate::types::{OAuthConfig, TokenRecord, TokenResponse};

/// POST a form to the token endpoint and parse the JSON response.
///
/// Non-2xx responses become [`AuthError::TokenEndpoint`] carrying the body.
pub(crate) async fn post_token_request(
    client: &reqwest::Client,
    token_endpoint: &str,
    grant: &'static str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, AuthError> {
    let resp = client.post(token_endpoint).form(form).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(AuthError::TokenEndpoint {
            grant,
            status: status.as_u16(),
            body,
        });
    }

    let text = resp.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Exchange an authorization code for a token record.
#[tracing::instrument(skip_all, fields(grant = "authorization_code"))]
pub async fn exchange_code_with_client(
    client: &reqwest::Client,
    config: &OAuthConfig,
    code: &str,
    verifier: &str,
    now_ms: impl FnOnce() -> i64,
) -> Result<TokenRecord, AuthError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("client_id", config.client_id.as_str()),
        ("code", code),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("code_verifier", verifier),
    ];
    let data = post_token_request(client, &config.token_endpoint, "authorization_code", &form)
        .await?;
    Ok(TokenRecord::from_response(data, None, now_ms()))
}

impl OAuthClient {
    /// Complete a login from the `code` and `state` the authorization server
    /// redirected back with.
    ///
    /// Fails with [`AuthError::StateMismatch`] before any network traffic if
    /// `state` is not the one recorded for the current attempt. On success
    /// the new record replaces any stored token. In every case the recorded
    /// attempt is cleared, so a callback can be handled at most once.
    #[tracing::instrument(skip_all)]
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<TokenRecord, AuthError> {
        let result = self.exchange_callback(code, state).await;

        if let Err(e) = self.transient.clear() {
            tracing::warn!("failed to clear login attempt: {e}");
        }

        match &result {
            Ok(_) => tracing::info!("login completed"),
            Err(e) => tracing::warn!("OAuth callback failed: {e}"),
        }
        result
    }

    /// Complete a login from parameters a host extracted from the redirect.
    ///
    /// An `error` callback burns the recorded attempt; a request that is not
    /// a callback at all leaves every store untouched.
    pub async fn handle_callback_params(
        &self,
        params: CallbackParams,
    ) -> Result<TokenRecord, AuthError> {
        match params {
            CallbackParams::Code { code, state } => self.handle_callback(&code, &state).await,
            CallbackParams::Error { error, description } => {
                if let Err(e) = self.transient.clear() {
                    tracing::warn!("failed to clear login attempt: {e}");
                }
                tracing::warn!(%error, "authorization server rejected login");
                Err(AuthError::Provider { error, description })
            }
            CallbackParams::NotACallback => Err(AuthError::Provider {
                error: "invalid_callback".to_string(),
                description: Some("redirect carried neither code and state nor error".to_string()),
            }),
        }
    }

    async fn exchange_callback(&self, code: &str, state: &str) -> Result<TokenRecord, AuthError> {
        if self.transient.load_state().as_deref() != Some(state) {
            return Err(AuthError::StateMismatch);
        }
        let verifier = self
            .transient
            .load_verifier()
            .ok_or(AuthError::MissingVerifier)?;

        let tokens = &self.tokens;
        let record =
            exchange_code_with_client(&self.http, &self.config, code, &verifier, || tokens.now_ms())
                .await?;
        self.tokens.save(&record)?;
        Ok(record)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::backend::MemoryStore;
    use crate::ports::KeyValueStore;
    use crate::storage::{CODE_VERIFIER_KEY, STATE_KEY, TOKEN_KEY};
    use crate::testing::{ManualClock, RecordingNavigator, closed_port_uri};

    const NOW: i64 = 1_700_000_000_000;

    struct Harness {
        session: Arc<MemoryStore>,
        durable: Arc<MemoryStore>,
        client: OAuthClient,
    }

    fn harness(server: &MockServer) -> Harness {
        harness_at(&server.uri())
    }

    fn harness_at(base: &str) -> Harness {
        let session = Arc::new(MemoryStore::new());
        let durable = Arc::new(MemoryStore::new());
        let config = OAuthConfig {
            client_id: "my-client".to_string(),
            authorization_endpoint: format!("{base}/authorize"),
            token_endpoint: format!("{base}/token"),
            redirect_uri: "https://app.example.com/callback".to_string(),
            scopes: vec!["openid".to_string()],
        };
        let client = OAuthClient::new(
            config,
            session.clone(),
            durable.clone(),
            Arc::new(RecordingNavigator::default()),
        )
        .with_clock(Arc::new(ManualClock::new(NOW)));
        Harness {
            session,
            durable,
            client,
        }
    }

    fn record_attempt(h: &Harness, verifier: &str, state: &str) {
        h.session.set(CODE_VERIFIER_KEY, verifier).unwrap();
        h.session.set(STATE_KEY, state).unwrap();
    }

    fn stored_record(h: &Harness) -> TokenRecord {
        serde_json::from_str(&h.durable.get(TOKEN_KEY).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn successful_exchange_persists_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("client_id=my-client"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains(
                "redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback",
            ))
            .and(body_string_contains("code_verifier=the-verifier"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok1",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "the-verifier", "XYZ");

        let record = h.client.handle_callback("abc", "XYZ").await.unwrap();
        assert_eq!(record.access_token, "tok1");
        assert_eq!(record.token_type, "Bearer");
        assert_eq!(record.expires_in, 3600);
        assert_eq!(record.obtained_at, NOW);

        assert_eq!(stored_record(&h), record);
        assert!(h.session.get(STATE_KEY).is_none());
        assert!(h.session.get(CODE_VERIFIER_KEY).is_none());
        assert_eq!(h.client.get_access_token().as_deref(), Some("tok1"));
    }

    #[tokio::test]
    async fn state_mismatch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let err = h.client.handle_callback("abc", "WRONG").await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
        assert!(h.session.get(STATE_KEY).is_none());
        assert!(h.durable.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn no_attempt_on_record_is_state_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server);
        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
    }

    #[tokio::test]
    async fn missing_verifier_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let h = harness(&server);
        h.session.set(STATE_KEY, "XYZ").unwrap();

        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingVerifier));
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[tokio::test]
    async fn callback_is_single_use() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        assert!(h.client.handle_callback("abc", "XYZ").await.is_ok());
        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        assert!(matches!(err, AuthError::StateMismatch));
    }

    #[tokio::test]
    async fn endpoint_error_carries_body_and_burns_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        match err {
            AuthError::TokenEndpoint {
                grant,
                status,
                body,
            } => {
                assert_eq!(grant, "authorization_code");
                assert_eq!(status, 400);
                assert_eq!(body, "invalid_grant");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(h.session.get(STATE_KEY).is_none());
        assert!(h.session.get(CODE_VERIFIER_KEY).is_none());
        assert!(h.durable.get(TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn string_expires_in_completes_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok1",
                "expires_in": "3599"
            })))
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let record = h.client.handle_callback("abc", "XYZ").await.unwrap();
        assert_eq!(record.expires_in, 3599);
        assert_eq!(stored_record(&h), record);
    }

    #[tokio::test]
    async fn malformed_response_is_json_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        assert!(matches!(err, AuthError::Json(_)));
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_http_error() {
        let h = harness_at(&closed_port_uri());
        record_attempt(&h, "v", "XYZ");

        let err = h.client.handle_callback("abc", "XYZ").await.unwrap_err();
        assert!(matches!(err, AuthError::Http(_)));
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[tokio::test]
    async fn error_params_burn_attempt() {
        let server = MockServer::start().await;
        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let err = h
            .client
            .handle_callback_params(CallbackParams::Error {
                error: "access_denied".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider { ref error, .. } if error == "access_denied"));
        assert!(h.session.get(STATE_KEY).is_none());
    }

    #[tokio::test]
    async fn not_a_callback_leaves_attempt() {
        let server = MockServer::start().await;
        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let err = h
            .client
            .handle_callback_params(CallbackParams::NotACallback)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Provider { .. }));
        assert_eq!(h.session.get(STATE_KEY).as_deref(), Some("XYZ"));
    }

    #[tokio::test]
    async fn code_params_complete_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok2",
                "id_token": "idt"
            })))
            .mount(&server)
            .await;

        let h = harness(&server);
        record_attempt(&h, "v", "XYZ");

        let record = h
            .client
            .handle_callback_params(CallbackParams::Code {
                code: "abc".to_string(),
                state: "XYZ".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(record.id_token.as_deref(), Some("idt"));
        assert_eq!(h.client.get_token().unwrap().access_token, "tok2");
    }
}
