//! Auth error types.

/// Errors that can occur during the authorization code flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request to the token endpoint could not be completed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Callback state does not match the in-flight login attempt, or no
    /// attempt is on record.
    #[error("state mismatch: possible CSRF attack")]
    StateMismatch,

    /// Stored state matched but the code verifier is gone.
    #[error("code verifier not found")]
    MissingVerifier,

    /// Token endpoint answered with a non-2xx status.
    #[error("{grant} grant failed ({status}): {body}")]
    TokenEndpoint {
        /// Grant type of the failed request.
        grant: &'static str,
        /// HTTP status code.
        status: u16,
        /// Raw response body, kept for diagnostics.
        body: String,
    },

    /// The user agent could not be sent to the authorization server.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The authorization server redirected back with an `error` parameter.
    #[error("authorization server returned {error}")]
    Provider {
        /// OAuth error code (e.g. `access_denied`).
        error: String,
        /// Optional human-readable description.
        description: Option<String>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
