//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and `#[serde(default)]`,
//! so a settings file only needs the fields it wants to change.

use serde::{Deserialize, Serialize};

use quill_auth::OAuthConfig;

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPES: [&str; 3] = ["openid", "profile", "email"];

/// Root settings type.
///
/// # JSON Format
///
/// ```json
/// {
///   "oauth": {
///     "clientId": "my-client",
///     "authorizationEndpoint": "https://sso.example.com/authorize",
///     "tokenEndpoint": "https://sso.example.com/token",
///     "redirectUri": "http://localhost:5173/auth/callback",
///     "scopes": ["openid", "profile"]
///   },
///   "logging": { "level": "info" }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuillSettings {
    /// Authorization server and client registration.
    pub oauth: OAuthSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Where durable state is kept.
    pub storage: StorageSettings,
}

/// OAuth client settings.
///
/// Empty strings are legal here; the authorization server will reject a
/// request built from them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OAuthSettings {
    /// OAuth client ID.
    pub client_id: String,
    /// Authorization URL.
    pub authorization_endpoint: String,
    /// Token URL.
    pub token_endpoint: String,
    /// Redirect URI registered with the authorization server.
    pub redirect_uri: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

impl Default for OAuthSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            authorization_endpoint: String::new(),
            token_endpoint: String::new(),
            redirect_uri: String::new(),
            scopes: DEFAULT_SCOPES.iter().map(ToString::to_string).collect(),
        }
    }
}

impl OAuthSettings {
    /// Build the client configuration.
    pub fn to_config(&self) -> OAuthConfig {
        OAuthConfig {
            client_id: self.client_id.clone(),
            authorization_endpoint: self.authorization_endpoint.clone(),
            token_endpoint: self.token_endpoint.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Storage settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Directory for the durable token store. Defaults to `~/.quill`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
