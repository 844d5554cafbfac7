//! # quill-auth
//!
//! OAuth 2.0 authorization code flow with PKCE for user-facing clients.
//!
//! The flow:
//! 1. [`OAuthClient::initiate_login`] generates a verifier, challenge and
//!    state, records them in session storage and navigates to the
//!    authorization server.
//! 2. [`OAuthClient::handle_callback`] checks the returned state, exchanges
//!    the code at the token endpoint and persists the [`TokenRecord`].
//! 3. [`OAuthClient::get_access_token`] reads the record back, treating
//!    anything within 60 seconds of expiry as absent.
//! 4. [`OAuthClient::refresh`] redeems the refresh token on demand. Nothing
//!    refreshes in the background.
//!
//! Storage, time, randomness and navigation are supplied through the traits
//! in [`ports`]. Two hosts sharing the same backends race last-write-wins:
//! a second login overwrites the first attempt's state, and a logout in one
//! can pull the token from under a refresh in the other.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quill_auth::{FileStore, MemoryStore, OAuthClient, OAuthConfig};
//! # struct Print;
//! # impl quill_auth::Navigator for Print {
//! #     fn navigate(&self, url: &str) -> Result<(), quill_auth::AuthError> {
//! #         println!("{url}");
//! #         Ok(())
//! #     }
//! # }
//! # fn main() -> Result<(), quill_auth::AuthError> {
//! let client = OAuthClient::new(
//!     OAuthConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(FileStore::new("/home/user/.quill/oauth.json")),
//!     Arc::new(Print),
//! );
//! client.initiate_login()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod backend;
pub mod callback;
pub mod client;
pub mod errors;
pub mod exchange;
pub mod pkce;
pub mod ports;
pub mod redirect;
pub mod refresh;
pub mod storage;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{FileStore, MemoryStore, store_file_path};
pub use callback::CallbackParams;
pub use client::OAuthClient;
pub use errors::AuthError;
pub use pkce::{PkceAttempt, code_challenge, random_string};
pub use ports::{Clock, KeyValueStore, Navigator, OsRandom, RandomSource, SystemClock};
pub use redirect::authorization_url;
pub use storage::{TokenStore, TransientStore};
pub use types::{OAuthConfig, TokenRecord, TokenResponse};

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
