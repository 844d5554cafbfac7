//! PKCE (Proof Key for Code Exchange) generation.
//!
//! Verifiers and states are drawn from the RFC 7636 unreserved alphabet; the
//! challenge is the S256 transform of the verifier.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::ports::RandomSource;

/// RFC 7636 unreserved characters (`A-Z a-z 0-9 - . _ ~`).
pub const UNRESERVED: &[u8; 66] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Length of a generated code verifier (RFC 7636 maximum).
pub const VERIFIER_LENGTH: usize = 128;

/// Length of a generated anti-CSRF state.
pub const STATE_LENGTH: usize = 32;

/// Generate `length` characters sampled uniformly from [`UNRESERVED`].
pub fn random_string(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| char::from(UNRESERVED[rng.random_range(0..UNRESERVED.len())]))
        .collect()
}

/// S256 code challenge: base64url (no padding) of SHA-256 over `verifier`.
pub fn code_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// One login attempt's single-use parameters.
#[derive(Clone, Debug)]
pub struct PkceAttempt {
    /// Secret kept locally and sent only to the token endpoint.
    pub code_verifier: String,
    /// S256 challenge of the verifier, sent with the authorization request.
    pub code_challenge: String,
    /// Anti-CSRF value round-tripped through the authorization server.
    pub state: String,
}

impl PkceAttempt {
    /// Generate a fresh attempt. Verifier and state are drawn independently.
    pub fn generate(random: &dyn RandomSource) -> Self {
        let code_verifier = random.random_string(VERIFIER_LENGTH);
        let code_challenge = code_challenge(&code_verifier);
        let state = random.random_string(STATE_LENGTH);
        Self {
            code_verifier,
            code_challenge,
            state,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
