//! Extraction of callback parameters from the redirect the user agent landed on.
//!
//! The flow itself only needs `code` and `state`; hosts that receive the raw
//! redirect URL can use [`CallbackParams`] to get them out.

use std::collections::HashMap;

/// What a redirect back from the authorization server carried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackParams {
    /// Successful authorization.
    Code {
        /// Authorization code.
        code: String,
        /// Round-tripped state.
        state: String,
    },
    /// The authorization server reported an error.
    Error {
        /// OAuth error code.
        error: String,
        /// `error_description`, if present.
        description: Option<String>,
    },
    /// Neither a complete `code`/`state` pair nor an `error`.
    NotACallback,
}

impl CallbackParams {
    /// Parse a full redirect URL. Only the query component is inspected.
    pub fn from_url(url: &str) -> Self {
        let without_fragment = url.split_once('#').map_or(url, |(head, _)| head);
        match without_fragment.split_once('?') {
            Some((_, query)) => Self::from_query(query),
            None => Self::NotACallback,
        }
    }

    /// Parse a raw query string (with or without the leading `?`).
    ///
    /// `error` takes precedence over `code`. Empty values count as absent.
    pub fn from_query(query: &str) -> Self {
        let mut params = parse_query(query.trim_start_matches('?'));

        if let Some(error) = params.remove("error") {
            return Self::Error {
                error,
                description: params.remove("error_description"),
            };
        }

        match (params.remove("code"), params.remove("state")) {
            (Some(code), Some(state)) => Self::Code { code, state },
            _ => Self::NotACallback,
        }
    }
}

/// Decode `application/x-www-form-urlencoded` pairs. First occurrence wins.
fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = decode(value);
        if value.is_empty() {
            continue;
        }
        let _ = params.entry(decode(key)).or_insert(value);
    }
    params
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(std::borrow::Cow::into_owned)
        .unwrap_or_else(|_| spaced.clone())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
