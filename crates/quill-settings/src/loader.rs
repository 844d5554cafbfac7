//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`QuillSettings::default()`]
//! 2. If `~/.quill/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::QuillSettings;

/// Resolve the quill home directory (`~/.quill`).
pub fn quill_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".quill")
}

/// Resolve the path to the settings file (`~/.quill/settings.json`).
pub fn settings_path() -> PathBuf {
    quill_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<QuillSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<QuillSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Defaults merged with the settings file, without env overrides.
pub fn load_file_layer(path: &Path) -> Result<QuillSettings> {
    let defaults = serde_json::to_value(QuillSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        if !user.is_object() {
            return Err(SettingsError::InvalidValue(
                "settings root must be a JSON object".to_string(),
            ));
        }
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// - Objects are merged recursively (source overrides target per-key)
/// - Arrays and primitives are replaced entirely by source
/// - Null values in source are skipped (preserving target)
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// `lookup` resolves a variable name to its value. Empty values are ignored.
pub fn apply_env_overrides(
    settings: &mut QuillSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    // ── OAuth settings ──────────────────────────────────────────────
    if let Some(v) = read("QUILL_OAUTH_CLIENT_ID") {
        settings.oauth.client_id = v;
    }
    if let Some(v) = read("QUILL_OAUTH_AUTHORIZATION_ENDPOINT") {
        settings.oauth.authorization_endpoint = v;
    }
    if let Some(v) = read("QUILL_OAUTH_TOKEN_ENDPOINT") {
        settings.oauth.token_endpoint = v;
    }
    if let Some(v) = read("QUILL_OAUTH_REDIRECT_URI") {
        settings.oauth.redirect_uri = v;
    }
    if let Some(v) = read("QUILL_OAUTH_SCOPES") {
        settings.oauth.scopes = parse_scopes(&v);
    }

    // ── Logging / storage ───────────────────────────────────────────
    if let Some(v) = read("QUILL_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("QUILL_DATA_DIR") {
        settings.storage.data_dir = Some(v);
    }
}

/// Split a comma-separated scope list, trimming items and dropping empties.
pub fn parse_scopes(val: &str) -> Vec<String> {
    val.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Directory for durable state: the configured one, else `~/.quill`.
pub fn data_dir(settings: &QuillSettings) -> PathBuf {
    settings
        .storage
        .data_dir
        .as_ref()
        .map_or_else(quill_home, PathBuf::from)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
