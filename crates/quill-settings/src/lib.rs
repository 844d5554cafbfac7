//! # quill-settings
//!
//! Configuration for the quill OAuth client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`QuillSettings::default()`]
//! 2. **User file**: `~/.quill/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `QUILL_*` overrides (highest priority)
//!
//! OAuth values are handed to [`quill_auth::OAuthClient`] as-is through
//! [`OAuthSettings::to_config`]; nothing here checks that they are usable.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, data_dir, deep_merge, load_file_layer, load_settings,
    load_settings_from_path, parse_scopes, quill_home, settings_path,
};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
