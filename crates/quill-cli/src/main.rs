//! # quill
//!
//! Terminal host for the OAuth authorization code + PKCE flow. Opens the
//! system browser, reads the redirect back from the user, and manages the
//! stored token.

#![deny(unsafe_code)]

mod commands;
mod logging;
mod navigator;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::commands::Command;

/// OAuth login client.
#[derive(Debug, Parser)]
#[command(name = "quill", about = "OAuth 2.0 authorization code + PKCE client")]
struct Cli {
    /// Settings file (defaults to `~/.quill/settings.json`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset (overrides settings).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli.config.unwrap_or_else(quill_settings::settings_path);
    let settings = quill_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    let level = cli.log_level.as_deref().unwrap_or(&settings.logging.level);
    logging::init_subscriber(level);
    tracing::debug!(settings = %path.display(), "settings loaded");

    commands::run(cli.command, &settings).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_login_flags() {
        let cli = Cli::try_parse_from(["quill", "login", "--no-browser"]).unwrap();
        assert!(matches!(cli.command, Command::Login { no_browser: true }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "quill",
            "status",
            "--config",
            "/tmp/quill.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Status));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/quill.json")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["quill"]).is_err());
    }
}
