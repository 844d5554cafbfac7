//! Subcommands and their handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Subcommand;
use quill_auth::{
    CallbackParams, Clock, FileStore, MemoryStore, OAuthClient, SystemClock, TokenRecord,
    store_file_path,
};
use quill_settings::{QuillSettings, data_dir};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::navigator::BrowserNavigator;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in through the configured authorization server.
    Login {
        /// Print the authorization URL instead of opening a browser.
        #[arg(long)]
        no_browser: bool,
    },
    /// Show whether a token is stored and when it expires.
    Status,
    /// Print the current access token.
    Token,
    /// Exchange the stored refresh token for a new access token.
    Refresh,
    /// Forget the stored token and any pending login.
    Logout,
}

pub async fn run(command: Command, settings: &QuillSettings) -> Result<()> {
    match command {
        Command::Login { no_browser } => login(&build_client(settings, !no_browser)).await,
        Command::Status => {
            status(&build_client(settings, false));
            Ok(())
        }
        Command::Token => token(&build_client(settings, false)),
        Command::Refresh => refresh(&build_client(settings, false)).await,
        Command::Logout => logout(&build_client(settings, false)),
    }
}

/// Client with an in-process session store and the token file under the
/// data directory.
///
/// Login and callback handling happen in one process, so the pending
/// attempt never needs to touch disk.
pub fn build_client(settings: &QuillSettings, open_browser: bool) -> OAuthClient {
    let token_path = store_file_path(&data_dir(settings));
    tracing::debug!(path = %token_path.display(), "using token store");
    OAuthClient::new(
        settings.oauth.to_config(),
        Arc::new(MemoryStore::new()),
        Arc::new(FileStore::new(token_path)),
        Arc::new(BrowserNavigator::new(open_browser)),
    )
}

async fn login(client: &OAuthClient) -> Result<()> {
    if client.config().authorization_endpoint.is_empty() {
        anyhow::bail!("oauth.authorizationEndpoint is not configured");
    }

    client
        .initiate_login()
        .context("failed to start login")?;

    println!("After signing in, paste the URL you were redirected to:");
    let line = BufReader::new(tokio::io::stdin())
        .lines()
        .next_line()
        .await
        .context("failed to read redirect URL")?
        .unwrap_or_default();

    println!("Exchanging code for tokens...");
    let record = client
        .handle_callback_params(parse_redirect_input(&line))
        .await
        .context("login failed")?;

    println!("Logged in ({}).", describe_expiry(&record, SystemClock.now_ms()));
    Ok(())
}

fn status(client: &OAuthClient) {
    match client.get_token() {
        Some(record) => println!("Logged in [{}]", describe_expiry(&record, SystemClock.now_ms())),
        None => println!("Not logged in."),
    }
}

fn token(client: &OAuthClient) -> Result<()> {
    let access_token = client
        .get_access_token()
        .context("no valid access token; run `quill login` or `quill refresh`")?;
    println!("{access_token}");
    Ok(())
}

async fn refresh(client: &OAuthClient) -> Result<()> {
    match client.refresh().await.context("refresh failed")? {
        Some(record) => println!(
            "Token refreshed ({}).",
            describe_expiry(&record, SystemClock.now_ms())
        ),
        None => println!("Nothing to refresh: no stored refresh token."),
    }
    Ok(())
}

fn logout(client: &OAuthClient) -> Result<()> {
    client.logout().context("failed to clear stored credentials")?;
    println!("Logged out.");
    Ok(())
}

/// Accept either the full redirect URL or just its query string.
fn parse_redirect_input(input: &str) -> CallbackParams {
    let input = input.trim();
    if input.contains('?') {
        CallbackParams::from_url(input)
    } else {
        CallbackParams::from_query(input)
    }
}

/// Human-readable validity of `record` at `now_ms`.
fn describe_expiry(record: &TokenRecord, now_ms: i64) -> String {
    let refreshable = if record.refresh_token.is_some() {
        ", refreshable"
    } else {
        ""
    };
    if record.is_valid_at(now_ms) {
        let remaining = (record.usable_until_ms() - now_ms) / 1000;
        let hours = remaining / 3600;
        let mins = (remaining % 3600) / 60;
        format!("valid, {hours}h {mins}m remaining{refreshable}")
    } else {
        format!("expired{refreshable}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
