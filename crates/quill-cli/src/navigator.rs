//! Sends the user to the authorization server from a terminal.

use quill_auth::{AuthError, Navigator};

/// Prints the authorization URL and, unless disabled, opens it in the
/// system browser.
///
/// A browser that fails to open is not an error: the printed URL can still
/// be visited by hand.
#[derive(Clone, Copy, Debug)]
pub struct BrowserNavigator {
    open_browser: bool,
}

impl BrowserNavigator {
    /// Create a navigator. With `open_browser` false it only prints.
    pub fn new(open_browser: bool) -> Self {
        Self { open_browser }
    }
}

impl Navigator for BrowserNavigator {
    fn navigate(&self, url: &str) -> Result<(), AuthError> {
        let launch = if self.open_browser {
            println!("Opening browser for authentication...");
            let opened = open::that(url);
            if let Err(e) = &opened {
                tracing::warn!("could not open browser: {e}");
            }
            Launch::Attempted {
                opened: opened.is_ok(),
            }
        } else {
            Launch::Skipped
        };
        println!("{}", launch.instructions(url));
        Ok(())
    }
}

/// Whether a browser launch was tried for this navigation.
#[derive(Clone, Copy, Debug)]
enum Launch {
    Skipped,
    Attempted { opened: bool },
}

impl Launch {
    fn instructions(self, url: &str) -> String {
        match self {
            Self::Skipped => format!("Visit:\n{url}"),
            Self::Attempted { opened: true } => format!("If the browser did not open, visit:\n{url}"),
            Self::Attempted { opened: false } => format!("Could not open browser. Please visit:\n{url}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
