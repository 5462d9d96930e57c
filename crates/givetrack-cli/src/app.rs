//! Application state shared by every command.
//!
//! Builds the session manager and API client from the saved configuration
//! and watches session notifications for the current run.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

use givetrack_core::models::UserProfile;
use givetrack_core::{ApiClient, Config, SessionEvent, SessionManager};

/// Shown once when the session could not be refreshed
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please login again.";

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    session_events: broadcast::Receiver<SessionEvent>,
}

impl App {
    /// Load config and the stored session, then build the API client.
    /// `api_url` overrides the configured base URL.
    pub async fn new(api_url: Option<String>) -> Result<Self> {
        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "Failed to load config, using defaults");
                Config::default()
            }
        };

        let session = Arc::new(SessionManager::new(config.session_store()?));
        let session_events = session.subscribe();
        let restored = session.load().await;
        debug!(restored, "Session restored");

        let base_url = api_url.unwrap_or_else(|| config.api_url());
        let api = ApiClient::new(&base_url, config.request_timeout(), session)?;

        Ok(Self {
            config,
            api,
            session_events,
        })
    }

    /// Drain pending session notifications. Returns true if the session
    /// was invalidated since the last call.
    pub fn take_session_expired(&mut self) -> bool {
        let mut expired = false;
        loop {
            match self.session_events.try_recv() {
                Ok(SessionEvent::Invalidated) => expired = true,
                Ok(event) => debug!(?event, "Session event"),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Missed session events");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        expired
    }

    /// The signed-in user, or an error asking them to log in
    pub async fn require_user(&self) -> Result<UserProfile> {
        self.api
            .session()
            .user()
            .await
            .ok_or_else(|| anyhow!("Not logged in. Run `givetrack login` first."))
    }

    /// The signed-in user if their role may create, edit or delete events
    pub async fn require_event_manager(&self) -> Result<UserProfile> {
        let user = self.require_user().await?;
        if !user.role.can_manage_events() {
            bail!(
                "Only admin and HR accounts can manage events (signed in as '{}')",
                user.role
            );
        }
        Ok(user)
    }
}

/// Ask a yes/no question on stdin; anything but `y` or `yes` is no
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N]: ", question);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Read a line from stdin, falling back to `default` when left blank
pub fn prompt(label: &str, default: Option<&str>) -> Result<String> {
    match default {
        Some(value) => print!("{} [{}]: ", label, value),
        None => print!("{}: ", label),
    }
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    Ok(match default {
        Some(value) if input.is_empty() => value.to_string(),
        _ => input.to_string(),
    })
}
