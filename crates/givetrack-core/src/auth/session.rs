use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

use crate::models::{Role, UserProfile};

use super::SessionStore;

/// Capacity of the session event channel. Subscribers that fall further
/// behind than this only miss old events, never block the pipeline.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Persisted session. Both tokens are required, so a stored session can
/// never hold one credential without the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub username: String,
    #[serde(rename = "user_role")]
    pub role: Role,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(access_token: String, refresh_token: String, user: UserProfile) -> Self {
        Self {
            access_token,
            refresh_token,
            username: user.username,
            role: user.role,
            email: user.email,
            created_at: Utc::now(),
        }
    }

    pub fn user(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            role: self.role.clone(),
            email: self.email.clone(),
        }
    }
}

/// Session lifecycle notifications for the view layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { username: String },
    Refreshed,
    /// The session could not be recovered; the user has to log in again
    Invalidated,
    LoggedOut,
}

/// Owns the current credentials and keeps them in sync with durable storage.
///
/// All reads and writes of tokens go through here. Writes happen in three
/// places only: login (`set_after_login`), a successful refresh
/// (`set_after_refresh`, access token only) and teardown (`clear`).
pub struct SessionManager {
    data: RwLock<Option<SessionData>>,
    store: Box<dyn SessionStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            data: RwLock::new(None),
            store,
            events,
        }
    }

    /// Restore the session from durable storage. Returns true when a
    /// session was found.
    pub async fn load(&self) -> bool {
        let loaded = match self.store.load() {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Failed to load stored session, starting logged out");
                None
            }
        };
        let found = loaded.is_some();
        debug!(found, "Session loaded from storage");
        *self.data.write().await = loaded;
        found
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn notify(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub async fn access_token(&self) -> Option<String> {
        self.data.read().await.as_ref().map(|d| d.access_token.clone())
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.data.read().await.as_ref().map(|d| d.refresh_token.clone())
    }

    pub async fn current(&self) -> Option<SessionData> {
        self.data.read().await.clone()
    }

    pub async fn user(&self) -> Option<UserProfile> {
        self.data.read().await.as_ref().map(SessionData::user)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.data.read().await.is_some()
    }

    /// Persist a freshly authenticated session as one unit
    pub async fn set_after_login(&self, data: SessionData) -> anyhow::Result<()> {
        let mut guard = self.data.write().await;
        self.store.save(&data)?;
        let username = data.username.clone();
        *guard = Some(data);
        drop(guard);

        info!(username = %username, "Session established");
        self.notify(SessionEvent::LoggedIn { username });
        Ok(())
    }

    /// Replace the access token after a refresh, keeping the refresh token.
    /// Returns false if the session was cleared in the meantime; a cleared
    /// session is never brought back by a late refresh.
    pub async fn set_after_refresh(&self, access_token: &str) -> bool {
        let mut guard = self.data.write().await;
        let Some(data) = guard.as_mut() else {
            debug!("Session cleared before refresh completed, dropping new token");
            return false;
        };
        data.access_token = access_token.to_string();
        if let Err(e) = self.store.save(data) {
            warn!(error = %e, "Failed to persist refreshed access token");
        }
        drop(guard);

        self.notify(SessionEvent::Refreshed);
        true
    }

    /// Remove all credentials from memory and storage. Safe to call when
    /// already logged out.
    pub async fn clear(&self) {
        let mut guard = self.data.write().await;
        *guard = None;
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored session");
        }
    }

    /// Tear down an unrecoverable session and tell the view layer
    pub async fn invalidate(&self) {
        self.clear().await;
        warn!("Session invalidated, re-authentication required");
        self.notify(SessionEvent::Invalidated);
    }

    pub async fn logout(&self) {
        self.clear().await;
        info!("Logged out");
        self.notify(SessionEvent::LoggedOut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemorySessionStore;

    fn sample() -> SessionData {
        SessionData::new(
            "access-1".to_string(),
            "refresh-1".to_string(),
            UserProfile {
                username: "ravi".to_string(),
                role: Role::Admin,
                email: "ravi@example.org".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_load_restores_stored_session() {
        let manager = SessionManager::new(Box::new(MemorySessionStore::with_session(sample())));
        assert!(!manager.is_authenticated().await);
        assert!(manager.load().await);
        assert_eq!(manager.access_token().await.as_deref(), Some("access-1"));
        assert_eq!(manager.refresh_token().await.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_login_then_refresh_keeps_refresh_token() {
        let manager = SessionManager::new(Box::new(MemorySessionStore::new()));
        let mut events = manager.subscribe();

        manager.set_after_login(sample()).await.expect("login");
        assert_eq!(
            events.recv().await.expect("event"),
            SessionEvent::LoggedIn {
                username: "ravi".to_string()
            }
        );

        assert!(manager.set_after_refresh("access-2").await);
        assert_eq!(events.recv().await.expect("event"), SessionEvent::Refreshed);
        assert_eq!(manager.access_token().await.as_deref(), Some("access-2"));
        assert_eq!(manager.refresh_token().await.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn test_refresh_does_not_resurrect_cleared_session() {
        let manager = SessionManager::new(Box::new(MemorySessionStore::new()));
        assert!(!manager.set_after_refresh("access-2").await);
        assert!(manager.access_token().await.is_none());
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let manager = SessionManager::new(Box::new(MemorySessionStore::with_session(sample())));
        manager.load().await;
        let mut events = manager.subscribe();

        manager.logout().await;
        manager.logout().await;

        assert!(!manager.is_authenticated().await);
        assert_eq!(events.recv().await.expect("event"), SessionEvent::LoggedOut);
        assert_eq!(events.recv().await.expect("event"), SessionEvent::LoggedOut);
    }

    #[tokio::test]
    async fn test_invalidate_clears_and_notifies() {
        let manager = SessionManager::new(Box::new(MemorySessionStore::with_session(sample())));
        manager.load().await;
        let mut events = manager.subscribe();

        manager.invalidate().await;

        assert!(manager.current().await.is_none());
        assert_eq!(events.recv().await.expect("event"), SessionEvent::Invalidated);
    }
}
