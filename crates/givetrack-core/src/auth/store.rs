use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use super::SessionData;

/// Session file name in cache directory
const SESSION_FILE: &str = "session.json";

/// Durable storage for the session, surviving process restarts.
///
/// Implementations write the whole session as one unit so a reader never
/// observes an access token without its refresh token.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<SessionData>>;
    fn save(&self, data: &SessionData) -> Result<()>;
    /// Remove every stored session key. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// JSON file in the cache directory
pub struct FileSessionStore {
    cache_dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    fn session_path(&self) -> PathBuf {
        self.cache_dir.join(SESSION_FILE)
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read session file")?;
        let data: SessionData =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let path = self.session_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
        }
        let contents = serde_json::to_string_pretty(data)?;
        // Write then rename so the file is never half-written
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).context("Failed to write session file")?;
        std::fs::rename(&tmp, &path).context("Failed to replace session file")?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path).context("Failed to remove session file")?;
        }
        Ok(())
    }
}

/// Process-local store, used in tests and for throwaway sessions
#[derive(Default)]
pub struct MemorySessionStore {
    data: Mutex<Option<SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(data: SessionData) -> Self {
        Self {
            data: Mutex::new(Some(data)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionData>> {
        let guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?;
        Ok(guard.clone())
    }

    fn save(&self, data: &SessionData) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?;
        *guard = Some(data.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| anyhow::anyhow!("Session store lock poisoned"))?;
        *guard = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserProfile};

    fn sample() -> SessionData {
        SessionData::new(
            "access-1".to_string(),
            "refresh-1".to_string(),
            UserProfile {
                username: "asha".to_string(),
                role: Role::Hr,
                email: "asha@example.org".to_string(),
            },
        )
    }

    #[test]
    fn test_file_store_round_trip_and_clear() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().join("nested"));

        assert!(store.load().expect("load empty").is_none());

        store.save(&sample()).expect("save");
        let loaded = store.load().expect("load").expect("session present");
        assert_eq!(loaded.access_token, "access-1");
        assert_eq!(loaded.refresh_token, "refresh-1");
        assert_eq!(loaded.role, Role::Hr);

        store.clear().expect("clear");
        assert!(store.load().expect("load cleared").is_none());
        // Clearing twice is fine
        store.clear().expect("clear again");
    }

    #[test]
    fn test_file_store_uses_fixed_key_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(dir.path().to_path_buf());
        store.save(&sample()).expect("save");

        let raw = std::fs::read_to_string(dir.path().join(SESSION_FILE)).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        for key in ["access_token", "refresh_token", "user_role", "username", "email"] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(SESSION_FILE), "{not json").expect("write");
        let store = FileSessionStore::new(dir.path().to_path_buf());
        assert!(store.load().is_err());
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert!(store.load().expect("load").is_none());
        store.save(&sample()).expect("save");
        assert_eq!(
            store.load().expect("load").map(|d| d.username),
            Some("asha".to_string())
        );
        store.clear().expect("clear");
        assert!(store.load().expect("load").is_none());
    }
}
