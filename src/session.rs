use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};
use uuid::Uuid;

/// Profile attributes carried inside the session record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserMetadata {
    pub cnic_id: String,
    pub full_name: String,
}

/// The persisted "currently signed in" record. Field layout mirrors the
/// auth-provider user object the dashboard UI consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: String,
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub app_metadata: serde_json::Map<String, serde_json::Value>,
    pub aud: String,
    pub role: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Single-slot session persistence. One serialized [`SessionUser`] lives in
/// one JSON file; there is no expiry and no refresh.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read back the persisted session. A missing, unreadable or corrupt
    /// file all mean "no session" rather than an error.
    pub fn load(&self) -> Option<SessionUser> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "discarding corrupt session record");
                None
            }
        }
    }

    pub fn save(&self, user: &SessionUser) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("create session directory")?;
            }
        }
        let raw = serde_json::to_string(user).context("serialize session")?;
        std::fs::write(&self.path, raw).context("write session file")?;
        debug!(user_id = %user.id, "session persisted");
        Ok(())
    }

    /// Remove the persisted session. Storage failures are logged, never
    /// surfaced; sign-out always succeeds.
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("session cleared"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = %self.path.display(), "failed to clear session"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            email: "12345-1234567-1@driving-test.local".into(),
            user_metadata: UserMetadata {
                cnic_id: "12345-1234567-1".into(),
                full_name: "Ali Raza".into(),
            },
            app_metadata: serde_json::Map::new(),
            aud: "authenticated".into(),
            role: "authenticated".into(),
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        let user = sample_user();
        store.save(&user).expect("save should succeed");
        assert_eq!(store.load(), Some(user));
    }

    #[test]
    fn load_missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn load_corrupt_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::new(path);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn clear_removes_the_slot() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SessionStore::new(dir.path().join("session.json"));
        store.save(&sample_user()).expect("save should succeed");
        store.clear();
        assert_eq!(store.load(), None);
        // clearing an already-empty slot is fine
        store.clear();
    }

    #[test]
    fn persisted_shape_matches_auth_provider_contract() {
        let user = sample_user();
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["aud"], "authenticated");
        assert_eq!(json["role"], "authenticated");
        assert_eq!(json["user_metadata"]["cnic_id"], "12345-1234567-1");
        assert!(json["app_metadata"].as_object().unwrap().is_empty());
        assert!(json["created_at"].as_str().unwrap().contains('T'));
    }
}
