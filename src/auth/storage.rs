// ABOUTME: Persistence of the signed-in session between runs
// ABOUTME: JSON file storage under the user config dir and an in-memory variant for tests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Gymtrack Contributors

use super::Session;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Where the signed-in session survives restarts
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Previously saved session, if any
    async fn load(&self) -> AppResult<Option<Session>>;

    /// Replace the saved session
    async fn save(&self, session: &Session) -> AppResult<()>;

    /// Forget the saved session
    async fn clear(&self) -> AppResult<()>;
}

/// Session stored as a JSON file
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Store the session at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File location
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> AppResult<Option<Session>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::storage(format!(
                    "Failed to read session file {}: {e}",
                    self.path.display()
                ))
                .with_source(e))
            }
        };
        // A corrupt file is treated as signed out
        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!(
                    "Failed to create session directory {}: {e}",
                    parent.display()
                ))
                .with_source(e)
            })?;
        }
        let json = serde_json::to_vec_pretty(session)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).await.map_err(|e| {
            AppError::storage(format!("Failed to write session file: {e}")).with_source(e)
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::storage(format!("Failed to replace session file: {e}")).with_source(e)
        })?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::storage(format!(
                "Failed to remove session file {}: {e}",
                self.path.display()
            ))
            .with_source(e)),
        }
    }
}

/// Session kept in process memory
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    session: RwLock<Option<Session>>,
}

impl MemorySessionStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage already holding `session`
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> AppResult<Option<Session>> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> AppResult<()> {
        *self.session.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        *self.session.write().await = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthUser;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn session() -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at: Utc::now() + Duration::hours(1),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: Some("lifter@example.com".into()),
            },
        }
    }

    #[tokio::test]
    async fn test_file_storage_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("nested").join("session.json"));

        assert!(storage.load().await.unwrap().is_none());
        let saved = session();
        storage.save(&saved).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(saved));

        storage.clear().await.unwrap();
        assert!(storage.load().await.unwrap().is_none());
        storage.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_signed_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let storage = FileSessionStorage::new(path);
        assert!(storage.load().await.unwrap().is_none());
    }
}
