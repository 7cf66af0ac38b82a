//! File-backed credential storage.
//!
//! The terminal client keeps the signed-in session in a small JSON file so
//! it survives between invocations. The file holds one well-known key,
//! `current_session`, and is removed on logout.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use store_rating_web::session::{CredentialStore, CredentialStoreError, CurrentSession};

/// Session file used when `STORE_RATING_SESSION_FILE` is not set.
pub const DEFAULT_SESSION_FILE: &str = ".store-rating-session.json";

/// On-disk layout of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    current_session: Option<CurrentSession>,
}

/// Stores the current session in a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<CurrentSession>, CredentialStoreError> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let file: SessionFile = serde_json::from_str(&text)?;
        Ok(file.current_session)
    }

    async fn save(&self, session: &CurrentSession) -> Result<(), CredentialStoreError> {
        let file = SessionFile {
            current_session: Some(session.clone()),
        };
        let json = serde_json::to_string_pretty(&file)?;

        // Holds a bearer token. Private before anything is written, also
        // when an older file is reused.
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut handle = options.open(&self.path).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            handle
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .await?;
        }
        handle.write_all(json.as_bytes()).await?;
        handle.flush().await?;

        tracing::debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
