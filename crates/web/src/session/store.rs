//! Browser-session credential storage.

use tower_sessions::Session;

use super::{CredentialStore, CredentialStoreError, CurrentSession};

/// Session keys used by the web client.
pub mod keys {
    /// Key for storing the current signed-in account and its credential.
    pub const CURRENT_SESSION: &str = "current_session";

    /// Key for a one-shot message shown on the next login page render.
    pub const LOGIN_NOTICE: &str = "login_notice";
}

/// Stores the current session in the browser's `tower-sessions` session.
///
/// The cookie only carries the session ID; the credential itself stays
/// server-side in the session store.
#[derive(Debug, Clone)]
pub struct BrowserCredentialStore {
    session: Session,
}

impl BrowserCredentialStore {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Leave a message for the next login page render.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn set_login_notice(&self, notice: &str) -> Result<(), CredentialStoreError> {
        self.session.insert(keys::LOGIN_NOTICE, notice).await?;
        Ok(())
    }

    /// Take the pending login notice, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn take_login_notice(&self) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.session.remove::<String>(keys::LOGIN_NOTICE).await?)
    }
}

impl CredentialStore for BrowserCredentialStore {
    async fn load(&self) -> Result<Option<CurrentSession>, CredentialStoreError> {
        Ok(self.session.get(keys::CURRENT_SESSION).await?)
    }

    async fn save(&self, current: &CurrentSession) -> Result<(), CredentialStoreError> {
        // New credential, new session ID.
        self.session.cycle_id().await?;
        self.session.insert(keys::CURRENT_SESSION, current).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        self.session
            .remove::<CurrentSession>(keys::CURRENT_SESSION)
            .await?;
        Ok(())
    }
}
