//! Single active session per account.
//!
//! A session row moves through `Absent -> Active(t)`, `Active(t1) -> Active(t2)`
//! on a new login (takeover), `Active(t) -> Inactive` on logout, and back to
//! `Active(t')` on the next login. Holders of a superseded token find out on
//! their next request through [`SessionManager::is_active_with_token`].
//!
//! Nothing here serializes concurrent `begin` calls for the same email; the
//! last write wins.

use std::sync::Arc;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::error::{DirectoryError, Result};
use super::identity::normalize_email;
use super::model::SessionRecord;
use super::store::{InsertOutcome, SessionStore};

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").finish_non_exhaustive()
    }
}

/// Fresh opaque session token.
fn generate_session_token() -> String {
    Uuid::new_v4().to_string()
}

impl SessionManager {
    #[must_use]
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Whether `email` currently has an active session, whoever holds it.
    ///
    /// # Errors
    /// Returns a store error if the lookup fails.
    pub async fn is_active(&self, email: &str) -> Result<bool> {
        let email = normalize_email(email);
        Ok(self.store.find_active(&email).await?.is_some())
    }

    /// Whether `token` is the active session token for `email`.
    ///
    /// # Errors
    /// Returns a store error if the lookup fails.
    pub async fn is_active_with_token(&self, email: &str, token: &str) -> Result<bool> {
        let email = normalize_email(email);
        Ok(self
            .store
            .find_active(&email)
            .await?
            .is_some_and(|record| record.holds(token)))
    }

    /// Like [`Self::is_active_with_token`], reporting a superseded or ended
    /// token as [`DirectoryError::SessionConflict`].
    ///
    /// # Errors
    /// `SessionConflict` when the token is no longer the active one, or a store error.
    #[instrument(skip(self, token))]
    pub async fn validate(&self, email: &str, token: &str) -> Result<()> {
        if self.is_active_with_token(email, token).await? {
            Ok(())
        } else {
            debug!("session token superseded or ended");
            Err(DirectoryError::SessionConflict)
        }
    }

    /// Start a session for `email`, replacing any token issued before.
    ///
    /// # Errors
    /// Returns a store error if the session row cannot be written.
    #[instrument(skip(self))]
    pub async fn begin(&self, email: &str) -> Result<String> {
        let email = normalize_email(email);
        let token = generate_session_token();

        if self.store.find(&email).await?.is_some()
            && self.store.update(&email, true, Some(&token)).await?
        {
            debug!("session token replaced");
            return Ok(token);
        }

        match self
            .store
            .insert(&SessionRecord::active(&email, token.clone()))
            .await?
        {
            InsertOutcome::Created => debug!("session created"),
            InsertOutcome::Conflict => {
                // A concurrent begin created the row first; overwrite it.
                warn!("session row created concurrently, overwriting");
                self.store.update(&email, true, Some(&token)).await?;
            }
        }

        Ok(token)
    }

    /// End the session for `email`. No-op when no row exists.
    ///
    /// # Errors
    /// Returns a store error if the session row cannot be written.
    #[instrument(skip(self))]
    pub async fn end(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if !self.store.update(&email, false, None).await? {
            debug!("no session row to end");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::store::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use tokio::sync::Mutex;

    /// Reports no row on lookup but refuses the insert, as when another
    /// `begin` for the same email commits in between.
    #[derive(Default)]
    struct RacingStore {
        updates: Mutex<Vec<(String, bool, Option<String>)>>,
    }

    #[async_trait]
    impl SessionStore for RacingStore {
        async fn find(&self, _email: &str) -> anyhow::Result<Option<SessionRecord>> {
            Ok(None)
        }

        async fn find_active(&self, _email: &str) -> anyhow::Result<Option<SessionRecord>> {
            Ok(None)
        }

        async fn insert(&self, _record: &SessionRecord) -> anyhow::Result<InsertOutcome> {
            Ok(InsertOutcome::Conflict)
        }

        async fn update(
            &self,
            email: &str,
            active: bool,
            session_token: Option<&str>,
        ) -> anyhow::Result<bool> {
            self.updates.lock().await.push((
                email.to_string(),
                active,
                session_token.map(str::to_string),
            ));
            Ok(true)
        }
    }

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn absent_row_is_inactive() -> Result<()> {
        let sessions = manager();
        assert!(!sessions.is_active("nobody@x.com").await?);
        assert!(!sessions.is_active_with_token("nobody@x.com", "t").await?);
        Ok(())
    }

    #[tokio::test]
    async fn second_begin_supersedes_first_token() -> Result<()> {
        let sessions = manager();
        let first = sessions.begin("bob@x.com").await?;
        let second = sessions.begin("bob@x.com").await?;

        assert_ne!(first, second);
        assert!(!sessions.is_active_with_token("bob@x.com", &first).await?);
        assert!(sessions.is_active_with_token("bob@x.com", &second).await?);
        assert!(matches!(
            sessions.validate("bob@x.com", &first).await,
            Err(DirectoryError::SessionConflict)
        ));
        Ok(())
    }

    #[tokio::test]
    async fn end_then_begin_issues_fresh_token() -> Result<()> {
        let sessions = manager();
        let mut seen = HashSet::new();
        seen.insert(sessions.begin("carol@x.com").await?);

        sessions.end("carol@x.com").await?;
        assert!(!sessions.is_active("carol@x.com").await?);

        let again = sessions.begin("carol@x.com").await?;
        assert!(seen.insert(again.clone()));
        assert!(sessions.is_active_with_token("carol@x.com", &again).await?);
        Ok(())
    }

    #[tokio::test]
    async fn emails_are_normalized() -> Result<()> {
        let sessions = manager();
        let token = sessions.begin("Dave@X.com").await?;
        assert!(sessions.is_active_with_token("dave@x.com", &token).await?);
        assert!(sessions.is_active(" DAVE@x.COM ").await?);
        Ok(())
    }

    #[tokio::test]
    async fn begin_overwrites_row_created_concurrently() -> Result<()> {
        let store = Arc::new(RacingStore::default());
        let sessions = SessionManager::new(store.clone());

        let token = sessions.begin("Erin@x.com").await?;

        let updates = store.updates.lock().await;
        assert_eq!(
            *updates,
            vec![("erin@x.com".to_string(), true, Some(token))]
        );
        Ok(())
    }

    #[tokio::test]
    async fn end_without_row_is_noop() -> Result<()> {
        let sessions = manager();
        sessions.end("ghost@x.com").await?;
        assert!(!sessions.is_active("ghost@x.com").await?);
        Ok(())
    }
}
