//! In-process store for tests and `memory://` local runs.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{CredentialStore, InsertOutcome, SessionStore};
use crate::directory::model::{IdentityRecord, SessionRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    // Ordered so listings are stable, like a table scan by primary key.
    users: RwLock<BTreeMap<String, IdentityRecord>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find(&self, email: &str) -> Result<Option<IdentityRecord>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert(&self, record: &IdentityRecord) -> Result<InsertOutcome> {
        let mut users = self.users.write().await;
        if users.contains_key(&record.email) {
            return Ok(InsertOutcome::Conflict);
        }
        users.insert(record.email.clone(), record.clone());
        Ok(InsertOutcome::Created)
    }

    async fn set_active(&self, email: &str, active: bool) -> Result<bool> {
        Ok(self
            .users
            .write()
            .await
            .get_mut(email)
            .map(|record| record.active = active)
            .is_some())
    }

    async fn delete(&self, email: &str) -> Result<bool> {
        Ok(self.users.write().await.remove(email).is_some())
    }

    async fn list(&self) -> Result<Vec<IdentityRecord>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn find(&self, email: &str) -> Result<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(email).cloned())
    }

    async fn find_active(&self, email: &str) -> Result<Option<SessionRecord>> {
        Ok(self
            .sessions
            .read()
            .await
            .get(email)
            .filter(|record| record.active)
            .cloned())
    }

    async fn insert(&self, record: &SessionRecord) -> Result<InsertOutcome> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&record.email) {
            return Ok(InsertOutcome::Conflict);
        }
        sessions.insert(record.email.clone(), record.clone());
        Ok(InsertOutcome::Created)
    }

    async fn update(
        &self,
        email: &str,
        active: bool,
        session_token: Option<&str>,
    ) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let Some(record) = sessions.get_mut(email) else {
            return Ok(false);
        };
        record.active = active;
        record.session_token = session_token.map(str::to_string);
        Ok(true)
    }
}
