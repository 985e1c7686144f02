//! Store contracts consumed by the identity and session services.
//!
//! Emails reaching a store are already normalized. Stores never interpret
//! records; uniqueness per email is the only guarantee they add.

pub mod memory;
pub mod postgres;

use anyhow::Result;
use async_trait::async_trait;

use super::model::{IdentityRecord, SessionRecord};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of an insert against a unique email key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    Conflict,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<IdentityRecord>>;

    async fn insert(&self, record: &IdentityRecord) -> Result<InsertOutcome>;

    /// Returns `false` when no record matched.
    async fn set_active(&self, email: &str, active: bool) -> Result<bool>;

    /// Returns `false` when no record matched.
    async fn delete(&self, email: &str) -> Result<bool>;

    async fn list(&self) -> Result<Vec<IdentityRecord>>;

    async fn ping(&self) -> Result<()>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn find(&self, email: &str) -> Result<Option<SessionRecord>>;

    /// Same as [`SessionStore::find`] restricted to rows with `active = true`.
    async fn find_active(&self, email: &str) -> Result<Option<SessionRecord>>;

    async fn insert(&self, record: &SessionRecord) -> Result<InsertOutcome>;

    /// Overwrite `active` and `session_token` of the row for `email`.
    /// Returns `false` when no row matched.
    async fn update(&self, email: &str, active: bool, session_token: Option<&str>)
        -> Result<bool>;
}
