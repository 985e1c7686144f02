//! Alumni identities and their single active session.
//!
//! [`IdentityService`] owns every mutation of identity records and
//! [`SessionManager`] owns every mutation of session records. Both are
//! stateless over the stores; the store is the single source of truth.
//! Admin-only operations require an [`AdminCapability`] from the [`AdminGate`].

pub mod admin;
pub mod error;
pub mod identity;
pub mod model;
pub mod session;
pub mod store;

pub use admin::{AdminCapability, AdminGate, AdminGrant};
pub use error::{DirectoryError, InvalidField};
pub use identity::{Authenticated, IdentityService};
pub use model::{AdminOverview, DirectoryEntry, IdentityRecord, MemberRecord, Profile, SessionRecord};
pub use session::SessionManager;
pub use store::{CredentialStore, InsertOutcome, MemoryStore, PgStore, SessionStore};
