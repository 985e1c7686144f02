//! Registration, login verification and admin mutations of identity records.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, instrument};

use super::admin::AdminCapability;
use super::error::{DirectoryError, InvalidField, Result};
use super::model::{AdminOverview, DirectoryEntry, IdentityRecord, Profile};
use super::session::SessionManager;
use super::store::{CredentialStore, InsertOutcome};

const MIN_PHONE_DIGITS: usize = 10;

/// Canonical form of an email for every lookup and write.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// `local@domain.tld` with word characters, dots and dashes.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[\w.-]+@[\w.-]+\.\w+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(email))
}

#[must_use]
pub fn valid_phone(phone: &str) -> bool {
    phone.len() >= MIN_PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Unsalted SHA-256, hex encoded. Stable across calls so login can compare digests.
#[must_use]
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Successful login for a normalized email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authenticated {
    pub email: String,
}

#[derive(Clone)]
pub struct IdentityService {
    credentials: Arc<dyn CredentialStore>,
    sessions: SessionManager,
}

impl std::fmt::Debug for IdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityService").finish_non_exhaustive()
    }
}

impl IdentityService {
    /// The session manager is only used to end sessions of removed or
    /// deactivated accounts.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialStore>, sessions: SessionManager) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    /// Register a new alumnus.
    ///
    /// Checks run in this order: email format, phone, duplicate email,
    /// required fields.
    ///
    /// # Errors
    /// `InvalidField`, `DuplicateEmail`, or a store error.
    #[instrument(skip_all, fields(email = %profile.email))]
    pub async fn register(&self, profile: Profile, password: &str) -> Result<()> {
        let email = normalize_email(&profile.email);

        if !valid_email(&email) {
            return Err(DirectoryError::InvalidField(InvalidField::Email));
        }

        if !valid_phone(&profile.phone) {
            return Err(DirectoryError::InvalidField(InvalidField::Phone));
        }

        if self.credentials.find(&email).await?.is_some() {
            debug!("email already registered");
            return Err(DirectoryError::DuplicateEmail);
        }

        let required = [
            profile.name.as_str(),
            password,
            profile.batch.as_str(),
            profile.year_of_passout.as_str(),
            profile.profession.as_str(),
        ];
        if required.iter().any(|value| value.is_empty()) {
            return Err(DirectoryError::InvalidField(InvalidField::MissingRequired));
        }

        let record = IdentityRecord {
            email,
            name: profile.name,
            phone: profile.phone,
            batch: profile.batch,
            year_of_passout: profile.year_of_passout,
            address: profile.address,
            profession: profile.profession,
            password_hash: hash_password(password),
            active: true,
        };

        match self.credentials.insert(&record).await? {
            InsertOutcome::Created => {
                info!("alumni registered");
                Ok(())
            }
            // Lost a race with a concurrent registration for the same email.
            InsertOutcome::Conflict => Err(DirectoryError::DuplicateEmail),
        }
    }

    /// Verify credentials. Checks run in the order not found, wrong password, inactive.
    ///
    /// # Errors
    /// `UserNotFound`, `WrongPassword`, `Inactive`, or a store error.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Authenticated> {
        let email = normalize_email(email);
        let Some(record) = self.credentials.find(&email).await? else {
            return Err(DirectoryError::UserNotFound);
        };

        if record.password_hash != hash_password(password) {
            return Err(DirectoryError::WrongPassword);
        }

        if !record.active {
            return Err(DirectoryError::Inactive);
        }

        Ok(Authenticated { email })
    }

    /// Activate or deactivate an account. Deactivation also ends its session.
    ///
    /// # Errors
    /// `UserNotFound`, or a store error.
    #[instrument(skip(self, _admin))]
    pub async fn set_active(
        &self,
        _admin: &AdminCapability,
        email: &str,
        active: bool,
    ) -> Result<()> {
        let email = normalize_email(email);
        if !self.credentials.set_active(&email, active).await? {
            return Err(DirectoryError::UserNotFound);
        }

        if !active {
            self.sessions.end(&email).await?;
        }

        info!("account status changed");
        Ok(())
    }

    /// Remove an account and end its session.
    ///
    /// # Errors
    /// `UserNotFound`, or a store error.
    #[instrument(skip(self, _admin))]
    pub async fn delete(&self, _admin: &AdminCapability, email: &str) -> Result<()> {
        let email = normalize_email(email);
        if !self.credentials.delete(&email).await? {
            return Err(DirectoryError::UserNotFound);
        }

        self.sessions.end(&email).await?;

        info!("account deleted");
        Ok(())
    }

    /// Every account with its status, for the admin dashboard.
    ///
    /// # Errors
    /// Returns a store error if the scan fails.
    pub async fn list_all(&self, _admin: &AdminCapability) -> Result<AdminOverview> {
        Ok(AdminOverview::from(self.credentials.list().await?))
    }

    /// Privacy-filtered listing for signed-in alumni.
    ///
    /// # Errors
    /// Returns a store error if the scan fails.
    pub async fn list_directory(&self) -> Result<Vec<DirectoryEntry>> {
        let mut entries: Vec<DirectoryEntry> = self
            .credentials
            .list()
            .await?
            .iter()
            .map(DirectoryEntry::from)
            .collect();
        entries.sort_by(DirectoryEntry::directory_order);
        Ok(entries)
    }

    /// # Errors
    /// Returns an error if the credential store is unreachable.
    pub async fn ping(&self) -> anyhow::Result<()> {
        self.credentials.ping().await
    }
}
