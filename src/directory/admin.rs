//! Fixed-credential admin gate.
//!
//! Flow Overview:
//! 1) `login` compares the submitted username/password with the configured pair.
//! 2) On a match it mints a random grant token; only its SHA-256 is kept.
//! 3) Admin-only operations take an [`AdminCapability`], which only
//!    `authorize` can produce from an unexpired grant token.

use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::error::DirectoryError;

const DEFAULT_GRANT_TTL_SECONDS: u64 = 60 * 60;

/// Proof that the caller passed the admin gate. Cannot be built outside this crate.
#[derive(Debug)]
pub struct AdminCapability {
    _sealed: (),
}

/// Raw grant token handed to the admin client.
#[derive(Debug, Clone)]
pub struct AdminGrant {
    pub token: String,
    pub expires_in: Duration,
}

pub struct AdminGate {
    username: String,
    password: SecretString,
    ttl: Duration,
    grants: Mutex<HashMap<Vec<u8>, Instant>>,
}

impl std::fmt::Debug for AdminGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGate")
            .field("username", &self.username)
            .field("password", &"***")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn digest(value: &[u8]) -> Vec<u8> {
    Sha256::digest(value).to_vec()
}

fn generate_grant_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate admin grant token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

impl AdminGate {
    #[must_use]
    pub fn new(username: String, password: SecretString) -> Self {
        Self {
            username,
            password,
            ttl: Duration::from_secs(DEFAULT_GRANT_TTL_SECONDS),
            grants: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check the fixed admin credentials and mint a grant.
    ///
    /// # Errors
    /// `AdminDenied` on mismatch, or a store error if no randomness is available.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AdminGrant, DirectoryError> {
        // Compare digests so both checks always run over equal-length input.
        let user_ok = digest(username.as_bytes()) == digest(self.username.as_bytes());
        let password_ok =
            digest(password.as_bytes()) == digest(self.password.expose_secret().as_bytes());
        if !(user_ok && password_ok) {
            warn!("admin login rejected");
            return Err(DirectoryError::AdminDenied);
        }

        let token = generate_grant_token()?;
        let now = Instant::now();
        let mut grants = self.grants.lock().await;
        grants.retain(|_, expires_at| *expires_at > now);
        grants.insert(digest(token.as_bytes()), now + self.ttl);
        info!("admin grant issued");

        Ok(AdminGrant {
            token,
            expires_in: self.ttl,
        })
    }

    /// Resolve a grant token into a capability, if it is known and unexpired.
    pub async fn authorize(&self, token: &str) -> Option<AdminCapability> {
        let key = digest(token.as_bytes());
        let mut grants = self.grants.lock().await;
        match grants.get(&key) {
            Some(expires_at) if *expires_at > Instant::now() => {
                Some(AdminCapability { _sealed: () })
            }
            Some(_) => {
                debug!("admin grant expired");
                grants.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Forget a grant. Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) {
        if self
            .grants
            .lock()
            .await
            .remove(&digest(token.as_bytes()))
            .is_some()
        {
            info!("admin grant revoked");
        }
    }
}

#[cfg(test)]
pub(crate) fn test_capability() -> AdminCapability {
    AdminCapability { _sealed: () }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::new("admin".to_string(), SecretString::from("s3cret".to_string()))
    }

    #[tokio::test]
    async fn login_rejects_wrong_credentials() {
        let gate = gate();
        assert!(matches!(
            gate.login("admin", "nope").await,
            Err(DirectoryError::AdminDenied)
        ));
        assert!(matches!(
            gate.login("root", "s3cret").await,
            Err(DirectoryError::AdminDenied)
        ));
    }

    #[tokio::test]
    async fn grant_authorizes_until_revoked() -> Result<(), DirectoryError> {
        let gate = gate();
        let grant = gate.login("admin", "s3cret").await?;
        assert_eq!(
            Base64UrlUnpadded::decode_vec(&grant.token).map(|b| b.len()).ok(),
            Some(32)
        );
        assert!(gate.authorize(&grant.token).await.is_some());
        assert!(gate.authorize("forged").await.is_none());

        gate.revoke(&grant.token).await;
        assert!(gate.authorize(&grant.token).await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn expired_grant_is_refused() -> Result<(), DirectoryError> {
        let gate = gate().with_ttl(Duration::ZERO);
        let grant = gate.login("admin", "s3cret").await?;
        assert!(gate.authorize(&grant.token).await.is_none());
        Ok(())
    }

    #[test]
    fn debug_redacts_password() {
        let rendered = format!("{:?}", gate());
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("s3cret"));
    }
}
