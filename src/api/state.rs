//! Shared handler state and presentation-side configuration.

use std::str::FromStr;
use std::sync::Arc;

use crate::directory::{AdminGate, CredentialStore, IdentityService, SessionManager, SessionStore};

/// What a login does when the account already has a live session elsewhere.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginPolicy {
    /// The new login replaces the old token; the other device is signed out.
    #[default]
    Takeover,
    /// The new login is refused until the other device logs out.
    Reject,
}

impl LoginPolicy {
    pub const VARIANTS: [&'static str; 2] = ["takeover", "reject"];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Takeover => "takeover",
            Self::Reject => "reject",
        }
    }
}

impl FromStr for LoginPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "takeover" => Ok(Self::Takeover),
            "reject" => Ok(Self::Reject),
            other => Err(format!("invalid login policy: {other}")),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    session_cookie_secure: bool,
    login_policy: LoginPolicy,
    frontend_origin: Option<String>,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_login_policy(mut self, policy: LoginPolicy) -> Self {
        self.login_policy = policy;
        self
    }

    #[must_use]
    pub fn with_frontend_origin(mut self, origin: Option<String>) -> Self {
        self.frontend_origin = origin;
        self
    }

    #[must_use]
    pub const fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }

    #[must_use]
    pub const fn login_policy(&self) -> LoginPolicy {
        self.login_policy
    }

    #[must_use]
    pub fn frontend_origin(&self) -> Option<&str> {
        self.frontend_origin.as_deref()
    }
}

#[derive(Debug)]
pub struct AppState {
    identity: IdentityService,
    sessions: SessionManager,
    admin: AdminGate,
    config: AppConfig,
}

impl AppState {
    #[must_use]
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        session_store: Arc<dyn SessionStore>,
        admin: AdminGate,
        config: AppConfig,
    ) -> Self {
        let sessions = SessionManager::new(session_store);
        Self {
            identity: IdentityService::new(credentials, sessions.clone()),
            sessions,
            admin,
            config,
        }
    }

    #[must_use]
    pub const fn identity(&self) -> &IdentityService {
        &self.identity
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    #[must_use]
    pub const fn admin(&self) -> &AdminGate {
        &self.admin
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.config
    }
}
