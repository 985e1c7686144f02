use crate::{
    api::{self, AppConfig, AppState, LoginPolicy},
    cli::telemetry,
    directory::{AdminGate, CredentialStore, MemoryStore, PgStore, SessionStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};
use url::Url;

pub const MEMORY_DSN: &str = "memory://";

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub admin_username: String,
    pub admin_password: SecretString,
    pub admin_token_ttl_seconds: u64,
    pub session_cookie_secure: bool,
    pub login_policy: LoginPolicy,
    pub frontend_base_url: Option<String>,
}

impl Args {
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig::new()
            .with_session_cookie_secure(self.session_cookie_secure)
            .with_login_policy(self.login_policy)
            .with_frontend_origin(self.frontend_base_url.clone())
    }

    #[must_use]
    pub fn admin_gate(&self) -> AdminGate {
        AdminGate::new(self.admin_username.clone(), self.admin_password.clone())
            .with_ttl(Duration::from_secs(self.admin_token_ttl_seconds))
    }
}

/// Connect the stores named by `dsn`.
///
/// `memory://` keeps both stores in process; anything else is a PostgreSQL URL.
///
/// # Errors
/// Returns an error if the DSN is malformed or the database is unreachable.
pub async fn connect(dsn: &str) -> Result<(Arc<dyn CredentialStore>, Arc<dyn SessionStore>)> {
    if dsn == MEMORY_DSN {
        warn!("Using in-memory store; accounts are lost on restart");
        let store = Arc::new(MemoryStore::new());
        let credentials: Arc<dyn CredentialStore> = store.clone();
        let sessions: Arc<dyn SessionStore> = store;
        return Ok((credentials, sessions));
    }

    let parsed = Url::parse(dsn).context("Invalid database connection string")?;
    info!(
        "Connecting to database at {}",
        parsed.host_str().unwrap_or("localhost")
    );

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let store = Arc::new(PgStore::new(pool));
    let credentials: Arc<dyn CredentialStore> = store.clone();
    let sessions: Arc<dyn SessionStore> = store;
    Ok((credentials, sessions))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the stores cannot be reached or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let (credentials, sessions) = connect(&args.dsn).await?;

    let state = Arc::new(AppState::new(
        credentials,
        sessions,
        args.admin_gate(),
        args.app_config(),
    ));

    info!(
        login_policy = args.login_policy.as_str(),
        "Starting server on port {}", args.port
    );

    let result = api::new(args.port, state).await;

    telemetry::shutdown_tracer();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            port: 8080,
            dsn: MEMORY_DSN.to_string(),
            admin_username: "admin".to_string(),
            admin_password: SecretString::from("pw".to_string()),
            admin_token_ttl_seconds: 120,
            session_cookie_secure: true,
            login_policy: LoginPolicy::Reject,
            frontend_base_url: Some("https://alumni.example.org".to_string()),
        }
    }

    #[test]
    fn app_config_from_args() {
        let config = args().app_config();
        assert!(config.session_cookie_secure());
        assert_eq!(config.login_policy(), LoginPolicy::Reject);
        assert_eq!(config.frontend_origin(), Some("https://alumni.example.org"));
    }

    #[test]
    fn admin_gate_from_args() {
        assert_eq!(args().admin_gate().ttl(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn memory_dsn_connects() -> Result<()> {
        let (credentials, _sessions) = connect(MEMORY_DSN).await?;
        credentials.ping().await?;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_dsn_is_rejected() {
        assert!(connect("not a dsn").await.is_err());
    }
}
