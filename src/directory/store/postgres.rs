//! `PostgreSQL` implementation of the credential and session stores.
//!
//! Tables are described in `sql/schema.sql`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{postgres::PgRow, Connection, PgPool, Row};
use tracing::{info_span, Instrument, Span};

use super::{CredentialStore, InsertOutcome, SessionStore};
use crate::directory::model::{IdentityRecord, SessionRecord};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn query_span(operation: &'static str, statement: &'static str) -> Span {
    info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

/// SQLSTATE 23505 is raised by the unique email indexes.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn identity_from_row(row: &PgRow) -> Result<IdentityRecord, sqlx::Error> {
    Ok(IdentityRecord {
        email: row.try_get("email")?,
        name: row.try_get("name")?,
        phone: row.try_get("phone")?,
        batch: row.try_get("batch")?,
        year_of_passout: row.try_get("year_of_passout")?,
        address: row.try_get("address")?,
        profession: row.try_get("profession")?,
        password_hash: row.try_get("password_hash")?,
        active: row.try_get("active")?,
    })
}

fn session_from_row(row: &PgRow) -> Result<SessionRecord, sqlx::Error> {
    Ok(SessionRecord {
        email: row.try_get("email")?,
        session_token: row.try_get("session_token")?,
        active: row.try_get("active")?,
    })
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find(&self, email: &str) -> Result<Option<IdentityRecord>> {
        let query = r"
            SELECT name, phone, batch, year_of_passout, email, address, profession,
                   password_hash, active
            FROM alumni_users
            WHERE email = $1
        ";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup alumni user")?;

        row.as_ref()
            .map(identity_from_row)
            .transpose()
            .context("failed to decode alumni user")
    }

    async fn insert(&self, record: &IdentityRecord) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO alumni_users
                (name, phone, batch, year_of_passout, email, address, profession,
                 password_hash, active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ";
        let result = sqlx::query(query)
            .bind(&record.name)
            .bind(&record.phone)
            .bind(&record.batch)
            .bind(&record.year_of_passout)
            .bind(&record.email)
            .bind(&record.address)
            .bind(&record.profession)
            .bind(&record.password_hash)
            .bind(record.active)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert alumni user"),
        }
    }

    async fn set_active(&self, email: &str, active: bool) -> Result<bool> {
        let query = "UPDATE alumni_users SET active = $2 WHERE email = $1";
        let result = sqlx::query(query)
            .bind(email)
            .bind(active)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update alumni user status")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, email: &str) -> Result<bool> {
        let query = "DELETE FROM alumni_users WHERE email = $1";
        let result = sqlx::query(query)
            .bind(email)
            .execute(&self.pool)
            .instrument(query_span("DELETE", query))
            .await
            .context("failed to delete alumni user")?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<IdentityRecord>> {
        let query = r"
            SELECT name, phone, batch, year_of_passout, email, address, profession,
                   password_hash, active
            FROM alumni_users
            ORDER BY id
        ";
        let rows = sqlx::query(query)
            .fetch_all(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to list alumni users")?;

        rows.iter()
            .map(identity_from_row)
            .collect::<Result<Vec<_>, _>>()
            .context("failed to decode alumni users")
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn find(&self, email: &str) -> Result<Option<SessionRecord>> {
        let query = "SELECT email, session_token, active FROM user_sessions WHERE email = $1";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup session")?;

        row.as_ref()
            .map(session_from_row)
            .transpose()
            .context("failed to decode session")
    }

    async fn find_active(&self, email: &str) -> Result<Option<SessionRecord>> {
        let query = r"
            SELECT email, session_token, active
            FROM user_sessions
            WHERE email = $1
              AND active = TRUE
        ";
        let row = sqlx::query(query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", query))
            .await
            .context("failed to lookup active session")?;

        row.as_ref()
            .map(session_from_row)
            .transpose()
            .context("failed to decode session")
    }

    async fn insert(&self, record: &SessionRecord) -> Result<InsertOutcome> {
        let query = r"
            INSERT INTO user_sessions (email, session_token, active)
            VALUES ($1, $2, $3)
        ";
        let result = sqlx::query(query)
            .bind(&record.email)
            .bind(record.session_token.as_deref())
            .bind(record.active)
            .execute(&self.pool)
            .instrument(query_span("INSERT", query))
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert session"),
        }
    }

    async fn update(
        &self,
        email: &str,
        active: bool,
        session_token: Option<&str>,
    ) -> Result<bool> {
        let query = r"
            UPDATE user_sessions
            SET active = $2,
                session_token = $3,
                updated_at = NOW()
            WHERE email = $1
        ";
        let result = sqlx::query(query)
            .bind(email)
            .bind(active)
            .bind(session_token)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update session")?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::is_unique_violation;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23503"),
        }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
