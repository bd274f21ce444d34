//! Login sessions stored in the `sessions` table.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::Database;

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 30;

/// Fixed-width UTC timestamps so expiry checks can compare text in SQL
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Clone)]
pub struct SessionManager {
    db: Database,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(db: Database) -> Self {
        Self::with_ttl_days(db, DEFAULT_SESSION_TTL_DAYS)
    }

    /// Lifetimes below one day are raised to one day
    pub fn with_ttl_days(db: Database, days: i64) -> Self {
        Self {
            db,
            ttl: Duration::days(days.max(1)),
        }
    }

    /// Open a session and return its token
    pub fn create_session(&self, user_id: Uuid) -> Result<String> {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();

        let conn = self.db.connection()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
            (&token, user_id.to_string(), timestamp(now), timestamp(now + self.ttl)),
        )
        .context("Failed to create session")?;

        tracing::debug!("Opened session for user {}", user_id);
        Ok(token)
    }

    /// Resolve a token to its user. Unknown and expired tokens are errors;
    /// an expired one is deleted on the way out.
    pub fn validate_session(&self, token: &str) -> Result<Uuid> {
        let conn = self.db.connection()?;
        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let Some((user_id, expires_at)) = row else {
            anyhow::bail!("Session not found");
        };

        let expires_at = expires_at
            .parse::<DateTime<Utc>>()
            .context("Invalid session expiry")?;
        if Utc::now() >= expires_at {
            conn.execute("DELETE FROM sessions WHERE token = ?", [token])?;
            anyhow::bail!("Session has expired");
        }

        Uuid::parse_str(&user_id).context("Invalid session user id")
    }

    pub fn delete_session(&self, token: &str) -> Result<()> {
        let conn = self.db.connection()?;
        conn.execute("DELETE FROM sessions WHERE token = ?", [token])
            .context("Failed to delete session")?;
        Ok(())
    }

    /// Sign a user out everywhere, e.g. after a password reset
    pub fn delete_user_sessions(&self, user_id: &Uuid) -> Result<usize> {
        let conn = self.db.connection()?;
        let deleted = conn
            .execute("DELETE FROM sessions WHERE user_id = ?", [user_id.to_string()])
            .context("Failed to delete user sessions")?;
        Ok(deleted)
    }

    pub fn cleanup_expired_sessions(&self) -> Result<usize> {
        let conn = self.db.connection()?;
        let deleted = conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?",
                [timestamp(Utc::now())],
            )
            .context("Failed to clean up expired sessions")?;

        if deleted > 0 {
            tracing::info!("Removed {} expired sessions", deleted);
        }
        Ok(deleted)
    }
}
