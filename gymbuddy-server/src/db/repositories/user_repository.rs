use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use gymbuddy_types::User;

use super::{datetime_column, uuid_column, FromSqliteRow};
use crate::db::DbPool;

const USER_COLUMNS: &str = "id, username, is_superuser, date_joined";

impl FromSqliteRow for User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(User {
            id: uuid_column(row, "id")?,
            username: row.get("username")?,
            is_superuser: row.get::<_, i32>("is_superuser")? == 1,
            date_joined: datetime_column(row, "date_joined")?,
        })
    }
}

pub struct UserRepository {
    pool: DbPool,
}

impl UserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub fn get_by_id(&self, user_id: &Uuid) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"),
                [user_id.to_string()],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Get user by username
    pub fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.pool.get()?;
        let user = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"),
                [username],
                User::from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Fetch a user together with the stored password hash
    pub fn get_credentials(&self, username: &str) -> Result<Option<(User, String)>> {
        let conn = self.pool.get()?;
        let found = conn
            .query_row(
                &format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE username = ?"),
                [username],
                |row| Ok((User::from_row(row)?, row.get("password_hash")?)),
            )
            .optional()?;
        Ok(found)
    }

    pub fn username_exists(&self, username: &str) -> Result<bool> {
        let conn = self.pool.get()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Create a new account from an already hashed password
    pub fn create(&self, username: &str, password_hash: &str, is_superuser: bool) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            is_superuser,
            date_joined: Utc::now(),
        };

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, is_superuser, date_joined)
             VALUES (?, ?, ?, ?, ?)",
            (
                user.id.to_string(),
                &user.username,
                password_hash,
                if is_superuser { 1 } else { 0 },
                user.date_joined.to_rfc3339(),
            ),
        )
        .context("Failed to create user")?;

        tracing::info!("Created user {} ({})", user.username, user.id);
        Ok(user)
    }

    pub fn set_password(&self, user_id: &Uuid, password_hash: &str) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET password_hash = ? WHERE id = ?",
            [password_hash, &user_id.to_string()],
        )
        .context("Failed to update password")?;
        Ok(())
    }

    pub fn set_superuser(&self, user_id: &Uuid, is_superuser: bool) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "UPDATE users SET is_superuser = ? WHERE id = ?",
            (if is_superuser { 1 } else { 0 }, user_id.to_string()),
        )
        .context("Failed to update superuser flag")?;
        Ok(())
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    fn setup() -> UserRepository {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        UserRepository::new(db.pool)
    }

    #[test]
    fn test_create_and_lookup() {
        let repo = setup();
        let user = repo.create("alice", "hash", false).expect("create");

        let by_id = repo.get_by_id(&user.id).expect("query").expect("found");
        assert_eq!(by_id.username, "alice");
        assert!(!by_id.is_superuser);

        let by_name = repo.get_by_username("alice").expect("query").expect("found");
        assert_eq!(by_name.id, user.id);

        assert!(repo.get_by_username("bob").expect("query").is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let repo = setup();
        repo.create("alice", "hash", false).expect("create");
        assert!(repo.username_exists("alice").expect("exists"));
        assert!(repo.create("alice", "other", false).is_err());
    }

    #[test]
    fn test_credentials_and_superuser_flag() {
        let repo = setup();
        let user = repo.create("admin", "old-hash", false).expect("create");

        repo.set_password(&user.id, "new-hash").expect("set password");
        repo.set_superuser(&user.id, true).expect("promote");

        let (found, hash) = repo
            .get_credentials("admin")
            .expect("query")
            .expect("found");
        assert_eq!(hash, "new-hash");
        assert!(found.is_superuser);
        assert_eq!(repo.count().expect("count"), 1);
    }
}
