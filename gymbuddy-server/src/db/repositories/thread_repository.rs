use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use gymbuddy_types::{LikeResponse, Thread};

use super::{datetime_column, uuid_column, FromSqliteRow};
use crate::db::DbPool;

const THREAD_SELECT: &str = "SELECT t.id, t.title, t.content, t.author_id, u.username AS author_username,
        t.created_at, t.updated_at,
        (SELECT COUNT(*) FROM replies r WHERE r.thread_id = t.id) AS reply_count,
        (SELECT COUNT(*) FROM thread_likes l WHERE l.thread_id = t.id) AS like_count
     FROM threads t
     JOIN users u ON u.id = t.author_id";

impl FromSqliteRow for Thread {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Thread {
            id: row.get("id")?,
            title: row.get("title")?,
            content: row.get("content")?,
            author_id: uuid_column(row, "author_id")?,
            author_username: row.get("author_username")?,
            created_at: datetime_column(row, "created_at")?,
            updated_at: datetime_column(row, "updated_at")?,
            reply_count: row.get("reply_count")?,
            like_count: row.get("like_count")?,
        })
    }
}

/// Shared toggle for the thread and reply like tables
pub(super) fn toggle_like(
    conn: &Connection,
    table: &str,
    key_column: &str,
    key: i64,
    user_id: &Uuid,
) -> Result<LikeResponse> {
    let removed = conn
        .execute(
            &format!("DELETE FROM {table} WHERE {key_column} = ? AND user_id = ?"),
            (key, user_id.to_string()),
        )
        .context("Failed to remove like")?;

    if removed == 0 {
        conn.execute(
            &format!("INSERT INTO {table} ({key_column}, user_id) VALUES (?, ?)"),
            (key, user_id.to_string()),
        )
        .context("Failed to add like")?;
    }

    let like_count: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {table} WHERE {key_column} = ?"),
        [key],
        |row| row.get(0),
    )?;

    Ok(LikeResponse {
        liked: removed == 0,
        like_count,
    })
}

pub struct ThreadRepository {
    pool: DbPool,
}

impl ThreadRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(&self, author_id: &Uuid, title: &str, content: &str) -> Result<Thread> {
        let id = {
            let conn = self.pool.get()?;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO threads (title, content, author_id, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?)",
                (title, content, author_id.to_string(), &now, &now),
            )
            .context("Failed to create thread")?;
            conn.last_insert_rowid()
        };

        self.get(id)?.context("Thread missing after insert")
    }

    pub fn get(&self, id: i64) -> Result<Option<Thread>> {
        let conn = self.pool.get()?;
        let thread = conn
            .query_row(
                &format!("{THREAD_SELECT} WHERE t.id = ?"),
                [id],
                Thread::from_row,
            )
            .optional()?;
        Ok(thread)
    }

    /// All threads, newest first
    pub fn list(&self) -> Result<Vec<Thread>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{THREAD_SELECT} ORDER BY t.created_at DESC, t.id DESC"))?;
        let threads = stmt
            .query_map([], Thread::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(threads)
    }

    pub fn update(&self, id: i64, title: &str, content: &str) -> Result<Option<Thread>> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE threads SET title = ?, content = ?, updated_at = ? WHERE id = ?",
                (title, content, Utc::now().to_rfc3339(), id),
            )
            .context("Failed to update thread")?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    /// Delete a thread along with its replies and likes
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn
            .execute("DELETE FROM threads WHERE id = ?", [id])
            .context("Failed to delete thread")?;
        Ok(deleted > 0)
    }

    pub fn toggle_like(&self, id: i64, user_id: &Uuid) -> Result<LikeResponse> {
        let conn = self.pool.get()?;
        toggle_like(&conn, "thread_likes", "thread_id", id, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;

    fn setup() -> (Database, ThreadRepository, Uuid, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let users = UserRepository::new(db.pool.clone());
        let alice = users.create("alice", "hash", false).expect("alice").id;
        let bob = users.create("bob", "hash", false).expect("bob").id;
        let repo = ThreadRepository::new(db.pool.clone());
        (db, repo, alice, bob)
    }

    #[test]
    fn test_create_and_list_newest_first() {
        let (_db, repo, alice, _) = setup();
        let first = repo.create(&alice, "Deload week?", "How often?").expect("create");
        let second = repo.create(&alice, "Best grip", "Hook or mixed?").expect("create");

        assert_eq!(first.author_username, "alice");
        assert_eq!(first.reply_count, 0);

        let ids: Vec<i64> = repo.list().expect("list").into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update_and_delete() {
        let (_db, repo, alice, _) = setup();
        let thread = repo.create(&alice, "Old", "Body").expect("create");

        let updated = repo.update(thread.id, "New", "Body 2").expect("update").expect("found");
        assert_eq!(updated.title, "New");
        assert_eq!(updated.content, "Body 2");
        assert!(updated.updated_at >= thread.updated_at);

        assert!(repo.delete(thread.id).expect("delete"));
        assert!(repo.get(thread.id).expect("get").is_none());
        assert!(repo.update(thread.id, "x", "y").expect("update").is_none());
    }

    #[test]
    fn test_toggle_like_counts_per_user() {
        let (_db, repo, alice, bob) = setup();
        let thread = repo.create(&alice, "Title", "Body").expect("create");

        let liked = repo.toggle_like(thread.id, &alice).expect("like");
        assert!(liked.liked);
        assert_eq!(liked.like_count, 1);

        let liked = repo.toggle_like(thread.id, &bob).expect("like");
        assert_eq!(liked.like_count, 2);

        let unliked = repo.toggle_like(thread.id, &alice).expect("unlike");
        assert!(!unliked.liked);
        assert_eq!(unliked.like_count, 1);

        assert_eq!(repo.get(thread.id).expect("get").expect("found").like_count, 1);
    }
}
