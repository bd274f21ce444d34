use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{OptionalExtension, Row};
use std::collections::HashMap;
use uuid::Uuid;

use gymbuddy_types::{LikeResponse, Reply, ReplyNode};

use super::thread_repository::toggle_like;
use super::{datetime_column, uuid_column, FromSqliteRow};
use crate::db::DbPool;

const REPLY_COLUMNS: &str = "r.id, r.thread_id, r.author_id, u.username AS author_username,
        r.parent_id, r.content, r.created_at, r.updated_at,
        (SELECT COUNT(*) FROM reply_likes l WHERE l.reply_id = r.id) AS like_count";

impl FromSqliteRow for Reply {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Reply {
            id: row.get("id")?,
            thread_id: row.get("thread_id")?,
            author_id: uuid_column(row, "author_id")?,
            author_username: row.get("author_username")?,
            parent_id: row.get("parent_id")?,
            content: row.get("content")?,
            created_at: datetime_column(row, "created_at")?,
            updated_at: datetime_column(row, "updated_at")?,
            like_count: row.get("like_count")?,
        })
    }
}

/// Assemble a flat, creation-ordered reply list into nested nodes.
///
/// Replies without a parent, or whose parent is not in the list, become
/// roots. Sibling order follows the input order.
pub fn build_reply_tree(replies: Vec<Reply>) -> Vec<ReplyNode> {
    let known: std::collections::HashSet<i64> = replies.iter().map(|r| r.id).collect();
    let mut roots = Vec::new();
    let mut children: HashMap<i64, Vec<Reply>> = HashMap::new();

    for reply in replies {
        match reply.parent_id {
            Some(parent) if known.contains(&parent) => {
                children.entry(parent).or_default().push(reply)
            }
            _ => roots.push(reply),
        }
    }

    fn attach(reply: Reply, children: &mut HashMap<i64, Vec<Reply>>) -> ReplyNode {
        let kids = children.remove(&reply.id).unwrap_or_default();
        ReplyNode {
            reply,
            children: kids.into_iter().map(|kid| attach(kid, children)).collect(),
        }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

pub struct ReplyRepository {
    pool: DbPool,
}

impl ReplyRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn create(
        &self,
        thread_id: i64,
        author_id: &Uuid,
        parent_id: Option<i64>,
        content: &str,
    ) -> Result<Reply> {
        let id = {
            let conn = self.pool.get()?;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO replies (thread_id, author_id, parent_id, content, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (thread_id, author_id.to_string(), parent_id, content, &now, &now),
            )
            .context("Failed to create reply")?;
            conn.last_insert_rowid()
        };

        self.get(id)?.context("Reply missing after insert")
    }

    pub fn get(&self, id: i64) -> Result<Option<Reply>> {
        let conn = self.pool.get()?;
        let reply = conn
            .query_row(
                &format!(
                    "SELECT {REPLY_COLUMNS} FROM replies r
                     JOIN users u ON u.id = r.author_id
                     WHERE r.id = ?"
                ),
                [id],
                Reply::from_row,
            )
            .optional()?;
        Ok(reply)
    }

    /// Replies posted to a thread, nested through `parent_id`
    ///
    /// A reply always lists under the thread it was posted to. One whose
    /// parent lives in another thread is a root here, so the listing
    /// matches the thread's `reply_count`.
    pub fn list_tree(&self, thread_id: i64) -> Result<Vec<ReplyNode>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "WITH RECURSIVE reply_tree(id) AS (
                SELECT id FROM replies
                WHERE thread_id = ?1
                  AND (parent_id IS NULL
                       OR parent_id NOT IN (SELECT id FROM replies WHERE thread_id = ?1))
                UNION ALL
                SELECT child.id FROM replies child
                JOIN reply_tree parent ON child.parent_id = parent.id
                WHERE child.thread_id = ?1
             )
             SELECT {REPLY_COLUMNS}
             FROM replies r
             JOIN reply_tree t ON t.id = r.id
             JOIN users u ON u.id = r.author_id
             ORDER BY r.created_at ASC, r.id ASC"
        ))?;

        let replies = stmt
            .query_map([thread_id], Reply::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(build_reply_tree(replies))
    }

    pub fn update(&self, id: i64, content: &str) -> Result<Option<Reply>> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE replies SET content = ?, updated_at = ? WHERE id = ?",
                (content, Utc::now().to_rfc3339(), id),
            )
            .context("Failed to update reply")?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.get(id)
    }

    /// Delete a reply; nested replies go with it
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn
            .execute("DELETE FROM replies WHERE id = ?", [id])
            .context("Failed to delete reply")?;
        Ok(deleted > 0)
    }

    pub fn toggle_like(&self, id: i64, user_id: &Uuid) -> Result<LikeResponse> {
        let conn = self.pool.get()?;
        toggle_like(&conn, "reply_likes", "reply_id", id, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ThreadRepository, UserRepository};
    use crate::db::Database;

    struct Fixture {
        replies: ReplyRepository,
        threads: ThreadRepository,
        alice: Uuid,
        bob: Uuid,
        thread_id: i64,
    }

    fn setup() -> Fixture {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        let users = UserRepository::new(db.pool.clone());
        let alice = users.create("alice", "hash", false).expect("alice").id;
        let bob = users.create("bob", "hash", false).expect("bob").id;
        let threads = ThreadRepository::new(db.pool.clone());
        let thread_id = threads.create(&alice, "Squat depth", "ATG?").expect("thread").id;

        Fixture {
            replies: ReplyRepository::new(db.pool),
            threads,
            alice,
            bob,
            thread_id,
        }
    }

    fn reply(id: i64, parent_id: Option<i64>) -> Reply {
        let now = Utc::now();
        Reply {
            id,
            thread_id: 1,
            author_id: Uuid::nil(),
            author_username: "alice".to_string(),
            parent_id,
            content: format!("reply {id}"),
            created_at: now,
            updated_at: now,
            like_count: 0,
        }
    }

    #[test]
    fn test_build_tree_nests_children_in_order() {
        let tree = build_reply_tree(vec![
            reply(1, None),
            reply(2, Some(1)),
            reply(3, None),
            reply(4, Some(2)),
            reply(5, Some(1)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].reply.id, 1);
        let child_ids: Vec<i64> = tree[0].children.iter().map(|n| n.reply.id).collect();
        assert_eq!(child_ids, vec![2, 5]);
        assert_eq!(tree[0].children[0].children[0].reply.id, 4);
        assert_eq!(tree[1].reply.id, 3);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_build_tree_orphan_becomes_root() {
        let tree = build_reply_tree(vec![reply(7, Some(99))]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].reply.id, 7);
    }

    #[test]
    fn test_top_level_and_nested_replies() {
        let f = setup();
        let top = f
            .replies
            .create(f.thread_id, &f.alice, None, "Parallel is enough")
            .expect("top");
        let child = f
            .replies
            .create(f.thread_id, &f.bob, Some(top.id), "Depends on mobility")
            .expect("child");
        let grandchild = f
            .replies
            .create(f.thread_id, &f.alice, Some(child.id), "Agreed")
            .expect("grandchild");

        assert_eq!(top.parent_id, None);
        assert_eq!(child.author_username, "bob");

        let tree = f.replies.list_tree(f.thread_id).expect("tree");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].reply.id, top.id);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].reply.id, child.id);
        assert_eq!(tree[0].children[0].children[0].reply.id, grandchild.id);

        let thread = f.threads.get(f.thread_id).expect("get").expect("found");
        assert_eq!(thread.reply_count, 3);
    }

    #[test]
    fn test_parent_from_other_thread_lists_in_own_thread() {
        let f = setup();
        let other = f
            .threads
            .create(&f.bob, "Bench arch", "How much?")
            .expect("other thread")
            .id;
        let parent = f
            .replies
            .create(f.thread_id, &f.alice, None, "in first thread")
            .expect("parent");
        let stray = f
            .replies
            .create(other, &f.bob, Some(parent.id), "posted to second thread")
            .expect("stray");
        let nested = f
            .replies
            .create(other, &f.alice, Some(stray.id), "under the stray reply")
            .expect("nested");

        let first = f.replies.list_tree(f.thread_id).expect("first tree");
        assert_eq!(first.len(), 1);
        assert!(first[0].children.is_empty());

        let second = f.replies.list_tree(other).expect("second tree");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].reply.id, stray.id);
        assert_eq!(second[0].children[0].reply.id, nested.id);

        let thread = f.threads.get(other).expect("get").expect("found");
        assert_eq!(thread.reply_count, 2);
    }

    #[test]
    fn test_delete_cascades_to_children() {
        let f = setup();
        let top = f
            .replies
            .create(f.thread_id, &f.alice, None, "top")
            .expect("top");
        let child = f
            .replies
            .create(f.thread_id, &f.bob, Some(top.id), "child")
            .expect("child");

        assert!(f.replies.delete(top.id).expect("delete"));
        assert!(f.replies.get(child.id).expect("get").is_none());
        assert!(f.replies.list_tree(f.thread_id).expect("tree").is_empty());
    }

    #[test]
    fn test_update_and_like() {
        let f = setup();
        let top = f
            .replies
            .create(f.thread_id, &f.alice, None, "first")
            .expect("top");

        let edited = f.replies.update(top.id, "edited").expect("update").expect("found");
        assert_eq!(edited.content, "edited");

        let like = f.replies.toggle_like(top.id, &f.bob).expect("like");
        assert!(like.liked);
        assert_eq!(like.like_count, 1);
        assert_eq!(f.replies.get(top.id).expect("get").expect("found").like_count, 1);
    }
}
