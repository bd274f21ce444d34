use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use gymbuddy_types::{ExerciseSummary, Profile, ProfileFields, Sport};

use super::{datetime_column, uuid_column, FromSqliteRow};
use crate::db::DbPool;

const PROFILE_SELECT: &str = "SELECT p.user_id, u.username, p.display_name, p.bio, p.profile_picture,
        p.favorite_sports, p.created_at, p.updated_at
     FROM profiles p
     JOIN users u ON u.id = p.user_id";

fn encode_sports(sports: &[Sport]) -> String {
    sports.iter().map(Sport::slug).collect::<Vec<_>>().join(",")
}

fn sports_column(row: &Row, column: &str) -> rusqlite::Result<Vec<Sport>> {
    let raw: String = row.get(column)?;
    raw.split(',')
        .filter(|slug| !slug.is_empty())
        .map(|slug| {
            Sport::parse(slug).ok_or_else(|| {
                let idx = row.as_ref().column_index(column).unwrap_or_default();
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    Type::Text,
                    format!("unknown sport '{slug}'").into(),
                )
            })
        })
        .collect()
}

impl FromSqliteRow for Profile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Profile {
            user_id: uuid_column(row, "user_id")?,
            username: row.get("username")?,
            display_name: row.get("display_name")?,
            bio: row.get("bio")?,
            profile_picture: row.get("profile_picture")?,
            favorite_sports: sports_column(row, "favorite_sports")?,
            favorite_exercises: Vec::new(),
            created_at: datetime_column(row, "created_at")?,
            updated_at: datetime_column(row, "updated_at")?,
        })
    }
}

fn load_favorites(conn: &Connection, user_id: &Uuid) -> rusqlite::Result<Vec<ExerciseSummary>> {
    let mut stmt = conn.prepare(
        "SELECT e.id, e.exercise_name
         FROM favorite_exercises f
         JOIN exercises e ON e.id = f.exercise_id
         WHERE f.user_id = ?
         ORDER BY e.exercise_name",
    )?;
    let favorites = stmt
        .query_map([user_id.to_string()], |row| {
            Ok(ExerciseSummary {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(favorites)
}

pub struct ProfileRepository {
    pool: DbPool,
}

impl ProfileRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get a profile with its favorite exercises
    pub fn get(&self, user_id: &Uuid) -> Result<Option<Profile>> {
        let conn = self.pool.get()?;
        let profile = conn
            .query_row(
                &format!("{PROFILE_SELECT} WHERE p.user_id = ?"),
                [user_id.to_string()],
                Profile::from_row,
            )
            .optional()?;

        match profile {
            Some(mut profile) => {
                profile.favorite_exercises = load_favorites(&conn, user_id)?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    pub fn list_all(&self) -> Result<Vec<Profile>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("{PROFILE_SELECT} ORDER BY p.display_name"))?;
        let mut profiles = stmt
            .query_map([], Profile::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);

        for profile in &mut profiles {
            profile.favorite_exercises = load_favorites(&conn, &profile.user_id)?;
        }
        Ok(profiles)
    }

    /// Check whether another user already holds this display name
    pub fn display_name_taken(&self, display_name: &str, except: Option<&Uuid>) -> Result<bool> {
        let conn = self.pool.get()?;
        let except = except.map(|id| id.to_string()).unwrap_or_default();
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE display_name = ? AND user_id <> ?)",
            (display_name, except),
            |row| row.get(0),
        )?;
        Ok(taken)
    }

    pub fn create(&self, user_id: &Uuid, fields: &ProfileFields) -> Result<Profile> {
        {
            let conn = self.pool.get()?;
            let now = Utc::now().to_rfc3339();
            conn.execute(
                "INSERT INTO profiles
                    (user_id, display_name, bio, profile_picture, favorite_sports, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                (
                    user_id.to_string(),
                    &fields.display_name,
                    &fields.bio,
                    &fields.profile_picture,
                    encode_sports(&fields.favorite_sports),
                    &now,
                    &now,
                ),
            )
            .context("Failed to create profile")?;
        }

        self.get(user_id)?.context("Profile missing after insert")
    }

    pub fn update(&self, user_id: &Uuid, fields: &ProfileFields) -> Result<Option<Profile>> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE profiles
                 SET display_name = ?, bio = ?, profile_picture = ?, favorite_sports = ?, updated_at = ?
                 WHERE user_id = ?",
                (
                    &fields.display_name,
                    &fields.bio,
                    &fields.profile_picture,
                    encode_sports(&fields.favorite_sports),
                    Utc::now().to_rfc3339(),
                    user_id.to_string(),
                ),
            )
            .context("Failed to update profile")?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.get(user_id)
    }

    pub fn delete(&self, user_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn
            .execute("DELETE FROM profiles WHERE user_id = ?", [user_id.to_string()])
            .context("Failed to delete profile")?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::{ExerciseRepository, UserRepository};
    use crate::db::Database;

    fn fields(name: &str) -> ProfileFields {
        ProfileFields {
            display_name: name.to_string(),
            bio: "Lifting since 2019".to_string(),
            profile_picture: None,
            favorite_sports: vec![Sport::Gym, Sport::Hiking],
        }
    }

    fn setup() -> (Database, ProfileRepository, Uuid, Uuid) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        db.seed_sample_data().expect("Failed to seed");
        let users = UserRepository::new(db.pool.clone());
        let alice = users.create("alice", "hash", false).expect("alice").id;
        let bob = users.create("bob", "hash", false).expect("bob").id;
        let repo = ProfileRepository::new(db.pool.clone());
        (db, repo, alice, bob)
    }

    #[test]
    fn test_create_and_get_with_favorites() {
        let (db, repo, alice, _) = setup();
        let exercises = ExerciseRepository::new(db.pool.clone());
        let push_up = exercises.search("Push Up", 1).expect("search").remove(0);
        exercises.toggle_favorite(&alice, push_up.id).expect("favorite");

        let created = repo.create(&alice, &fields("Alice")).expect("create");
        assert_eq!(created.username, "alice");
        assert_eq!(created.display_name, "Alice");
        assert_eq!(created.favorite_exercises, vec![push_up]);
        assert_eq!(created.favorite_sports, vec![Sport::Gym, Sport::Hiking]);

        assert!(repo.get(&Uuid::new_v4()).expect("get").is_none());
    }

    #[test]
    fn test_display_name_uniqueness() {
        let (_db, repo, alice, bob) = setup();
        repo.create(&alice, &fields("Lifter")).expect("create");

        assert!(repo.display_name_taken("Lifter", None).expect("check"));
        assert!(repo.display_name_taken("Lifter", Some(&bob)).expect("check"));
        assert!(!repo.display_name_taken("Lifter", Some(&alice)).expect("check"));
        assert!(repo.create(&bob, &fields("Lifter")).is_err());
    }

    #[test]
    fn test_update_list_and_delete() {
        let (_db, repo, alice, bob) = setup();
        repo.create(&alice, &fields("Alice")).expect("create");
        repo.create(&bob, &fields("Bob")).expect("create");

        let mut changed = fields("Alice B");
        changed.profile_picture = Some("https://example.com/a.png".to_string());
        changed.favorite_sports = vec![Sport::IceSkating];
        let updated = repo.update(&alice, &changed).expect("update").expect("found");
        assert_eq!(updated.display_name, "Alice B");
        assert_eq!(ProfileFields::from(&updated), changed);

        let names: Vec<String> = repo
            .list_all()
            .expect("list")
            .into_iter()
            .map(|p| p.display_name)
            .collect();
        assert_eq!(names, vec!["Alice B", "Bob"]);

        assert!(repo.delete(&bob).expect("delete"));
        assert!(!repo.delete(&bob).expect("delete again"));
        assert!(repo.update(&bob, &fields("Ghost")).expect("update").is_none());
    }
}
