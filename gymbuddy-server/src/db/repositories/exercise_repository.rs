use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params_from_iter, OptionalExtension, Row};
use uuid::Uuid;

use gymbuddy_types::{Exercise, ExerciseSummary};

use super::FromSqliteRow;
use crate::db::DbPool;
use crate::equipment::CategoryFilter;

const EXERCISE_COLUMNS: &str = "id, exercise_name, main_muscle, target_muscle, synergist_muscle, \
                                equipment, instructions, image";

impl FromSqliteRow for Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Exercise {
            id: row.get("id")?,
            exercise_name: row.get("exercise_name")?,
            main_muscle: row.get("main_muscle")?,
            target_muscle: row.get("target_muscle")?,
            synergist_muscle: row.get("synergist_muscle")?,
            equipment: row.get("equipment")?,
            instructions: row.get("instructions")?,
            image: row.get("image")?,
        })
    }
}

/// Fields written by the catalog import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewExercise {
    pub exercise_name: String,
    pub main_muscle: String,
    pub target_muscle: Option<String>,
    pub synergist_muscle: Option<String>,
    pub equipment: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Skipped,
}

pub struct ExerciseRepository {
    pool: DbPool,
}

impl ExerciseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Exercise>> {
        let conn = self.pool.get()?;
        let exercise = conn
            .query_row(
                &format!("SELECT {EXERCISE_COLUMNS} FROM exercises WHERE id = ?"),
                [id],
                Exercise::from_row,
            )
            .optional()?;
        Ok(exercise)
    }

    /// List exercises, optionally filtered by main muscle and equipment label
    pub fn list(&self, muscle: Option<&str>, equipment: Option<&CategoryFilter>) -> Result<Vec<Exercise>> {
        let mut clauses = Vec::new();
        let mut params: Vec<String> = Vec::new();

        if let Some(muscle) = muscle {
            clauses.push("main_muscle = ? COLLATE NOCASE".to_string());
            params.push(muscle.to_string());
        }
        if let Some(filter) = equipment {
            let sql = filter.sql("equipment");
            clauses.push(sql.clause);
            params.extend(sql.params);
        }

        let where_clause = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {EXERCISE_COLUMNS} FROM exercises {where_clause}
             ORDER BY main_muscle, exercise_name"
        ))?;

        let exercises = stmt
            .query_map(params_from_iter(params.iter()), Exercise::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        // SQL LIKE only narrows; the normalized category decides.
        let exercises = match equipment {
            Some(filter) => exercises
                .into_iter()
                .filter(|e| e.equipment.as_deref().is_some_and(|raw| filter.matches(raw)))
                .collect(),
            None => exercises,
        };

        Ok(exercises)
    }

    /// Case-insensitive name search for the planner picker
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<ExerciseSummary>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT id, exercise_name FROM exercises
             WHERE exercise_name LIKE ? ESCAPE '\\'
             ORDER BY exercise_name
             LIMIT ?",
        )?;

        let pattern = format!(
            "%{}%",
            query
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_")
        );
        let results = stmt
            .query_map((pattern, limit as i64), |row| {
                Ok(ExerciseSummary {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Distinct main muscles in alphabetical order
    pub fn muscles(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT main_muscle FROM exercises
             WHERE main_muscle <> ''
             ORDER BY main_muscle",
        )?;
        let muscles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(muscles)
    }

    /// Distinct raw equipment strings, before normalization
    pub fn raw_equipment(&self) -> Result<Vec<String>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT equipment FROM exercises
             WHERE equipment IS NOT NULL
             ORDER BY equipment",
        )?;
        let equipment = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(equipment)
    }

    /// Insert an exercise unless one with the same name already exists
    pub fn upsert(&self, exercise: &NewExercise) -> Result<UpsertOutcome> {
        let conn = self.pool.get()?;
        let now = Utc::now().to_rfc3339();
        let inserted = conn
            .execute(
                "INSERT INTO exercises
                    (exercise_name, main_muscle, target_muscle, synergist_muscle, equipment,
                     instructions, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                 ON CONFLICT(exercise_name) DO NOTHING",
                (
                    &exercise.exercise_name,
                    &exercise.main_muscle,
                    &exercise.target_muscle,
                    &exercise.synergist_muscle,
                    &exercise.equipment,
                    &exercise.instructions,
                    &now,
                    &now,
                ),
            )
            .with_context(|| format!("Failed to import exercise '{}'", exercise.exercise_name))?;

        Ok(if inserted > 0 {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Skipped
        })
    }

    pub fn count(&self) -> Result<i64> {
        let conn = self.pool.get()?;
        let count = conn.query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))?;
        Ok(count)
    }

    // Favorites

    pub fn favorite_ids(&self, user_id: &Uuid) -> Result<Vec<i64>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT exercise_id FROM favorite_exercises WHERE user_id = ? ORDER BY exercise_id",
        )?;
        let ids = stmt
            .query_map([user_id.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    pub fn favorites(&self, user_id: &Uuid) -> Result<Vec<ExerciseSummary>> {
        let conn = self.pool.get()?;
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

    /// Flip the favorite flag and return the new state
    pub fn toggle_favorite(&self, user_id: &Uuid, exercise_id: i64) -> Result<bool> {
        let conn = self.pool.get()?;
        let removed = conn
            .execute(
                "DELETE FROM favorite_exercises WHERE user_id = ? AND exercise_id = ?",
                (user_id.to_string(), exercise_id),
            )
            .context("Failed to remove favorite")?;

        if removed > 0 {
            return Ok(false);
        }

        conn.execute(
            "INSERT INTO favorite_exercises (user_id, exercise_id) VALUES (?, ?)",
            (user_id.to_string(), exercise_id),
        )
        .context("Failed to add favorite")?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::UserRepository;
    use crate::db::Database;

    fn setup() -> (Database, ExerciseRepository) {
        let db = Database::in_memory().expect("Failed to create test database");
        db.initialize().expect("Failed to initialize database");
        db.seed_sample_data().expect("Failed to seed");
        let repo = ExerciseRepository::new(db.pool.clone());
        (db, repo)
    }

    #[test]
    fn test_list_orders_by_muscle_then_name() {
        let (_db, repo) = setup();
        let all = repo.list(None, None).expect("list");
        assert_eq!(all.len() as i64, repo.count().expect("count"));

        let keys: Vec<(String, String)> = all
            .iter()
            .map(|e| (e.main_muscle.clone(), e.exercise_name.clone()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_list_filters_by_muscle() {
        let (_db, repo) = setup();
        let chest = repo.list(Some("chest"), None).expect("list");
        assert!(!chest.is_empty());
        assert!(chest.iter().all(|e| e.main_muscle == "Chest"));
    }

    #[test]
    fn test_list_filters_by_equipment_category() {
        let (_db, repo) = setup();

        let assisted = CategoryFilter::parse("Assisted").expect("filter");
        let names: Vec<String> = repo
            .list(None, Some(&assisted))
            .expect("list")
            .into_iter()
            .map(|e| e.exercise_name)
            .collect();
        assert_eq!(names, vec!["Assisted Pull Up"]);

        let self_assisted = CategoryFilter::parse("Self-Assisted").expect("filter");
        let names: Vec<String> = repo
            .list(None, Some(&self_assisted))
            .expect("list")
            .into_iter()
            .map(|e| e.exercise_name)
            .collect();
        assert_eq!(names, vec!["Self-Assisted Inverted Row"]);

        let lever = CategoryFilter::parse("lever").expect("filter");
        let names: Vec<String> = repo
            .list(None, Some(&lever))
            .expect("list")
            .into_iter()
            .map(|e| e.exercise_name)
            .collect();
        assert_eq!(names, vec!["Lever Leg Extension"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_limited() {
        let (_db, repo) = setup();
        let results = repo.search("PUSH", 10).expect("search");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Push Up");

        let limited = repo.search("e", 2).expect("search");
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_upsert_skips_existing_names() {
        let (_db, repo) = setup();
        let before = repo.count().expect("count");

        let existing = NewExercise {
            exercise_name: "Push Up".to_string(),
            main_muscle: "Chest".to_string(),
            ..Default::default()
        };
        assert_eq!(repo.upsert(&existing).expect("upsert"), UpsertOutcome::Skipped);

        let fresh = NewExercise {
            exercise_name: "Goblet Squat".to_string(),
            main_muscle: "Thighs".to_string(),
            equipment: Some("Kettlebell".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.upsert(&fresh).expect("upsert"), UpsertOutcome::Inserted);
        assert_eq!(repo.count().expect("count"), before + 1);
    }

    #[test]
    fn test_toggle_favorite() {
        let (db, repo) = setup();
        let user = UserRepository::new(db.pool.clone())
            .create("alice", "hash", false)
            .expect("user");
        let exercise = repo.search("Push", 1).expect("search").remove(0);

        assert!(repo.toggle_favorite(&user.id, exercise.id).expect("toggle on"));
        assert_eq!(repo.favorite_ids(&user.id).expect("ids"), vec![exercise.id]);
        assert_eq!(repo.favorites(&user.id).expect("favorites"), vec![exercise.clone()]);

        assert!(!repo.toggle_favorite(&user.id, exercise.id).expect("toggle off"));
        assert!(repo.favorite_ids(&user.id).expect("ids").is_empty());
    }
}
