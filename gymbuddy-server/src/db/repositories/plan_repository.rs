use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{OptionalExtension, Row};
use uuid::Uuid;

use gymbuddy_types::{NewPlan, WorkoutPlan};

use super::{
    date_column, datetime_column, format_date, optional_datetime_column, uuid_column,
    FromSqliteRow,
};
use crate::db::DbPool;

const PLAN_SELECT: &str = "SELECT p.id, p.user_id, p.exercise_id, e.exercise_name, p.sets, p.reps,
        p.plan_date, p.is_completed, p.completed_at, p.description, p.date_created
     FROM workout_plans p
     JOIN exercises e ON e.id = p.exercise_id";

impl FromSqliteRow for WorkoutPlan {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(WorkoutPlan {
            id: row.get("id")?,
            user_id: uuid_column(row, "user_id")?,
            exercise_id: row.get("exercise_id")?,
            exercise_name: row.get("exercise_name")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            plan_date: date_column(row, "plan_date")?,
            is_completed: row.get::<_, i32>("is_completed")? == 1,
            completed_at: optional_datetime_column(row, "completed_at")?,
            description: row.get("description")?,
            date_created: datetime_column(row, "date_created")?,
        })
    }
}

pub struct PlanRepository {
    pool: DbPool,
}

impl PlanRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Schedule an exercise for a user
    pub fn create(&self, user_id: &Uuid, plan: &NewPlan) -> Result<WorkoutPlan> {
        let id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO workout_plans (user_id, exercise_id, sets, reps, plan_date, date_created)
                 VALUES (?, ?, ?, ?, ?, ?)",
                (
                    user_id.to_string(),
                    plan.exercise_id,
                    plan.sets,
                    plan.reps,
                    format_date(plan.plan_date),
                    Utc::now().to_rfc3339(),
                ),
            )
            .context("Failed to create workout plan")?;
            conn.last_insert_rowid()
        };

        self.get_for_user(id, user_id)?
            .context("Workout plan missing after insert")
    }

    /// Fetch a plan only if it belongs to the given user
    pub fn get_for_user(&self, plan_id: i64, user_id: &Uuid) -> Result<Option<WorkoutPlan>> {
        let conn = self.pool.get()?;
        let plan = conn
            .query_row(
                &format!("{PLAN_SELECT} WHERE p.id = ? AND p.user_id = ?"),
                (plan_id, user_id.to_string()),
                WorkoutPlan::from_row,
            )
            .optional()?;
        Ok(plan)
    }

    pub fn list_for_date(&self, user_id: &Uuid, date: NaiveDate) -> Result<Vec<WorkoutPlan>> {
        self.list_in_range(user_id, date, date)
    }

    /// Plans whose date falls within `[start, end]`, oldest first
    pub fn list_in_range(
        &self,
        user_id: &Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WorkoutPlan>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "{PLAN_SELECT}
             WHERE p.user_id = ? AND p.plan_date BETWEEN ? AND ?
             ORDER BY p.plan_date, p.id"
        ))?;

        let plans = stmt
            .query_map(
                (user_id.to_string(), format_date(start), format_date(end)),
                WorkoutPlan::from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(plans)
    }

    /// Distinct years that have at least one plan, newest first
    pub fn plan_years(&self, user_id: &Uuid) -> Result<Vec<i32>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT CAST(substr(plan_date, 1, 4) AS INTEGER) AS year
             FROM workout_plans
             WHERE user_id = ?
             ORDER BY year DESC",
        )?;
        let years = stmt
            .query_map([user_id.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<i32>, _>>()?;
        Ok(years)
    }

    /// Mark a plan complete. Repeated calls overwrite the timestamp and note.
    pub fn complete(
        &self,
        plan_id: i64,
        user_id: &Uuid,
        at: DateTime<Utc>,
        description: Option<&str>,
    ) -> Result<Option<WorkoutPlan>> {
        let updated = {
            let conn = self.pool.get()?;
            conn.execute(
                "UPDATE workout_plans
                 SET is_completed = 1, completed_at = ?, description = ?
                 WHERE id = ? AND user_id = ?",
                (at.to_rfc3339(), description, plan_id, user_id.to_string()),
            )
            .context("Failed to complete workout plan")?
        };

        if updated == 0 {
            return Ok(None);
        }
        self.get_for_user(plan_id, user_id)
    }

    pub fn delete(&self, plan_id: i64, user_id: &Uuid) -> Result<bool> {
        let conn = self.pool.get()?;
        let deleted = conn
            .execute(
                "DELETE FROM workout_plans WHERE id = ? AND user_id = ?",
                (plan_id, user_id.to_string()),
            )
            .context("Failed to delete workout plan")?;
        Ok(deleted > 0)
    }
}
