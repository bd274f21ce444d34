mod user_repository;
mod exercise_repository;
mod plan_repository;
mod profile_repository;
mod thread_repository;
mod reply_repository;

pub use user_repository::UserRepository;
pub use exercise_repository::{ExerciseRepository, NewExercise, UpsertOutcome};
pub use plan_repository::PlanRepository;
pub use profile_repository::ProfileRepository;
pub use thread_repository::ThreadRepository;
pub use reply_repository::{build_reply_tree, ReplyRepository};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{types::Type, Row};
use uuid::Uuid;

/// Build a model from a row using its column names
pub(crate) trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

fn conversion_error<E>(row: &Row, column: &str, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let idx = row.as_ref().column_index(column).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn uuid_column(row: &Row, column: &str) -> rusqlite::Result<Uuid> {
    let raw: String = row.get(column)?;
    Uuid::parse_str(&raw).map_err(|e| conversion_error(row, column, e))
}

pub(crate) fn datetime_column(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    raw.parse::<DateTime<Utc>>()
        .map_err(|e| conversion_error(row, column, e))
}

pub(crate) fn optional_datetime_column(
    row: &Row,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        s.parse::<DateTime<Utc>>()
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

pub(crate) fn date_column(row: &Row, column: &str) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(column)?;
    NaiveDate::parse_from_str(&raw, gymbuddy_types::validation::DATE_FORMAT)
        .map_err(|e| conversion_error(row, column, e))
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(gymbuddy_types::validation::DATE_FORMAT).to_string()
}
