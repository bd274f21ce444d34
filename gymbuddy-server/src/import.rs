//! Exercise catalog import from the gym exercise CSV dataset.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::db::repositories::{ExerciseRepository, NewExercise, UpsertOutcome};

/// Dataset headers that are renamed after trimming and lowercasing
const RENAMES: [(&str, &str); 3] = [
    ("exercise name", "exercise_name"),
    ("target_muscles", "target_muscle"),
    ("synergist_muscles", "synergist_muscle"),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub inserted: usize,
    pub skipped: usize,
    pub invalid: usize,
}

/// Uppercase the first letter of every alphabetic run, lowercase the rest
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    RENAMES
        .iter()
        .find(|(from, _)| *from == lowered)
        .map(|(_, to)| to.to_string())
        .unwrap_or(lowered)
}

struct Columns(HashMap<String, usize>);

impl Columns {
    fn field<'r>(&self, record: &'r csv::StringRecord, name: &str) -> Option<&'r str> {
        self.0
            .get(name)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn titled(&self, record: &csv::StringRecord, name: &str) -> Option<String> {
        self.field(record, name).map(title_case)
    }
}

fn instructions(columns: &Columns, record: &csv::StringRecord) -> Option<String> {
    let preparation = columns.field(record, "preparation");
    let execution = columns.field(record, "execution");
    let merged = match (preparation, execution) {
        (None, None) => return columns.field(record, "instructions").map(String::from),
        (p, e) => format!("{} {}", p.unwrap_or_default(), e.unwrap_or_default()),
    };
    Some(merged.trim().to_string())
}

/// Parse the dataset into rows ready for insertion.
///
/// Returns the parsed rows and the number of rows dropped for lacking an
/// exercise name.
pub fn parse_exercises<R: Read>(reader: R) -> Result<(Vec<NewExercise>, usize)> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Fields)
        .from_reader(reader);

    let headers = csv_reader.headers().context("Failed to read CSV header")?;
    let columns = Columns(
        headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (normalize_header(name), idx))
            .collect(),
    );

    if !columns.0.contains_key("exercise_name") {
        anyhow::bail!("CSV is missing an 'Exercise Name' column");
    }

    let mut rows = Vec::new();
    let mut invalid = 0;
    for (line, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", line + 2))?;

        let Some(exercise_name) = columns.titled(&record, "exercise_name") else {
            tracing::warn!("Skipping CSV row {} without an exercise name", line + 2);
            invalid += 1;
            continue;
        };

        rows.push(NewExercise {
            exercise_name,
            main_muscle: columns.titled(&record, "main_muscle").unwrap_or_default(),
            target_muscle: columns.titled(&record, "target_muscle"),
            synergist_muscle: columns.titled(&record, "synergist_muscle"),
            equipment: columns.titled(&record, "equipment"),
            instructions: instructions(&columns, &record),
        });
    }

    Ok((rows, invalid))
}

/// Upsert every row by exercise name; existing names count as skipped
pub fn import_exercises<R: Read>(repo: &ExerciseRepository, reader: R) -> Result<ImportSummary> {
    let (rows, invalid) = parse_exercises(reader)?;
    let mut summary = ImportSummary {
        invalid,
        ..Default::default()
    };

    for row in &rows {
        match repo.upsert(row)? {
            UpsertOutcome::Inserted => summary.inserted += 1,
            UpsertOutcome::Skipped => summary.skipped += 1,
        }
    }

    tracing::info!(
        "Imported exercises: {} inserted, {} skipped, {} invalid",
        summary.inserted,
        summary.skipped,
        summary.invalid
    );
    Ok(summary)
}

pub fn import_exercises_from_path(repo: &ExerciseRepository, path: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    import_exercises(repo, file)
}
