use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gymbuddy_server::db::{repositories::{ExerciseRepository, UserRepository}, Database};
use gymbuddy_server::import::{import_exercises_from_path, parse_exercises, ImportSummary};
use gymbuddy_server::password::{hash_password_with_iterations, DEFAULT_ITERATIONS};
use gymbuddy_server::session::SessionManager;
use gymbuddy_types::{is_valid_username, User};
use std::path::{Path, PathBuf};

/// GymBuddy database maintenance utility
///
/// Loads the exercise catalog from the gym exercise CSV dataset and manages
/// administrator accounts.
#[derive(Parser, Debug)]
#[command(name = "gymbuddy-migrate")]
#[command(about = "Import exercises and manage GymBuddy administrators", long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, env = "DATABASE_PATH", default_value = "./gymbuddy.db")]
    database: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import exercises from a CSV file; existing names are skipped
    ImportExercises {
        /// CSV file with an "Exercise Name" column
        csv: PathBuf,

        /// Parse the file and report what would be imported
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Create a superuser, or promote an existing user and reset their password
    CreateSuperuser {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, env = "GYMBUDDY_SUPERUSER_PASSWORD", hide_env_values = true)]
        password: String,

        /// PBKDF2 rounds for the stored hash
        #[arg(long, env = "PASSWORD_ITERATIONS", default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,
    },
}

/// Open the database, creating the schema when missing
fn open_database(path: &str) -> Result<Database> {
    let db = Database::new(path).context("Failed to open database connection")?;
    db.initialize().context("Failed to initialize database schema")?;
    Ok(db)
}

fn display_summary(summary: &ImportSummary, dry_run: bool) {
    println!();
    println!("Import Summary");
    println!("==============");
    println!();
    if dry_run {
        println!("Rows ready to import: {}", summary.inserted);
    } else {
        println!("Inserted: {}", summary.inserted);
        println!("Skipped (already present): {}", summary.skipped);
    }
    println!("Invalid rows: {}", summary.invalid);
    println!();
    if dry_run {
        println!("This was a dry run - no changes were made to the database.");
    } else {
        println!("Import completed successfully!");
    }
}

fn dry_run_import(csv: &Path) -> Result<ImportSummary> {
    let file = std::fs::File::open(csv)
        .with_context(|| format!("Failed to open {}", csv.display()))?;
    let (rows, invalid) = parse_exercises(file)?;
    Ok(ImportSummary {
        inserted: rows.len(),
        skipped: 0,
        invalid,
    })
}

/// Create the account or promote the existing one. Returns the user and
/// whether it was newly created. A promoted user's old sessions are revoked.
fn create_superuser(
    db: &Database,
    username: &str,
    password: &str,
    iterations: u32,
) -> Result<(User, bool)> {
    let username = username.trim();
    if !is_valid_username(username) {
        anyhow::bail!("Invalid username: {:?}", username);
    }
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let repo = UserRepository::new(db.pool.clone());
    let password_hash = hash_password_with_iterations(password, iterations);

    match repo.get_by_username(username)? {
        Some(mut user) => {
            repo.set_password(&user.id, &password_hash)?;
            repo.set_superuser(&user.id, true)?;
            let revoked = SessionManager::new(db.clone()).delete_user_sessions(&user.id)?;
            if revoked > 0 {
                println!("Revoked {} existing session(s)", revoked);
            }
            user.is_superuser = true;
            Ok((user, false))
        }
        None => {
            let user = repo.create(username, &password_hash, true)?;
            Ok((user, true))
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymbuddy_server=warn".into()),
        )
        .init();

    println!("GymBuddy Maintenance Utility");
    println!("============================");
    println!();
    println!("Database: {}", args.database);
    println!();

    match args.command {
        Command::ImportExercises { csv, dry_run } => {
            println!("Reading exercises from {}", csv.display());
            let summary = if dry_run {
                dry_run_import(&csv)?
            } else {
                let db = open_database(&args.database)?;
                let repo = ExerciseRepository::new(db.pool.clone());
                let summary = import_exercises_from_path(&repo, &csv)?;
                println!("Catalog now holds {} exercises", repo.count()?);
                summary
            };
            display_summary(&summary, dry_run);
        }
        Command::CreateSuperuser {
            username,
            password,
            iterations,
        } => {
            let db = open_database(&args.database)?;
            let (user, created) = create_superuser(&db, &username, &password, iterations)?;
            if created {
                println!("Created superuser '{}'", user.username);
            } else {
                println!("Promoted existing user '{}' to superuser", user.username);
            }
        }
    }

    Ok(())
}
