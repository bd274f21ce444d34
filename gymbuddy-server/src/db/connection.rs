use anyhow::{Context, Result};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;
use uuid::Uuid;

use super::schema::{SAMPLE_DATA, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Database wrapper with connection pooling support
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let manager = Self::create_connection_manager(path);
        let pool = Pool::new(manager).context("Failed to create database connection pool")?;
        Ok(Self { pool })
    }

    /// Create appropriate connection manager based on path
    ///
    /// `:memory:` maps to a uniquely named shared-cache database so every
    /// pooled connection sees the same tables. Foreign keys are switched on
    /// for each new connection.
    fn create_connection_manager<P: AsRef<Path>>(path: P) -> SqliteConnectionManager {
        let path_str = path.as_ref().to_string_lossy();
        let trimmed_path = path_str.trim();

        let manager = if trimmed_path.eq_ignore_ascii_case(MEMORY_DB_PATH) {
            let uri = format!("file:gymbuddy-{}?mode=memory&cache=shared", Uuid::new_v4());
            SqliteConnectionManager::file(uri).with_flags(
                OpenFlags::SQLITE_OPEN_URI
                    | OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE,
            )
        } else {
            SqliteConnectionManager::file(path)
        };

        manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
    }

    /// Create an in-memory database pool (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Initialize the database schema
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(())
    }

    /// Seed the exercise catalog with a handful of sample entries
    pub fn seed_sample_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SAMPLE_DATA)
            .context("Failed to seed sample data")?;
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        self.pool
            .get()
            .context("Failed to get database connection from pool")
    }
}
