use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
    Row,
};
use std::{str::FromStr, time::Duration};

use super::Error;

/// Tables and columns the dataset must carry. Declared statically rather than
/// reflected from the live store, so a bad file fails at startup.
const REQUIRED_SCHEMA: &[(&str, &[&str])] = &[
    ("measurement", &["station", "date", "prcp", "tobs"]),
    (
        "station",
        &["station", "name", "latitude", "longitude", "elevation"],
    ),
];

/// Read-only handle to the climate dataset.
///
/// The pool is shared across requests; SQLite's concurrent-read guarantees are
/// all the locking discipline a pure read path needs.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(path: &str) -> Result<Self, Error> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
            .map_err(Error::Connection)?
            .read_only(true)
            .pragma("query_only", "ON")
            .pragma("busy_timeout", "5000")
            .pragma("cache_size", "-64000");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            .connect_with(options)
            .await
            .map_err(Error::Connection)?;

        let db = Self { pool };
        db.verify_schema().await?;
        info!("SQLite climate dataset opened read-only at: {}", path);

        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check that every required table and column is present
    async fn verify_schema(&self) -> Result<(), Error> {
        for (table, columns) in REQUIRED_SCHEMA {
            let rows = sqlx::query(&format!("PRAGMA table_info({})", table))
                .fetch_all(&self.pool)
                .await?;

            if rows.is_empty() {
                return Err(Error::Schema(format!("missing table: {}", table)));
            }

            let found: Vec<String> = rows.iter().map(|row| row.get("name")).collect();
            for column in *columns {
                if !found.iter().any(|name| name == column) {
                    return Err(Error::Schema(format!(
                        "table {} is missing column: {}",
                        table, column
                    )));
                }
            }
        }

        Ok(())
    }

    /// Check database connectivity and integrity.
    pub async fn health_check(&self) -> Result<(), Error> {
        // Basic connectivity
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;

        // Page structure integrity
        let result: String = sqlx::query_scalar("PRAGMA quick_check;")
            .fetch_one(&self.pool)
            .await?;
        if result != "ok" {
            return Err(Error::Schema(format!(
                "dataset integrity check failed: {}",
                result
            )));
        }

        Ok(())
    }
}
