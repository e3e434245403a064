//! SQLite-backed snapshot persistence.
//!
//! One row per entity collection: the value under each key is the complete
//! JSON serialization of that collection, rewritten in full on every change.

use anyhow::{Context as _, Result};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Stable keys for the persisted snapshots.
pub mod keys {
    pub const USERS: &str = "komorebi_all_users";
    pub const SESSION: &str = "komorebi_current_user";
    pub const WORKS: &str = "komorebi_works";
    pub const MESSAGES: &str = "komorebi_messages";
    pub const THREADS: &str = "komorebi_threads";
    pub const FOLDERS: &str = "komorebi_folders";
    pub const LOCAL_THEME: &str = "komorebi_local_theme";
}

/// Key-value snapshot storage.
#[derive(Clone)]
pub struct SnapshotDb {
    pool: SqlitePool,
}

impl SnapshotDb {
    /// Open the snapshot database at `url`, creating it if missing.
    pub async fn open(url: &str) -> Result<Self> {
        let opts = url
            .parse::<SqliteConnectOptions>()
            .context("failed to parse database options")?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .context("failed to connect to SQLite database")?;

        // Ensure tables exist
        _ = sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS snapshots (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL
            );
            ",
        )
        .execute(&pool)
        .await
        .context("failed to create tables")?;

        Ok(Self { pool })
    }

    /// Fetch the snapshot stored under `key`, if any.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM snapshots WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read snapshot {key}"))?;

        Ok(value)
    }

    /// Overwrite the snapshot stored under `key`.
    pub async fn put(&self, key: &str, value: &str) -> Result<()> {
        _ = sqlx::query(
            "INSERT INTO snapshots (key, value) VALUES (?, ?)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write snapshot {key}"))?;

        Ok(())
    }

    /// Remove the snapshot stored under `key`. Removing an absent key is not
    /// an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        _ = sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete snapshot {key}"))?;

        Ok(())
    }
}
