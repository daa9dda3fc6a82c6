// SQLite store for config entries ({url, token} per household) so they survive restarts.
// unique_id (household id) carries a UNIQUE constraint; that constraint is what decides
// between two concurrent setups of the same household.

use crate::models::{ConfigEntry, NewEntry};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use std::path::Path;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum EntryRepoError {
    #[error("household {0:?} is already configured")]
    AlreadyConfigured(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub struct EntryRepo {
    pool: SqlitePool,
}

impl EntryRepo {
    pub async fn connect(path: &str) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new().connect_with(opts).await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS config_entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                unique_id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                token TEXT NOT NULL,
                created_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Closes the pool; later queries fail with `PoolClosed`.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[instrument(skip(self, entry), fields(repo = "entries", operation = "insert", unique_id = %entry.unique_id))]
    pub async fn insert(&self, entry: NewEntry) -> Result<ConfigEntry, EntryRepoError> {
        let created_at = chrono::Utc::now().timestamp_millis();
        let result = sqlx::query(
            "INSERT INTO config_entries (unique_id, title, url, token, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.unique_id)
        .bind(&entry.title)
        .bind(&entry.connection.base_url)
        .bind(&entry.connection.token)
        .bind(created_at)
        .execute(&self.pool)
        .await;

        let done = match result {
            Ok(done) => done,
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(EntryRepoError::AlreadyConfigured(entry.unique_id));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(ConfigEntry {
            entry_id: done.last_insert_rowid().to_string(),
            unique_id: entry.unique_id,
            title: entry.title,
            url: entry.connection.base_url,
            token: entry.connection.token,
            created_at,
        })
    }

    #[instrument(skip(self), fields(repo = "entries", operation = "list"))]
    pub async fn list(&self) -> anyhow::Result<Vec<ConfigEntry>> {
        let rows = sqlx::query(
            "SELECT id, unique_id, title, url, token, created_at FROM config_entries ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_entry).collect()
    }

    pub async fn get(&self, entry_id: &str) -> anyhow::Result<Option<ConfigEntry>> {
        let Ok(id) = entry_id.parse::<i64>() else {
            return Ok(None);
        };
        let row = sqlx::query(
            "SELECT id, unique_id, title, url, token, created_at FROM config_entries WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    pub async fn find_by_unique_id(&self, unique_id: &str) -> anyhow::Result<Option<ConfigEntry>> {
        let row = sqlx::query(
            "SELECT id, unique_id, title, url, token, created_at FROM config_entries WHERE unique_id = $1",
        )
        .bind(unique_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_entry).transpose()
    }

    /// Returns false when no entry had this id.
    #[instrument(skip(self), fields(repo = "entries", operation = "delete"))]
    pub async fn delete(&self, entry_id: &str) -> anyhow::Result<bool> {
        let Ok(id) = entry_id.parse::<i64>() else {
            return Ok(false);
        };
        let done = sqlx::query("DELETE FROM config_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

fn row_to_entry(row: &SqliteRow) -> anyhow::Result<ConfigEntry> {
    let id: i64 = row.try_get("id")?;
    Ok(ConfigEntry {
        entry_id: id.to_string(),
        unique_id: row.try_get("unique_id")?,
        title: row.try_get("title")?,
        url: row.try_get("url")?,
        token: row.try_get("token")?,
        created_at: row.try_get("created_at")?,
    })
}
