use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};

use super::{RateLimitStore, entry_id};
use crate::error::StoreError;
use crate::models::RateLimitEntry;

const SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS rate_limits (
        id TEXT PRIMARY KEY NOT NULL,
        client_ip TEXT NOT NULL UNIQUE,
        count INTEGER NOT NULL DEFAULT 0,
        start_time REAL NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
";

// Insert-or-update in one statement. id and client_ip identify the same row,
// so the conflict target is left open. SET expressions see the row as it was
// before the update, so both CASE arms compare against the old start_time.
const HIT: &str = r"
    INSERT INTO rate_limits (id, client_ip, count, start_time, created_at, updated_at)
    VALUES (?, ?, 1, ?, ?, ?)
    ON CONFLICT DO UPDATE SET
        count = CASE WHEN ? - start_time > ? THEN 1 ELSE count + 1 END,
        start_time = CASE WHEN ? - start_time > ? THEN ? ELSE start_time END,
        updated_at = ?
    RETURNING id, client_ip, count, start_time, created_at, updated_at
";

const SELECT_ONE: &str = r"
    SELECT id, client_ip, count, start_time, created_at, updated_at
    FROM rate_limits
    WHERE client_ip = ?
";

#[derive(Clone)]
pub struct SqlStore {
    pool: SqlitePool,
}

impl SqlStore {
    // creates the database file and table when missing
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let in_memory = url.contains(":memory:") || url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(url)
            .map_err(StoreError::ConnectionFailed)?
            .create_if_missing(true);
        if !in_memory {
            // writers on other pool connections wait for the lock instead of failing
            options = options
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5));
        }

        // An in-memory database lives and dies with its connection, so keep
        // exactly one open for the lifetime of the pool.
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(StoreError::ConnectionFailed)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(StoreError::SchemaFailed)?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RateLimitStore for SqlStore {
    async fn hit(
        &self,
        client_ip: &str,
        now: f64,
        window_seconds: f64,
    ) -> Result<RateLimitEntry, StoreError> {
        let stamp = Utc::now();

        sqlx::query_as::<_, RateLimitEntry>(HIT)
            .bind(entry_id(client_ip))
            .bind(client_ip)
            .bind(now)
            .bind(stamp)
            .bind(stamp)
            .bind(now)
            .bind(window_seconds)
            .bind(now)
            .bind(window_seconds)
            .bind(now)
            .bind(stamp)
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::QueryFailed)
    }

    async fn get(&self, client_ip: &str) -> Result<Option<RateLimitEntry>, StoreError> {
        sqlx::query_as::<_, RateLimitEntry>(SELECT_ONE)
            .bind(client_ip)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::QueryFailed)
    }

    async fn tracked_clients(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rate_limits")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::QueryFailed)?;
        Ok(count as u64)
    }
}
