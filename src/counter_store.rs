// Per-tenant visit/query counters. Increment must be atomic end-to-end:
// request handlers hit the same (tenant, kind) key concurrently and no
// update may be lost.

use crate::error::{MonitorError, Result};
use crate::models::{CounterKind, TenantId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

pub trait CounterStore {
    /// Add 1 to the counter (lazily created at 0) and return the new value.
    fn increment(
        &self,
        tenant: TenantId,
        kind: CounterKind,
    ) -> impl Future<Output = Result<u64>> + Send;

    /// Current value; 0 for a key never incremented. No side effect.
    fn get(
        &self,
        tenant: TenantId,
        kind: CounterKind,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// SQLite-backed store. The read-modify-write runs as a single UPSERT so
/// atomicity holds across connections and processes sharing the file.
pub struct SqliteCounterStore {
    pool: SqlitePool,
}

impl SqliteCounterStore {
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
            CREATE TABLE IF NOT EXISTS counters (
                tenant INTEGER NOT NULL,
                kind TEXT NOT NULL,
                value INTEGER NOT NULL,
                PRIMARY KEY (tenant, kind)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

impl CounterStore for SqliteCounterStore {
    async fn increment(&self, tenant: TenantId, kind: CounterKind) -> Result<u64> {
        let value: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO counters (tenant, kind, value) VALUES ($1, $2, 1)
            ON CONFLICT (tenant, kind) DO UPDATE SET value = value + 1
            RETURNING value
            "#,
        )
        .bind(tenant.0 as i64)
        .bind(kind.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| MonitorError::StoreUnavailable(e.to_string()))?;
        Ok(value as u64)
    }

    async fn get(&self, tenant: TenantId, kind: CounterKind) -> Result<u64> {
        let value: Option<i64> =
            sqlx::query_scalar("SELECT value FROM counters WHERE tenant = $1 AND kind = $2")
                .bind(tenant.0 as i64)
                .bind(kind.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| MonitorError::StoreUnavailable(e.to_string()))?;
        Ok(value.unwrap_or(0) as u64)
    }
}

/// In-memory store guarded by a mutex. Interchangeable with the SQLite
/// store for embedders that do not need persistence, and for tests.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<(TenantId, CounterKind), u64>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    async fn increment(&self, tenant: TenantId, kind: CounterKind) -> Result<u64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|e| MonitorError::StoreUnavailable(format!("lock poisoned: {}", e)))?;
        let value = counters.entry((tenant, kind)).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn get(&self, tenant: TenantId, kind: CounterKind) -> Result<u64> {
        let counters = self
            .counters
            .lock()
            .map_err(|e| MonitorError::StoreUnavailable(format!("lock poisoned: {}", e)))?;
        Ok(counters.get(&(tenant, kind)).copied().unwrap_or(0))
    }
}
