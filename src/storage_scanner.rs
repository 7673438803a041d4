// Per-tenant storage measurement: database table sizes and recursive
// uploads-directory size. Always computed fresh; these are point-in-time
// measurements, not counters.

use crate::error::{MonitorError, Result};
use crate::models::round2;
use crate::tenant::Tenant;
use sqlx::ConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use std::path::Path;
use std::str::FromStr;

/// Per-table size metadata, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSize {
    pub data_length: u64,
    pub index_length: u64,
}

pub trait DatabaseCatalog {
    /// Per-table (data, index) byte counts for the tenant's schema. An
    /// empty set is a valid answer, not an error.
    fn table_sizes(
        &self,
        tenant: &Tenant,
    ) -> impl Future<Output = Result<Vec<TableSize>>> + Send;
}

fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1_048_576.0
}

/// Total database size for one tenant: sum of data + index bytes across its
/// tables, in rounded megabytes. Empty table set yields 0.0.
pub async fn database_size<C: DatabaseCatalog>(catalog: &C, tenant: &Tenant) -> Result<f64> {
    let tables = catalog.table_sizes(tenant).await?;
    let bytes: u64 = tables
        .iter()
        .map(|t| t.data_length.saturating_add(t.index_length))
        .sum();
    Ok(round2(bytes_to_mb(bytes)))
}

/// Recursive directory size in rounded megabytes. Blocking; async callers
/// go through [`directory_size`].
///
/// Iterative worklist, so untrusted nesting depth cannot blow the stack.
/// Only regular files count; symlinks and directories contribute 0. Entries
/// that vanish between enumeration and stat are skipped, since concurrent
/// mutation of a live tenant's files is expected. Only a missing or
/// unreadable root is an error.
pub fn directory_size_blocking(root: &Path) -> Result<f64> {
    let mut bytes: u64 = 0;
    let mut pending = vec![root.to_path_buf()];
    let mut at_root = true;

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if at_root => {
                return Err(MonitorError::Scan(format!("{}: {}", dir.display(), e)));
            }
            Err(e) => {
                tracing::debug!(
                    path = %dir.display(),
                    error = %e,
                    "subdirectory vanished or unreadable during scan; skipping"
                );
                continue;
            }
        };
        at_root = false;

        for entry in entries {
            let Ok(entry) = entry else { continue };
            // file_type() does not follow symlinks
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                pending.push(entry.path());
            } else if file_type.is_file()
                && let Ok(meta) = entry.metadata()
            {
                bytes = bytes.saturating_add(meta.len());
            }
        }
    }

    Ok(round2(bytes_to_mb(bytes)))
}

/// [`directory_size_blocking`] on the blocking pool.
pub async fn directory_size(path: &Path) -> Result<f64> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || directory_size_blocking(&path))
        .await
        .map_err(|e| MonitorError::Scan(format!("directory scan task join: {}", e)))?
}

/// Catalog for tenants backed by their own SQLite file: per-table byte
/// counts from the `dbstat` virtual table, index pages attributed via
/// sqlite_master. A build without dbstat support surfaces as a scan error,
/// which degrades that tenant rather than failing the report.
pub struct SqliteCatalog;

impl DatabaseCatalog for SqliteCatalog {
    async fn table_sizes(&self, tenant: &Tenant) -> Result<Vec<TableSize>> {
        let Some(db) = &tenant.database else {
            return Ok(Vec::new());
        };
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", db))
            .map_err(|e| MonitorError::Scan(format!("{}: {}", db, e)))?
            .read_only(true);
        let mut conn = opts
            .connect()
            .await
            .map_err(|e| MonitorError::Scan(format!("{}: {}", db, e)))?;

        let rows: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN m.type = 'table' THEN s.pgsize ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN m.type = 'index' THEN s.pgsize ELSE 0 END), 0)
            FROM sqlite_master m JOIN dbstat s ON s.name = m.name
            WHERE m.type IN ('table', 'index')
            GROUP BY m.tbl_name
            "#,
        )
        .fetch_all(&mut conn)
        .await
        .map_err(|e| MonitorError::Scan(format!("{}: {}", db, e)))?;

        Ok(rows
            .into_iter()
            .map(|(data, index)| TableSize {
                data_length: data.max(0) as u64,
                index_length: index.max(0) as u64,
            })
            .collect())
    }
}
