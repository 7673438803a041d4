// Storage scanner tests: directory traversal edge cases and database size
// aggregation over a fixed catalog.

use netmon::error::{MonitorError, Result};
use netmon::models::TenantId;
use netmon::storage_scanner::{DatabaseCatalog, TableSize, database_size, directory_size_blocking};
use netmon::tenant::Tenant;
use std::fs;
use std::path::Path;

fn tenant_at(dir: &Path) -> Tenant {
    Tenant {
        id: TenantId(1),
        display_name: "Site".into(),
        uploads_dir: dir.to_path_buf(),
        database: None,
    }
}

struct FixedCatalog(Vec<TableSize>);

impl DatabaseCatalog for FixedCatalog {
    async fn table_sizes(&self, _tenant: &Tenant) -> Result<Vec<TableSize>> {
        Ok(self.0.clone())
    }
}

#[test]
fn empty_directory_is_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    assert_eq!(directory_size_blocking(dir.path()).unwrap(), 0.0);
}

#[test]
fn small_files_round_to_hundredths() {
    let dir = tempfile::TempDir::new().unwrap();
    fs::write(dir.path().join("a"), vec![0u8; 1000]).unwrap();
    fs::write(dir.path().join("b"), vec![0u8; 2048]).unwrap();
    fs::write(dir.path().join("c"), vec![0u8; 3072]).unwrap();
    // (1000 + 2048 + 3072) / 1048576 = 0.0058..., rounds to 0.01
    assert_eq!(directory_size_blocking(dir.path()).unwrap(), 0.01);
}

#[test]
fn deep_nesting_is_traversed_without_recursion() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut path = dir.path().to_path_buf();
    for i in 0..64 {
        path.push(format!("d{}", i));
    }
    fs::create_dir_all(&path).unwrap();
    fs::write(path.join("blob"), vec![0u8; 1_048_576]).unwrap();
    assert_eq!(directory_size_blocking(dir.path()).unwrap(), 1.0);
}

#[test]
fn missing_directory_is_a_scan_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("gone");
    let err = directory_size_blocking(&missing).unwrap_err();
    assert!(matches!(err, MonitorError::Scan(_)));
}

#[cfg(unix)]
#[test]
fn symlinks_contribute_zero() {
    let dir = tempfile::TempDir::new().unwrap();
    let target = dir.path().join("outside");
    fs::write(&target, vec![0u8; 2_097_152]).unwrap();

    let scanned = dir.path().join("uploads");
    fs::create_dir(&scanned).unwrap();
    std::os::unix::fs::symlink(&target, scanned.join("link")).unwrap();

    assert_eq!(directory_size_blocking(&scanned).unwrap(), 0.0);
}

#[tokio::test]
async fn database_size_sums_data_and_index_lengths() {
    let dir = tempfile::TempDir::new().unwrap();
    let tenant = tenant_at(dir.path());
    let catalog = FixedCatalog(vec![TableSize {
        data_length: 1_048_576,
        index_length: 524_288,
    }]);
    assert_eq!(database_size(&catalog, &tenant).await.unwrap(), 1.5);
}

#[tokio::test]
async fn database_size_aggregates_across_tables() {
    let dir = tempfile::TempDir::new().unwrap();
    let tenant = tenant_at(dir.path());
    let catalog = FixedCatalog(vec![
        TableSize {
            data_length: 1_048_576,
            index_length: 0,
        },
        TableSize {
            data_length: 2_097_152,
            index_length: 524_288,
        },
    ]);
    assert_eq!(database_size(&catalog, &tenant).await.unwrap(), 3.5);
}

#[tokio::test]
async fn empty_table_set_is_zero_not_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let tenant = tenant_at(dir.path());
    let catalog = FixedCatalog(Vec::new());
    assert_eq!(database_size(&catalog, &tenant).await.unwrap(), 0.0);
}
