// Counter store tests: defaults, kind scoping, persistence, and the
// no-lost-updates guarantee under concurrent fan-in.

use netmon::counter_store::{CounterStore, MemoryCounterStore, SqliteCounterStore};
use netmon::models::{CounterKind, TenantId};
use std::sync::Arc;

#[tokio::test]
async fn get_before_any_increment_returns_zero() {
    let store = MemoryCounterStore::new();
    assert_eq!(store.get(TenantId(1), CounterKind::Visits).await.unwrap(), 0);
    assert_eq!(
        store.get(TenantId(1), CounterKind::Queries).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn increment_returns_new_value_and_is_key_scoped() {
    let store = MemoryCounterStore::new();
    assert_eq!(
        store
            .increment(TenantId(1), CounterKind::Visits)
            .await
            .unwrap(),
        1
    );
    assert_eq!(
        store
            .increment(TenantId(1), CounterKind::Visits)
            .await
            .unwrap(),
        2
    );
    // Other kind and other tenant are untouched
    assert_eq!(
        store.get(TenantId(1), CounterKind::Queries).await.unwrap(),
        0
    );
    assert_eq!(store.get(TenantId(2), CounterKind::Visits).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_store_concurrent_increments_lose_no_updates() {
    let store = Arc::new(MemoryCounterStore::new());
    let mut handles = Vec::new();
    for _ in 0..100 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .increment(TenantId(7), CounterKind::Visits)
                .await
                .unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(
        store.get(TenantId(7), CounterKind::Visits).await.unwrap(),
        100
    );
}

#[tokio::test]
async fn sqlite_store_persists_across_connections() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("counters.db");
    let path_str = db_path.to_str().unwrap();

    {
        let store = SqliteCounterStore::connect(path_str).await.unwrap();
        store.init().await.unwrap();
        store
            .increment(TenantId(3), CounterKind::Queries)
            .await
            .unwrap();
        store
            .increment(TenantId(3), CounterKind::Queries)
            .await
            .unwrap();
    }

    let store = SqliteCounterStore::connect(path_str).await.unwrap();
    store.init().await.unwrap();
    assert_eq!(
        store.get(TenantId(3), CounterKind::Queries).await.unwrap(),
        2
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_store_concurrent_increments_lose_no_updates() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("counters.db");
    let store = Arc::new(
        SqliteCounterStore::connect(db_path.to_str().unwrap())
            .await
            .unwrap(),
    );
    store.init().await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..50 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .increment(TenantId(9), CounterKind::Visits)
                .await
                .unwrap();
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(
        store.get(TenantId(9), CounterKind::Visits).await.unwrap(),
        50
    );
}
