//! Behavior tests for the embedding sync scheduler.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{draft, MemoryStore};
use daybook_core::{EntryRepository, UpdateEntry, VectorStore};
use daybook_inference::MockBackend;
use daybook_recall::{EmbeddingSyncService, SyncConfig};
use uuid::Uuid;

fn service(
    store: Arc<MemoryStore>,
    backend: Arc<MockBackend>,
    owner: Uuid,
    batch_size: i64,
) -> EmbeddingSyncService {
    EmbeddingSyncService::new(
        store,
        backend,
        SyncConfig {
            interval: Duration::from_secs(3600),
            batch_size,
            owner_id: owner,
        },
    )
}

#[tokio::test]
async fn one_cycle_embeds_exactly_the_stale_entries() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    // Two stale (never synced)...
    let stale_a = store.insert(owner, draft("Fresh thoughts", "alpha")).await.unwrap();
    let stale_b = store.insert(owner, draft("More thoughts", "beta")).await.unwrap();
    // ...three already synced after their last edit.
    for body in ["gamma", "delta", "epsilon"] {
        let entry = store.insert(owner, draft("Synced", body)).await.unwrap();
        store
            .upsert_vector(entry.id, &MockBackend::project(body, 32))
            .await
            .unwrap();
    }

    let sync = service(store.clone(), backend.clone(), owner, 10);
    sync.run_cycle().await;

    assert_eq!(backend.embed_calls(), 2, "only the stale entries get embedded");
    assert!(store.has_vector(stale_a.id));
    assert!(store.has_vector(stale_b.id));
    assert!(store.fetch_stale_batch(owner, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_stale_set_completes_silently() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    let sync = service(store, backend.clone(), owner, 10);
    sync.run_cycle().await;

    assert_eq!(backend.embed_calls(), 0);
}

#[tokio::test]
async fn one_failing_entry_never_aborts_the_batch() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    backend.fail_embeds_containing("poisoned");
    let owner = Uuid::new_v4();

    let poisoned = store.insert(owner, draft("Bad", "poisoned payload")).await.unwrap();
    let healthy = store.insert(owner, draft("Good", "healthy payload")).await.unwrap();

    let sync = service(store.clone(), backend.clone(), owner, 10);
    sync.run_cycle().await;

    assert_eq!(backend.embed_calls(), 2, "failure must not short-circuit the batch");
    assert!(store.has_vector(healthy.id));
    assert!(!store.has_vector(poisoned.id));

    // The failed entry stays stale and is retried on the next cycle.
    let remaining = store.fetch_stale_batch(owner, 10).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, poisoned.id);
    sync.run_cycle().await;
    assert_eq!(backend.embed_calls(), 3);
}

#[tokio::test]
async fn batch_size_bounds_per_cycle_work() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    for i in 0..5 {
        store.insert(owner, draft(&format!("Entry {i}"), "text")).await.unwrap();
    }

    let sync = service(store.clone(), backend.clone(), owner, 3);
    sync.run_cycle().await;
    assert_eq!(backend.embed_calls(), 3);
    assert_eq!(store.fetch_stale_batch(owner, 10).await.unwrap().len(), 2);

    // The next cycle drains the remainder.
    sync.run_cycle().await;
    assert_eq!(backend.embed_calls(), 5);
    assert!(store.fetch_stale_batch(owner, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_after_sync_restales_the_entry() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    let entry = store.insert(owner, draft("Plans", "original")).await.unwrap();
    let sync = service(store.clone(), backend.clone(), owner, 10);
    sync.run_cycle().await;
    assert!(store.fetch_stale_batch(owner, 10).await.unwrap().is_empty());

    store
        .update(
            entry.id,
            UpdateEntry {
                body_text: Some("edited".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let stale = store.fetch_stale_batch(owner, 10).await.unwrap();
    assert_eq!(stale.len(), 1, "any content edit re-stales immediately");
    assert_eq!(stale[0].id, entry.id);

    sync.run_cycle().await;
    assert!(store.fetch_stale_batch(owner, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn archived_entries_are_never_synced() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    let entry = store.insert(owner, draft("Shelved", "old text")).await.unwrap();
    store.archive(entry.id).await.unwrap();

    let sync = service(store.clone(), backend.clone(), owner, 10);
    sync.run_cycle().await;

    assert_eq!(backend.embed_calls(), 0);
    assert!(!store.has_vector(entry.id));
}

#[tokio::test(flavor = "multi_thread")]
async fn double_start_runs_a_single_scheduler() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    store.insert(owner, draft("One", "alpha")).await.unwrap();
    store.insert(owner, draft("Two", "beta")).await.unwrap();

    let sync = service(store.clone(), backend.clone(), owner, 10);
    sync.start();
    sync.start();
    assert!(sync.is_running());

    // Only one immediate cycle fires: two embeds, not four.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(backend.embed_calls(), 2);

    sync.stop();
    assert!(!sync.is_running());
}

#[tokio::test(flavor = "multi_thread")]
async fn start_stop_are_idempotent_and_restartable() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    let sync = service(store, backend, owner, 10);

    assert!(!sync.is_running());
    sync.stop(); // stop before start is a no-op
    assert!(!sync.is_running());

    sync.start();
    assert!(sync.is_running());
    sync.stop();
    sync.stop();
    assert!(!sync.is_running());

    sync.start();
    assert!(sync.is_running());
    sync.stop();
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_start_stop_never_wedges_the_state() {
    let store = Arc::new(MemoryStore::new());
    let backend = Arc::new(MockBackend::new());
    let owner = Uuid::new_v4();

    let sync = Arc::new(service(store, backend, owner, 10));

    let mut handles = Vec::new();
    for i in 0..16 {
        let sync = sync.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                sync.start();
            } else {
                sync.stop();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // Whatever interleaving happened, the state machine still works.
    sync.start();
    assert!(sync.is_running());
    sync.stop();
    assert!(!sync.is_running());
}
