//! Shard Backend Tests
//!
//! Tests verify:
//! - File backend durability across reopen
//! - Recovery from a torn log tail
//! - Duplicate policy in both backends
//! - Reset and destroy behavior
//! - Catalog wiring of configured tables

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use cellstore::config::{BackendKind, WalSyncStrategy};
use cellstore::wal::WalEntry;
use cellstore::{
    Catalog, Cell, Config, Context, FileBackend, Location, MemoryBackend, ShardBackend,
    StoreError,
};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_file_backend(dir: &Path) -> FileBackend {
    FileBackend::open(dir, "shard0", WalSyncStrategy::EveryWrite).unwrap()
}

fn put(backend: &dyn ShardBackend, row: &str, r: i64, body: &str) -> cellstore::Result<()> {
    backend.put(&Context::background(), row, "BASE", r, Cell::with_body(body))
}

// =============================================================================
// File Backend Tests
// =============================================================================

#[test]
fn test_file_backend_survives_reopen() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::background();

    let added_before = {
        let backend = open_file_backend(temp.path());
        put(&backend, "A", 1, "x").unwrap();
        put(&backend, "A", 2, "y").unwrap();
        put(&backend, "B", 1, "q").unwrap();
        assert_eq!(backend.len(), 3);
        backend.get(&ctx, "A", "BASE", 2).unwrap().unwrap().added
    };

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 3);
    let cell = backend.get(&ctx, "A", "BASE", 2).unwrap().unwrap();
    assert_eq!(cell.body, "y");
    assert_eq!(cell.added, added_before);
    assert_eq!(backend.get_latest(&ctx, "A", "BASE").unwrap().unwrap().ref_key, 2);

    // New markers continue past everything replayed
    put(&backend, "C", 1, "new").unwrap();
    let newest = backend.get(&ctx, "C", "BASE", 1).unwrap().unwrap();
    let all = backend
        .partition_read(&ctx, 0, Location::Added, 0, 100)
        .unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[3], newest);
}

#[test]
fn test_file_backend_drops_torn_tail() {
    let temp = TempDir::new().unwrap();
    let path = {
        let backend = open_file_backend(temp.path());
        put(&backend, "A", 1, "x").unwrap();
        put(&backend, "A", 2, "y").unwrap();
        backend.path().to_path_buf()
    };

    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(&[7u8; 11]).unwrap();
    drop(file);

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 2);
    put(&backend, "A", 3, "z").unwrap();
    drop(backend);

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 3);
    let latest = backend
        .get_latest(&Context::background(), "A", "BASE")
        .unwrap()
        .unwrap();
    assert_eq!(latest.body, "z");
}

#[test]
fn test_file_backend_duplicate_policy() {
    let temp = TempDir::new().unwrap();
    let backend = open_file_backend(temp.path());

    put(&backend, "A", 1, "x").unwrap();
    put(&backend, "A", 1, "x").unwrap();
    assert!(matches!(
        put(&backend, "A", 1, "other"),
        Err(StoreError::DuplicateCell { .. })
    ));
    let len = std::fs::metadata(backend.path()).unwrap().len();
    drop(backend);

    // Neither the no-op nor the rejected write reached the log
    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 1);
    assert_eq!(std::fs::metadata(backend.path()).unwrap().len(), len);
}

#[test]
fn test_file_backend_reset_keeps_data() {
    let temp = TempDir::new().unwrap();
    let backend = open_file_backend(temp.path());
    let ctx = Context::background();

    put(&backend, "A", 1, "x").unwrap();
    backend.reset_connection(&ctx, "A").unwrap();
    put(&backend, "A", 2, "y").unwrap();
    drop(backend);

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 2);
}

#[test]
fn test_file_backend_destroy() {
    let temp = TempDir::new().unwrap();
    let backend = open_file_backend(temp.path());
    let ctx = Context::background();
    put(&backend, "A", 1, "x").unwrap();

    backend.destroy(&ctx).unwrap();
    assert!(matches!(
        backend.get(&ctx, "A", "BASE", 1),
        Err(StoreError::ShardClosed(_))
    ));
    assert!(matches!(put(&backend, "A", 2, "y"), Err(StoreError::ShardClosed(_))));
    assert!(matches!(backend.destroy(&ctx), Err(StoreError::ShardClosed(_))));
    drop(backend);

    // Destroy releases resources; it does not erase the log
    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 1);
}

/// Append a complete, checksummed record the backend never applied, as a
/// write that flushed but then failed to sync would leave behind
fn append_unapplied_record(path: &Path, lsn: u64, cell: Cell) {
    let record = WalEntry::new(lsn, cell).encode().unwrap();
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(&record).unwrap();
}

#[test]
fn test_destroy_drops_unapplied_record() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::background();
    let backend = open_file_backend(temp.path());
    put(&backend, "A", 1, "x").unwrap();

    let ghost = Cell {
        added: u64::MAX - 1,
        ..Cell::new("A", "BASE", 2, "never acknowledged")
    };
    append_unapplied_record(backend.path(), 2, ghost);
    assert!(backend.get(&ctx, "A", "BASE", 2).unwrap().is_none());

    backend.destroy(&ctx).unwrap();
    drop(backend);

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 1);
    assert!(backend.get(&ctx, "A", "BASE", 2).unwrap().is_none());

    // A retry with a different body is a fresh write, not a duplicate
    put(&backend, "A", 2, "retried").unwrap();
    assert_eq!(backend.get(&ctx, "A", "BASE", 2).unwrap().unwrap().body, "retried");
}

#[test]
fn test_reset_drops_unapplied_record() {
    let temp = TempDir::new().unwrap();
    let ctx = Context::background();
    let backend = open_file_backend(temp.path());
    put(&backend, "A", 1, "x").unwrap();

    append_unapplied_record(backend.path(), 2, Cell::new("A", "BASE", 2, "lost"));
    backend.reset_connection(&ctx, "A").unwrap();
    put(&backend, "A", 3, "z").unwrap();
    drop(backend);

    let backend = open_file_backend(temp.path());
    assert_eq!(backend.len(), 2);
    assert!(backend.get(&ctx, "A", "BASE", 2).unwrap().is_none());
    assert_eq!(backend.get_latest(&ctx, "A", "BASE").unwrap().unwrap().body, "z");
}

#[test]
fn test_file_backend_honors_canceled_context() {
    let temp = TempDir::new().unwrap();
    let backend = open_file_backend(temp.path());
    let ctx = Context::background();
    ctx.cancel();

    assert!(matches!(
        backend.put(&ctx, "A", "BASE", 1, Cell::with_body("x")),
        Err(StoreError::Canceled)
    ));
    assert!(backend.is_empty());
}

// =============================================================================
// Memory Backend Tests
// =============================================================================

#[test]
fn test_memory_backend_basics() {
    let backend = MemoryBackend::new("mem0");
    let ctx = Context::background();
    assert_eq!(backend.name(), "mem0");

    put(&backend, "A", 1, "x").unwrap();
    put(&backend, "A", 5, "y").unwrap();
    assert_eq!(backend.get_latest(&ctx, "A", "BASE").unwrap().unwrap().body, "y");
    assert!(backend.get(&ctx, "A", "BASE", 2).unwrap().is_none());
    assert!(matches!(
        put(&backend, "A", 5, "changed"),
        Err(StoreError::DuplicateCell { ref_key: 5, .. })
    ));
    backend.reset_connection(&ctx, "A").unwrap();
    assert_eq!(backend.len(), 2);
}

#[test]
fn test_memory_backend_destroy_once() {
    let backend = MemoryBackend::new("mem0");
    let ctx = Context::background();
    put(&backend, "A", 1, "x").unwrap();

    backend.destroy(&ctx).unwrap();
    assert!(backend.is_empty());
    assert!(matches!(backend.destroy(&ctx), Err(StoreError::ShardClosed(_))));
}

// =============================================================================
// Catalog Tests
// =============================================================================

#[test]
fn test_catalog_opens_file_tables() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder()
        .data_dir(temp.path())
        .backend(BackendKind::File)
        .tables(["cell", "audit"])
        .shard_count(3)
        .build();

    let ctx = Context::background();
    {
        let catalog = Catalog::open(&config).unwrap();
        assert_eq!(catalog.tables(), vec!["audit".to_string(), "cell".to_string()]);

        let store = catalog.get("cell").unwrap();
        assert_eq!(store.shard_count().unwrap(), 3);
        store.put(&ctx, "A", "BASE", 1, Cell::with_body("x")).unwrap();
        catalog.destroy_all(&ctx).unwrap();
    }

    assert!(temp.path().join("cell").join("shard0.wal").exists());
    assert!(temp.path().join("audit").join("shard2.wal").exists());

    let catalog = Catalog::open(&config).unwrap();
    let cell = catalog
        .get("cell")
        .unwrap()
        .get(&ctx, "A", "BASE", 1)
        .unwrap()
        .unwrap();
    assert_eq!(cell.body, "x");
    assert!(catalog
        .get("audit")
        .unwrap()
        .get(&ctx, "A", "BASE", 1)
        .unwrap()
        .is_none());
}

#[test]
fn test_catalog_unknown_table() {
    let config = Config::builder().backend(BackendKind::Memory).build();
    let catalog = Catalog::open(&config).unwrap();
    assert!(matches!(catalog.get("nope"), Err(StoreError::UnknownTable(_))));
}

#[test]
fn test_config_validation() {
    let zero = Config::builder().shard_count(0).build();
    assert!(matches!(zero.validate(), Err(StoreError::InvalidConfiguration(_))));

    let dup = Config::builder().tables(["a", "a"]).build();
    assert!(matches!(Catalog::open(&dup), Err(StoreError::InvalidConfiguration(_))));

    assert_eq!("memory".parse::<BackendKind>().unwrap(), BackendKind::Memory);
    assert!("sql".parse::<BackendKind>().is_err());
}
