use myvoice_core::db::open_db;
use myvoice_core::{
    CoreConfig, Drawing, DrawingStore, MemoryKeyValueStore, Point, SqliteKeyValueStore,
    StrokePath,
};

fn sample() -> Vec<StrokePath> {
    vec![
        StrokePath::pen(vec![Point::new(1.0, 1.0), Point::new(2.5, 3.0)], "#2563eb", 5.0),
        StrokePath::eraser(vec![Point::new(2.0, 2.0)], 30.0),
    ]
}

#[tokio::test]
async fn save_then_load_returns_same_paths() {
    let store = DrawingStore::from_config(MemoryKeyValueStore::new(), &CoreConfig::default());

    store.save_drawing(&sample()).await;
    assert_eq!(store.get_saved_drawing().await, Some(Drawing::from(sample())));
}

#[tokio::test]
async fn empty_save_is_distinct_from_never_saved() {
    let store = DrawingStore::new(MemoryKeyValueStore::new(), "sketch");
    assert_eq!(store.get_saved_drawing().await, None);

    store.save_drawing(&[]).await;
    assert_eq!(store.get_saved_drawing().await, Some(Drawing::new()));
}

#[tokio::test]
async fn later_save_overwrites_earlier_one() {
    let store = DrawingStore::new(MemoryKeyValueStore::new(), "sketch");
    store.save_drawing(&sample()).await;
    store.save_drawing(&sample()[..1]).await;

    let loaded = store.get_saved_drawing().await.unwrap();
    assert_eq!(loaded.len(), 1);
}

#[tokio::test]
async fn read_failure_looks_like_nothing_saved() {
    let kv = MemoryKeyValueStore::new();
    let store = DrawingStore::new(&kv, "sketch");
    store.save_drawing(&sample()).await;

    kv.set_fail_reads(true);
    assert_eq!(store.get_saved_drawing().await, None);
}

#[tokio::test]
async fn sqlite_store_keeps_drawing_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sketch.db");

    {
        let store = DrawingStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()), "sketch");
        store.save_drawing(&sample()).await;
    }

    let store = DrawingStore::new(SqliteKeyValueStore::new(open_db(&path).unwrap()), "sketch");
    assert_eq!(store.get_saved_drawing().await, Some(Drawing::from(sample())));
}
