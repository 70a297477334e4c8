//! File-backed persistence against a temporary directory.

use lmc_graph::{
    Camera, CanvasStore, ExportOptions, ImportOptions, NodeChange, Position, RootNodeOptions,
};
use lmc_persistence::{
    restore_view, save_view, FilePersistence, PersistenceAdapter, PersistenceConfig,
};
use pretty_assertions::assert_eq;

fn store() -> CanvasStore {
    let store = CanvasStore::new();
    store.create_root_node(RootNodeOptions::new().with_id("a"));
    store.create_root_node(
        RootNodeOptions::new()
            .with_id("b")
            .with_position(Position::new(10.0, 20.0)),
    );
    store
}

#[tokio::test]
async fn snapshot_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path().join("views"));
    let source = store();
    source.set_camera(Some(Camera::new(5.0, 6.0, 0.8)));

    let saved = save_view(&persistence, &source, "main").await.unwrap();
    let loaded = persistence.load("main").await.unwrap().unwrap();
    assert_eq!(loaded, saved);

    let target = store();
    target.apply_node_changes(&[NodeChange::moved("b", Position::new(0.0, 0.0))]);
    assert!(restore_view(&persistence, &target, "main", ImportOptions::default())
        .await
        .unwrap());

    assert_eq!(target.get_node("b").unwrap().position, Position::new(10.0, 20.0));
    assert_eq!(target.camera(), Some(Camera::new(5.0, 6.0, 0.8)));
}

#[tokio::test]
async fn missing_and_corrupt_files_load_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path());

    assert!(persistence.load("nothing").await.unwrap().is_none());

    std::fs::write(persistence.path_for("broken"), "{ not json").unwrap();
    assert!(persistence.load("broken").await.unwrap().is_none());

    std::fs::write(
        persistence.path_for("future"),
        r#"{"version": 2, "savedAt": "2024-01-01T00:00:00Z", "nodes": {}}"#,
    )
    .unwrap();
    assert!(persistence.load("future").await.unwrap().is_none());
}

#[tokio::test]
async fn clear_removes_file_and_tolerates_absence() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path()).with_config(PersistenceConfig {
        key_prefix: "canvas-".into(),
    });
    let snapshot = store().export_view_snapshot(ExportOptions::default());

    persistence.save("x", &snapshot).await.unwrap();
    assert!(persistence.path_for("x").exists());
    assert!(persistence.path_for("x").ends_with("canvas-x.json"));

    persistence.clear("x").await.unwrap();
    assert!(!persistence.path_for("x").exists());
    persistence.clear("x").await.unwrap();

    let restored = restore_view(&persistence, &store(), "x", ImportOptions::default())
        .await
        .unwrap();
    assert!(!restored);
}

#[tokio::test]
async fn keys_differing_only_in_punctuation_stay_apart() {
    let dir = tempfile::tempdir().unwrap();
    let persistence = FilePersistence::new(dir.path());

    let spaced = CanvasStore::new();
    spaced.create_root_node(RootNodeOptions::new().with_id("only-in-a-b"));
    save_view(&persistence, &spaced, "a b").await.unwrap();

    assert!(persistence.load("a_b").await.unwrap().is_none());
    assert_ne!(persistence.path_for("a b"), persistence.path_for("a_b"));

    let loaded = persistence.load("a b").await.unwrap().unwrap();
    assert!(loaded.node("only-in-a-b").is_some());
}
