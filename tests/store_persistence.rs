//! Record Store Persistence Tests
//!
//! Covers:
//! - Round-trip: insert then select by id, before and after a reopen
//! - Every mutation is on disk before it returns
//! - A mutation whose caller gives up still completes
//! - Missing document is created on open
//! - Unparseable document handling (reset vs fail)

use std::fs;
use std::time::Duration;

use serde_json::{json, Value};
use taskdb::store::{CorruptPolicy, Database, Record, SearchCriteria, StoreError};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn record(value: Value) -> Record {
    Record::try_from(value).expect("test records are objects")
}

async fn open(temp: &TempDir) -> Database {
    Database::open(temp.path().join("db.json"), CorruptPolicy::Fail)
        .await
        .expect("open database")
}

fn read_disk(temp: &TempDir) -> Value {
    let text = fs::read_to_string(temp.path().join("db.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

// =============================================================================
// Round-trip
// =============================================================================

#[tokio::test]
async fn test_insert_select_survives_restart() {
    let temp = TempDir::new().unwrap();
    let task = record(json!({
        "id": "6f1c",
        "title": "Buy milk",
        "description": "2 liters",
        "updated_at": null
    }));

    {
        let db = open(&temp).await;
        let stored = db.insert("tasks", task.clone()).await.unwrap();
        assert_eq!(stored, task);

        let by_id = SearchCriteria::new().field("id", "6f1c");
        assert_eq!(db.select("tasks", Some(&by_id)).await, vec![task.clone()]);
    }

    let reopened = open(&temp).await;
    let by_id = SearchCriteria::new().field("id", "6f1c");
    assert_eq!(reopened.select("tasks", Some(&by_id)).await, vec![task]);
}

#[tokio::test]
async fn test_mutations_visible_on_disk_immediately() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;

    db.insert("tasks", record(json!({"id": "1", "title": "a"})))
        .await
        .unwrap();
    assert_eq!(read_disk(&temp), json!({"tasks": [{"id": "1", "title": "a"}]}));

    db.update("tasks", "1", record(json!({"title": "b"})))
        .await
        .unwrap();
    assert_eq!(read_disk(&temp), json!({"tasks": [{"id": "1", "title": "b"}]}));

    db.delete("tasks", "1").await.unwrap();
    assert_eq!(read_disk(&temp), json!({"tasks": []}));
}

#[tokio::test]
async fn test_abandoned_insert_still_lands() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;

    // The caller stops waiting long before the write can finish
    let _ = tokio::time::timeout(
        Duration::from_nanos(1),
        db.insert("t", record(json!({"id": "x"}))),
    )
    .await;

    // Memory only changes after the write is on disk
    for _ in 0..200 {
        if !db.select("t", None).await.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(read_disk(&temp), json!({"t": [{"id": "x"}]}));
    drop(db);
    let reopened = open(&temp).await;
    assert_eq!(reopened.find("t", "x").await, Some(record(json!({"id": "x"}))));
}

#[tokio::test]
async fn test_select_returns_independent_copy() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("tasks", record(json!({"id": "1", "title": "a"})))
        .await
        .unwrap();

    let mut rows = db.select("tasks", None).await;
    rows[0].set("title", "changed");

    let again = db.select("tasks", None).await;
    assert_eq!(again[0].get_str("title"), Some("a"));
}

// =============================================================================
// Open / load
// =============================================================================

#[tokio::test]
async fn test_open_creates_missing_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/dir/db.json");

    let db = Database::open(&path, CorruptPolicy::Fail).await.unwrap();

    assert!(path.exists());
    assert!(db.select("tasks", None).await.is_empty());
}

#[tokio::test]
async fn test_open_existing_document() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("db.json"),
        r#"{"tasks": [{"id": "1", "title": "a"}], "completed": []}"#,
    )
    .unwrap();

    let db = open(&temp).await;

    assert_eq!(db.select("tasks", None).await.len(), 1);
    let counts = db.table_counts().await;
    assert_eq!(counts.get("completed"), Some(&0));
}

#[tokio::test]
async fn test_corrupt_document_fail_policy_refuses() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("db.json"), "{\"tasks\": [").unwrap();

    let err = Database::open(temp.path().join("db.json"), CorruptPolicy::Fail)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::Corrupt { .. }));
}

#[tokio::test]
async fn test_corrupt_document_reset_policy_preserves_bytes() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("db.json"), "{\"tasks\": [").unwrap();

    let db = Database::open(temp.path().join("db.json"), CorruptPolicy::Reset)
        .await
        .unwrap();

    assert!(db.select("tasks", None).await.is_empty());
    assert_eq!(read_disk(&temp), json!({}));

    let kept = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().starts_with("db.json.corrupt-"))
        .expect("corrupt document kept aside");
    assert_eq!(fs::read_to_string(kept.path()).unwrap(), "{\"tasks\": [");
}

// =============================================================================
// Mutation semantics
// =============================================================================

#[tokio::test]
async fn test_update_ignores_record_id() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("t", record(json!({"id": "1", "title": "old"})))
        .await
        .unwrap();

    db.update("t", "1", record(json!({"title": "X", "id": "999"})))
        .await
        .unwrap();

    let rows = db.select("t", None).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id(), Some("1"));
    assert_eq!(rows[0].get_str("title"), Some("X"));
}

#[tokio::test]
async fn test_update_replaces_whole_record() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("t", record(json!({"id": "1", "title": "a", "extra": "gone"})))
        .await
        .unwrap();

    db.update("t", "1", record(json!({"title": "b"})))
        .await
        .unwrap();

    assert_eq!(db.find("t", "1").await.unwrap().get("extra"), None);
}

#[tokio::test]
async fn test_delete_missing_leaves_table_unchanged() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("t", record(json!({"id": "1"}))).await.unwrap();
    let before = fs::read(temp.path().join("db.json")).unwrap();

    let removed = db.delete("t", "nope").await.unwrap();

    assert!(!removed);
    assert_eq!(db.select("t", None).await.len(), 1);
    assert_eq!(fs::read(temp.path().join("db.json")).unwrap(), before);
}

#[tokio::test]
async fn test_delete_removes_first_match_only() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("t", record(json!({"id": "dup", "n": "1"})))
        .await
        .unwrap();
    db.insert("t", record(json!({"id": "dup", "n": "2"})))
        .await
        .unwrap();

    db.delete("t", "dup").await.unwrap();

    let rows = db.select("t", None).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_str("n"), Some("2"));
}

#[tokio::test]
async fn test_select_or_across_fields() {
    let temp = TempDir::new().unwrap();
    let db = open(&temp).await;
    db.insert("t", record(json!({"id": "1", "title": "Buy milk"})))
        .await
        .unwrap();
    db.insert("t", record(json!({"id": "2", "title": "Walk dog"})))
        .await
        .unwrap();
    db.insert(
        "t",
        record(json!({"id": "3", "title": "Read", "description": "Book club"})),
    )
    .await
    .unwrap();

    let milk = SearchCriteria::new().field("title", "milk");
    let ids: Vec<_> = db
        .select("t", Some(&milk))
        .await
        .into_iter()
        .map(|r| r.id().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["1"]);

    let either = SearchCriteria::new()
        .field("title", "WALK")
        .field("description", "book");
    let ids: Vec<_> = db
        .select("t", Some(&either))
        .await
        .into_iter()
        .map(|r| r.id().unwrap().to_string())
        .collect();
    assert_eq!(ids, vec!["2", "3"]);
}
