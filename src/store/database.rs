//! # Database
//!
//! In-memory table document with whole-file JSON persistence.
//!
//! Every mutation runs as a spawned task that owns the document lock for
//! the full read-modify-persist sequence. Dropping the caller's future does
//! not cancel an in-flight write. Changes are applied to a copy of the
//! document and installed only once the copy is on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::criteria::SearchCriteria;
use super::errors::{StoreError, StoreResult};
use super::file;
use super::record::Record;
use crate::observability::Logger;

/// Table name to ordered records
pub type Document = BTreeMap<String, Vec<Record>>;

/// What to do when the backing document exists but cannot be loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Move the bad file aside and start from an empty document
    #[default]
    Reset,
    /// Refuse to open
    Fail,
}

/// Result of applying a mutation to the working copy
enum Outcome<T> {
    /// The copy changed and must be persisted
    Changed(T),
    /// Nothing matched; skip the write
    Unchanged(T),
}

/// JSON-document-backed record store.
///
/// Cheap to clone; clones share the same document and file.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
    document: Arc<Mutex<Document>>,
}

impl Database {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty document that is persisted before
    /// returning. An unreadable file is handled per `policy`.
    pub async fn open(path: impl Into<PathBuf>, policy: CorruptPolicy) -> StoreResult<Self> {
        let path = path.into();
        let load_path = path.clone();
        let document = tokio::task::spawn_blocking(move || load_document(&load_path, policy))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        Ok(Self {
            path: Arc::new(path),
            document: Arc::new(Mutex::new(document)),
        })
    }

    /// Path of the backing document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records of `table`, optionally filtered.
    ///
    /// Returns a fresh copy; an unknown table yields an empty list.
    pub async fn select(&self, table: &str, criteria: Option<&SearchCriteria>) -> Vec<Record> {
        let document = self.document.lock().await;
        document
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| criteria.map_or(true, |c| c.matches(row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First record of `table` whose `id` equals `id` exactly
    pub async fn find(&self, table: &str, id: &str) -> Option<Record> {
        let document = self.document.lock().await;
        document
            .get(table)
            .and_then(|rows| rows.iter().find(|row| row.id() == Some(id)))
            .cloned()
    }

    /// Append `record` to `table`, creating the table if needed.
    ///
    /// The caller supplies the id; nothing is defaulted.
    pub async fn insert(&self, table: &str, record: Record) -> StoreResult<Record> {
        let table = table.to_string();
        self.mutate("insert", move |document| {
            document.entry(table).or_default().push(record.clone());
            Outcome::Changed(record)
        })
        .await
    }

    /// Replace the first record with this `id` by `{id, ...record}`.
    ///
    /// Any `id` inside `record` is ignored. Returns `false` (and writes
    /// nothing) if no record matched.
    pub async fn update(&self, table: &str, id: &str, record: Record) -> StoreResult<bool> {
        let table = table.to_string();
        let id = id.to_string();
        self.mutate("update", move |document| {
            match position(document, &table, &id) {
                Some(index) => {
                    if let Some(rows) = document.get_mut(&table) {
                        rows[index] = record.rekeyed(&id);
                    }
                    Outcome::Changed(true)
                }
                None => Outcome::Unchanged(false),
            }
        })
        .await
    }

    /// Remove the first record with this `id`.
    ///
    /// Returns `false` (and writes nothing) if no record matched.
    pub async fn delete(&self, table: &str, id: &str) -> StoreResult<bool> {
        let table = table.to_string();
        let id = id.to_string();
        self.mutate("delete", move |document| {
            match position(document, &table, &id) {
                Some(index) => {
                    if let Some(rows) = document.get_mut(&table) {
                        rows.remove(index);
                    }
                    Outcome::Changed(true)
                }
                None => Outcome::Unchanged(false),
            }
        })
        .await
    }

    /// Move the record with this `id` from one table to another.
    ///
    /// `patch` is applied to the record before it is appended to `to`.
    /// Both tables change in a single persist. Returns the moved record, or
    /// `None` if `from` has no such record.
    pub async fn move_record<F>(
        &self,
        from: &str,
        to: &str,
        id: &str,
        patch: F,
    ) -> StoreResult<Option<Record>>
    where
        F: FnOnce(&mut Record) + Send + 'static,
    {
        let from = from.to_string();
        let to = to.to_string();
        let id = id.to_string();
        self.mutate("move", move |document| {
            let Some(index) = position(document, &from, &id) else {
                return Outcome::Unchanged(None);
            };
            let Some(mut record) = document.get_mut(&from).map(|rows| rows.remove(index)) else {
                return Outcome::Unchanged(None);
            };
            patch(&mut record);
            document.entry(to).or_default().push(record.clone());
            Outcome::Changed(Some(record))
        })
        .await
    }

    /// Record count per table
    pub async fn table_counts(&self) -> BTreeMap<String, usize> {
        let document = self.document.lock().await;
        document
            .iter()
            .map(|(name, rows)| (name.clone(), rows.len()))
            .collect()
    }

    /// Run `apply` against a copy of the document, persist, then install.
    async fn mutate<T, F>(&self, op: &'static str, apply: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Document) -> Outcome<T> + Send + 'static,
    {
        let document = Arc::clone(&self.document);
        let path = Arc::clone(&self.path);

        let task = tokio::spawn(async move {
            let mut current = document.lock_owned().await;
            let mut next = current.clone();

            let value = match apply(&mut next) {
                Outcome::Changed(value) => value,
                Outcome::Unchanged(value) => return Ok(value),
            };

            if let Err(e) = persist(Arc::clone(&path), &next).await {
                Logger::error(
                    "DB_PERSIST_FAILED",
                    &[
                        ("error", e.to_string().as_str()),
                        ("op", op),
                        ("path", path.display().to_string().as_str()),
                    ],
                );
                return Err(e);
            }

            *current = next;
            Logger::debug("DB_PERSISTED", &[("op", op)]);
            Ok(value)
        });

        task.await.map_err(|e| StoreError::Task(e.to_string()))?
    }
}

fn position(document: &Document, table: &str, id: &str) -> Option<usize> {
    document
        .get(table)?
        .iter()
        .position(|row| row.id() == Some(id))
}

fn encode(document: &Document) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(document)?)
}

async fn persist(path: Arc<PathBuf>, document: &Document) -> StoreResult<()> {
    let bytes = encode(document)?;
    tokio::task::spawn_blocking(move || file::write_atomic(&path, &bytes))
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
}

/// Startup load; runs on a blocking thread.
fn load_document(path: &Path, policy: CorruptPolicy) -> StoreResult<Document> {
    let path_str = path.display().to_string();

    let failure = match file::read_document(path) {
        Ok(Some(bytes)) => match serde_json::from_slice::<Document>(&bytes) {
            Ok(document) => {
                let tables = document.len().to_string();
                Logger::info("DB_LOADED", &[("path", path_str.as_str()), ("tables", tables.as_str())]);
                return Ok(document);
            }
            Err(e) => StoreError::Corrupt {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        },
        Ok(None) => {
            let document = Document::new();
            file::write_atomic(path, &encode(&document)?)?;
            Logger::info("DB_INITIALIZED", &[("path", path_str.as_str())]);
            return Ok(document);
        }
        Err(e) => e,
    };

    match policy {
        CorruptPolicy::Fail => Err(failure),
        CorruptPolicy::Reset => {
            let moved = file::quarantine(path, chrono::Utc::now().timestamp_millis())?;
            Logger::warn(
                "DB_CORRUPT_RESET",
                &[
                    ("error", failure.to_string().as_str()),
                    ("moved_to", moved.display().to_string().as_str()),
                    ("path", path_str.as_str()),
                ],
            );
            let document = Document::new();
            file::write_atomic(path, &encode(&document)?)?;
            Ok(document)
        }
    }
}
