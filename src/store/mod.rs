//! # Record Store
//!
//! Table storage backed by a single pretty-printed JSON document.
//!
//! The whole document lives in memory and is rewritten to disk after every
//! mutation. Tables are named, ordered sequences of [`Record`]s; the store
//! knows nothing about what the records mean.
//!
//! # Guarantees
//!
//! - A mutation completes only after the new document is on disk.
//! - A failed persist leaves both memory and disk at the previous document.
//! - Mutations are serialized by a single lock held across read-modify-persist.
//! - `select` and `find` never mutate state.

mod criteria;
mod database;
mod errors;
mod file;
mod record;

pub use criteria::SearchCriteria;
pub use database::{CorruptPolicy, Database, Document};
pub use errors::{StoreError, StoreResult};
pub use record::Record;
