//! Observability for taskdb
//!
//! Structured JSON-lines logging: one line per event, an event name in
//! SCREAMING_SNAKE_CASE, a severity, and string fields in sorted order.
//!
//! ```ignore
//! use taskdb::observability::Logger;
//!
//! Logger::info("DB_LOADED", &[("path", "db.json"), ("tables", "2")]);
//! ```

mod logger;

pub use logger::{Logger, Severity};

#[cfg(test)]
pub(crate) use logger::capture;
