//! # Document File I/O
//!
//! Whole-document reads and crash-safe whole-document writes.
//!
//! Write protocol:
//! 1. Write the full document to `<path>.tmp`
//! 2. fsync the temp file
//! 3. Rename temp over the target (atomic on POSIX)
//! 4. fsync the parent directory so the rename is durable
//!
//! A crash at any step leaves either the previous document or the new one.
//! A failed write removes its temp file.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::errors::{StoreError, StoreResult};

/// Read the document bytes, or `None` if the file does not exist
pub(crate) fn read_document(path: &Path) -> StoreResult<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Atomically replace the document at `path` with `bytes`
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let temp = sibling(path, ".tmp");

    if let Err(e) = write_temp(&temp, bytes).and_then(|()| {
        fs::rename(&temp, path).map_err(|e| StoreError::io(path, e))
    }) {
        let _ = fs::remove_file(&temp);
        return Err(e);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

fn write_temp(temp: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp)
        .map_err(|e| StoreError::io(temp, e))?;

    file.write_all(bytes).map_err(|e| StoreError::io(temp, e))?;
    file.sync_all().map_err(|e| StoreError::io(temp, e))
}

/// Move an unreadable document out of the way, returning where it went.
///
/// The name is `<path>.corrupt-<stamp>`; if that is taken, `-1`, `-2`, ...
/// is appended so an earlier copy is never overwritten.
pub(crate) fn quarantine(path: &Path, stamp: i64) -> StoreResult<PathBuf> {
    let base = format!(".corrupt-{}", stamp);
    let mut target = sibling(path, &base);
    let mut n = 0u32;
    while target.exists() {
        n += 1;
        target = sibling(path, &format!("{}-{}", base, n));
    }

    fs::rename(path, &target).map_err(|e| StoreError::io(path, e))?;
    Ok(target)
}

/// `path` with `suffix` appended to its file name
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("db.json"));
    name.push(suffix);
    path.with_file_name(name)
}
