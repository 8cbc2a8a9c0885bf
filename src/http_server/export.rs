//! # CSV Export
//!
//! Renders active tasks as a two-column CSV and writes it to the export
//! directory (the user's downloads folder unless configured).

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use crate::store::Record;

/// File name of the export, also used in `Content-Disposition`
pub const EXPORT_FILE_NAME: &str = "tasks.csv";

/// Column headers, in order, with the record field each one reads
const COLUMNS: [(&str, &str); 2] = [("title", "Título"), ("description", "Descrição")];

/// Render `tasks` as CSV with a header row.
///
/// Missing or non-string fields become empty cells.
pub fn render_csv(tasks: &[Record]) -> String {
    let mut out = String::new();

    let header: Vec<_> = COLUMNS.iter().map(|(_, title)| escape_field(title)).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for task in tasks {
        let row: Vec<_> = COLUMNS
            .iter()
            .map(|(field, _)| escape_field(task.get_str(field).unwrap_or("")))
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }

    out
}

/// Quote a field if it contains a delimiter, quote, or line break
fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Write `csv` to `<dir>/tasks.csv`, replacing any previous export
pub async fn write_export(dir: &Path, csv: &str) -> io::Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(EXPORT_FILE_NAME);
    tokio::fs::write(&path, csv.as_bytes()).await?;
    Ok(path)
}

/// The user's download directory, `~/Downloads`, or the working directory
pub fn default_export_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn task(value: serde_json::Value) -> Record {
        Record::try_from(value).unwrap()
    }

    #[test]
    fn test_header_and_rows() {
        let csv = render_csv(&[
            task(json!({"id": "1", "title": "Buy milk", "description": "2 liters"})),
            task(json!({"id": "2", "title": "Walk dog"})),
        ]);

        assert_eq!(
            csv,
            "Título,Descrição\nBuy milk,2 liters\nWalk dog,\n"
        );
    }

    #[test]
    fn test_quoting() {
        let csv = render_csv(&[task(json!({
            "id": "1",
            "title": "a, b",
            "description": "say \"hi\"\nthen leave"
        }))]);

        let body = csv.lines().skip(1).collect::<Vec<_>>().join("\n");
        assert_eq!(body, "\"a, b\",\"say \"\"hi\"\"\nthen leave\"");
    }

    #[test]
    fn test_escape_borrows_plain_values() {
        assert!(matches!(escape_field("plain"), Cow::Borrowed(_)));
    }

    #[tokio::test]
    async fn test_write_export_overwrites() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("downloads");

        write_export(&dir, "first\n").await.unwrap();
        let path = write_export(&dir, "second\n").await.unwrap();

        assert_eq!(path, dir.join(EXPORT_FILE_NAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "second\n");
    }
}
