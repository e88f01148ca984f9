use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// The filtered rows as a CSV document: one header line of field labels,
/// then one line per row. Fields containing a comma, quote or newline are
/// quoted, with embedded quotes doubled.
pub fn csv_document(header: &[String], rows: &[Vec<String>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(join_csv_row(header));
    for row in rows {
        lines.push(join_csv_row(row));
    }
    lines.join("\n")
}

fn join_csv_row(row: &[String]) -> String {
    row.iter()
        .map(|value| csv_escape(value))
        .collect::<Vec<_>>()
        .join(",")
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// The filtered rows as pretty-printed JSON: an array of label-keyed objects.
pub fn json_document(header: &[String], rows: &[Vec<String>]) -> String {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            for (label, value) in header.iter().zip(row) {
                record.insert(label.clone(), Value::String(value.clone()));
            }
            Value::Object(record)
        })
        .collect();
    // Infallible for string-only values.
    serde_json::to_string_pretty(&records).unwrap_or_else(|_| "[]".to_string())
}

/// Write an export atomically: temp file in the target directory, then rename
/// over any previous export of the same name.
pub fn write_export(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, ExportError> {
    ensure_output_dir(dir)?;

    let target = dir.join(file_name);
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if target.exists() {
        fs::remove_file(&target)?;
    }
    tmp.persist(&target).map_err(|e| ExportError::Io(e.error))?;
    Ok(target)
}

fn ensure_output_dir(dir: &Path) -> Result<(), ExportError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| ExportError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(ExportError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| ExportError::OutputDir(e.to_string()))?;
    }
    Ok(())
}
