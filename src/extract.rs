//! Field Extractor: parse one cached return once, then evaluate each
//! field's path alternatives in order — first structural match wins.
//!
//! A field whose alternatives all miss is an empty value, never an error:
//! absence is expected for schema-version-specific fields (tags introduced
//! in 2013, 990-EZ-only amounts, and so on). Only a document-level parse
//! failure fails the extraction, and then the whole row is skipped by the
//! caller rather than emitted partially.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fields::FieldTable;
use crate::xml::{self, PathOutcome};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unreadable return file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed return XML in {}{}: {message}", .path.display(), field_context(.field))]
    Parse {
        path: PathBuf,
        /// Column being evaluated when the failure surfaced, if any.
        field: Option<String>,
        message: String,
    },
}

fn field_context(field: &Option<String>) -> String {
    match field {
        Some(column) => format!(" (while evaluating {column:?})"),
        None => String::new(),
    }
}

/// Extract one value per field in `table` order from the document at
/// `path`. The result always has exactly `table.len()` values.
pub fn extract(path: &Path, table: &FieldTable) -> Result<Vec<String>, ExtractError> {
    let content = std::fs::read_to_string(path).map_err(|source| ExtractError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let root = xml::parse(&content).map_err(|e| ExtractError::Parse {
        path: path.to_path_buf(),
        field: None,
        message: e.to_string(),
    })?;

    let mut row = Vec::with_capacity(table.len());
    for field in table.fields() {
        let mut value = String::new();
        for expr in &field.paths {
            match xml::evaluate(&root, expr) {
                PathOutcome::Match(text) => {
                    value = text;
                    break;
                }
                PathOutcome::NoMatch => {}
                PathOutcome::Invalid => {
                    tracing::debug!(
                        column = %field.column,
                        expr,
                        "malformed path expression treated as no match"
                    );
                }
            }
        }
        row.push(value);
    }
    Ok(row)
}
