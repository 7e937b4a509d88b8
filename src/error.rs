//! Top-level error type for a report run.
//!
//! Per-document fetch and extract failures never reach this type — they
//! are contained (logged and skipped) inside the report assembler. What
//! escalates here: precondition violations before any work begins, the
//! aggregate-empty guard, and I/O failures writing the output itself.

use std::path::PathBuf;

use thiserror::Error;

use crate::fields::FieldSpecError;
use crate::index::IndexError;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cache directory not found: {}", .0.display())]
    MissingCacheDir(PathBuf),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    FieldSpec(#[from] FieldSpecError),

    #[error("no data found for any requested organization")]
    NoData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
