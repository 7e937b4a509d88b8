//! Index Resolver: maps an EIN to the filings listed for it in the
//! pre-downloaded IRS bulk index files (`index_<year>.csv`).
//!
//! Resolution results are cached as `<dir>/<ein>.json` and served from that
//! cache on repeat runs without rescanning. The cache is write-once and
//! never invalidated here — newly downloaded index files are not picked up
//! until the entry is deleted externally. An empty result is deliberately
//! not cached, so a later run with more complete index files retries.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("index directory not found: {}", .0.display())]
    MissingDir(PathBuf),

    #[error("I/O error reading index: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt index cache entry: {0}")]
    Cache(#[from] serde_json::Error),
}

/// One filed return for an EIN, as listed in the bulk index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingRef {
    pub object_id: String,
    pub taxpayer_name: String,
}

/// Path of the cached resolution for one EIN.
pub fn cache_path(dir: &Path, ein: &str) -> PathBuf {
    dir.join(format!("{ein}.json"))
}

/// Resolve an EIN to its filings. Served from the per-EIN cache when
/// present; otherwise scans every bulk index file in `dir`, persisting the
/// result if at least one filing was found.
pub fn resolve(dir: &Path, ein: &str) -> Result<Vec<FilingRef>, IndexError> {
    if !dir.is_dir() {
        return Err(IndexError::MissingDir(dir.to_path_buf()));
    }

    let cache = cache_path(dir, ein);
    if cache.exists() {
        let content = fs::read(&cache)?;
        let refs: Vec<FilingRef> = serde_json::from_slice(&content)?;
        tracing::debug!(ein, count = refs.len(), "index cache hit");
        return Ok(refs);
    }

    let refs = scan_index_files(dir, ein)?;

    if !refs.is_empty() {
        fs::write(&cache, serde_json::to_vec(&refs)?)?;
        tracing::info!(ein, count = refs.len(), "resolved from bulk index");
    } else {
        tracing::warn!(ein, "no filings found in bulk index");
    }

    Ok(refs)
}

/// Scan every `index_*.csv` in `dir` for rows whose EIN column matches.
/// Files are visited in name order; row order within a file is preserved.
/// Malformed rows and files without the expected header are skipped.
fn scan_index_files(dir: &Path, ein: &str) -> Result<Vec<FilingRef>, IndexError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| {
                    n.starts_with(config::INDEX_PREFIX) && n.ends_with(config::INDEX_EXT)
                })
        })
        .collect();
    files.sort();

    let mut refs = Vec::new();
    for file in &files {
        scan_one_file(file, ein, &mut refs)?;
    }
    Ok(refs)
}

fn scan_one_file(file: &Path, ein: &str, refs: &mut Vec<FilingRef>) -> Result<(), IndexError> {
    let reader = BufReader::new(fs::File::open(file)?);
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => split_csv_line(&line?),
        None => return Ok(()),
    };
    let Some(cols) = IndexColumns::from_header(&header) else {
        tracing::warn!(file = %file.display(), "index file missing expected columns, skipped");
        return Ok(());
    };

    for line in lines {
        let line = line?;
        let row = split_csv_line(&line);
        // Best-effort: short rows are silently skipped.
        let (Some(row_ein), Some(object_id), Some(name)) = (
            row.get(cols.ein),
            row.get(cols.object_id),
            row.get(cols.taxpayer_name),
        ) else {
            continue;
        };
        if row_ein == ein {
            refs.push(FilingRef {
                object_id: object_id.clone(),
                taxpayer_name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Column positions resolved from an index file's header row.
struct IndexColumns {
    ein: usize,
    object_id: usize,
    taxpayer_name: usize,
}

impl IndexColumns {
    fn from_header(header: &[String]) -> Option<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Some(Self {
            ein: find("EIN")?,
            object_id: find("OBJECT_ID")?,
            taxpayer_name: find("TAXPAYER_NAME")?,
        })
    }
}

/// Split one CSV line, honoring double-quoted fields with doubled inner
/// quotes. Index rows never span lines.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
