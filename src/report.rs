//! Report Assembler: drives the whole pipeline per EIN —
//! RESOLVE → (per filing) FETCH → EXTRACT → ACCUMULATE-OR-SKIP —
//! then writes the accumulated table as CSV.
//!
//! Fetch and extract failures are contained here: logged, the document
//! skipped, the run continued. Only two conditions escalate — a missing
//! cache directory before any work begins, and zero rows accumulated
//! across all identifiers (nothing to write, so no output file at all).

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ReportError;
use crate::extract;
use crate::fetch::Fetcher;
use crate::fields::FieldTable;
use crate::index;

/// Assembled tabular output. Header length equals every row's length by
/// construction: both come from the same `FieldTable`.
#[derive(Debug)]
pub struct Report {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Build the report for one or more EINs. Fails with `NoData` if no
/// document across all identifiers produced a row.
pub fn build_report(
    cache_root: &Path,
    eins: &[String],
    table: &FieldTable,
    fetcher: &Fetcher,
) -> Result<Report, ReportError> {
    if !cache_root.is_dir() {
        return Err(ReportError::MissingCacheDir(cache_root.to_path_buf()));
    }

    let mut rows = Vec::new();
    for ein in eins {
        let ein = ein.as_str();
        let filings = index::resolve(cache_root, ein)?;
        tracing::info!(ein, filings = filings.len(), "processing organization");

        for filing in &filings {
            let path = match fetcher.fetch(cache_root, ein, &filing.object_id) {
                Ok(path) => path,
                Err(e) => {
                    tracing::warn!(
                        ein,
                        object_id = %filing.object_id,
                        error = %e,
                        "fetch failed, document skipped"
                    );
                    continue;
                }
            };

            match extract::extract(&path, table) {
                Ok(row) => rows.push(row),
                Err(e) => {
                    tracing::warn!(
                        ein,
                        object_id = %filing.object_id,
                        error = %e,
                        "extraction failed, document skipped"
                    );
                }
            }
        }
    }

    if rows.is_empty() {
        return Err(ReportError::NoData);
    }

    Ok(Report {
        header: table.header(),
        rows,
    })
}

/// Write the report as CSV: header row first, then one line per row.
/// Fields containing the delimiter, quotes, or line breaks are quoted with
/// inner quotes doubled.
pub fn write_csv(report: &Report, path: &Path) -> Result<(), ReportError> {
    let file = fs::File::create(path)?;
    let mut out = BufWriter::new(file);

    write_row(&mut out, &report.header)?;
    for row in &report.rows {
        write_row(&mut out, row)?;
    }
    out.flush()?;
    Ok(())
}

fn write_row<W: Write>(out: &mut W, row: &[String]) -> std::io::Result<()> {
    for (i, value) in row.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(csv_escape(value).as_bytes())?;
    }
    out.write_all(b"\r\n")
}

fn csv_escape(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
