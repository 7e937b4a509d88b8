//! Retrieval and field extraction for IRS Form 990 e-file XML returns.
//!
//! Pipeline: resolve an EIN against the pre-downloaded bulk index files,
//! fetch each listed return into a permanent local cache, extract a fixed
//! column set by trying an ordered list of path alternatives per logical
//! field (schema tag names changed across filing years), and assemble the
//! rows into a CSV report.

pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod fields;
pub mod index;
pub mod report;
pub mod xml;

pub use error::ReportError;
pub use fetch::{DocumentSource, Fetcher, HttpSource};
pub use fields::{load_fields, FieldDef, FieldTable};
pub use index::{resolve, FilingRef};
pub use report::{build_report, write_csv, Report};
