//! Field definitions: ordered columns, each with an ordered list of path
//! alternatives covering the schema generations the field has lived through.
//!
//! The merged table (fixed defaults + caller-supplied fields) is built in
//! exactly one place (`FieldTable::with_extra`) and shared by header
//! construction and row extraction, so the two can never disagree on
//! column order.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FieldSpecError {
    #[error("cannot read field spec file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid field spec JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field {column:?} has no path expressions")]
    EmptyPaths { column: String },
}

/// One logical column: a human-readable name and the path alternatives
/// tried in order (first structural match wins).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDef {
    pub column: String,
    pub paths: Vec<String>,
}

impl FieldDef {
    pub fn new(column: &str, paths: &[&str]) -> Self {
        Self {
            column: column.to_string(),
            paths: paths.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// On-disk form: paths may be a JSON array or a single pipe-delimited
/// string (`"/a/b|/a/c"`), matching the way field tables are usually
/// written by hand.
#[derive(Deserialize)]
struct FieldDefFile {
    column: String,
    paths: PathsSpec,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PathsSpec {
    Joined(String),
    List(Vec<String>),
}

impl PathsSpec {
    fn into_paths(self) -> Vec<String> {
        let raw = match self {
            PathsSpec::Joined(s) => vec![s],
            PathsSpec::List(v) => v,
        };
        raw.iter()
            .flat_map(|s| s.split('|'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl<'de> Deserialize<'de> for FieldDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let file = FieldDefFile::deserialize(deserializer)?;
        Ok(FieldDef {
            column: file.column,
            paths: file.paths.into_paths(),
        })
    }
}

/// Ordered set of fields driving both the CSV header and per-document
/// extraction. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<FieldDef>,
}

impl FieldTable {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// The single merge point: fixed fields first, extras appended in
    /// their given order.
    pub fn with_extra(mut self, extra: Vec<FieldDef>) -> Self {
        self.fields.extend(extra);
        self
    }

    pub fn header(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.column.clone()).collect()
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Load caller-supplied fields from a JSON file: an ordered array of
/// `{"column": ..., "paths": ...}` objects.
pub fn load_fields(path: &Path) -> Result<Vec<FieldDef>, FieldSpecError> {
    let content = std::fs::read_to_string(path)?;
    let fields: Vec<FieldDef> = serde_json::from_str(&content)?;
    for field in &fields {
        if field.paths.is_empty() {
            return Err(FieldSpecError::EmptyPaths {
                column: field.column.clone(),
            });
        }
    }
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_fixed_fields_first() {
        let table = FieldTable::new(vec![FieldDef::new("EIN", &["/Return/a"])])
            .with_extra(vec![FieldDef::new("Assets", &["/Return/b"])]);

        assert_eq!(table.header(), vec!["EIN", "Assets"]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn paths_split_on_pipe() {
        let json = r#"[{"column": "Tax Year", "paths": "/Return/ReturnHeader/TaxYr|/Return/ReturnHeader/TaxYear"}]"#;
        let fields: Vec<FieldDef> = serde_json::from_str(json).unwrap();

        assert_eq!(fields[0].paths.len(), 2);
        assert_eq!(fields[0].paths[1], "/Return/ReturnHeader/TaxYear");
    }

    #[test]
    fn paths_accept_json_array() {
        let json = r#"[{"column": "X", "paths": ["/a", "/b"]}]"#;
        let fields: Vec<FieldDef> = serde_json::from_str(json).unwrap();
        assert_eq!(fields[0].paths, vec!["/a", "/b"]);
    }

    #[test]
    fn load_fields_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(
            &path,
            r#"[
                {"column": "B", "paths": "/r/b"},
                {"column": "A", "paths": "/r/a"}
            ]"#,
        )
        .unwrap();

        let fields = load_fields(&path).unwrap();
        assert_eq!(fields[0].column, "B");
        assert_eq!(fields[1].column, "A");
    }

    #[test]
    fn load_fields_rejects_empty_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, r#"[{"column": "X", "paths": " | "}]"#).unwrap();

        let err = load_fields(&path).unwrap_err();
        assert!(matches!(err, FieldSpecError::EmptyPaths { .. }));
    }

    #[test]
    fn load_fields_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(
            load_fields(&path),
            Err(FieldSpecError::Json(_))
        ));
    }
}
