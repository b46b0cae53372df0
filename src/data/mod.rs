//! Dataset loading: CSV into an immutable in-memory table, with the optional
//! strict cleaning pass applied before any typed view is built.

pub mod complaints;
pub mod tumors;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::logging::log_dataset_loaded;

pub use complaints::{ComplaintRecord, ComplaintTable, COMPLAINT_COLUMNS};
pub use tumors::{Diagnosis, TumorRecord, TumorTable, TUMOR_COLUMNS};

/// Cell values read as missing, in addition to blank cells.
/// NA tokens recognised in a cell, matched exactly (no trimming, case-sensitive).
pub const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Empty cells and the exact NA tokens are missing; whitespace-only cells are values.
pub fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

#[derive(Debug)]
pub enum LoadError {
    /// File missing or unreadable.
    Io { path: String, source: std::io::Error },
    /// Malformed CSV or required columns absent.
    Format { path: String, msg: String },
}

impl LoadError {
    pub fn format(path: &str, msg: impl Into<String>) -> Self {
        LoadError::Format {
            path: path.to_string(),
            msg: msg.into(),
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => write!(f, "cannot read {}: {}", path, source),
            LoadError::Format { path, msg } => write!(f, "bad dataset {}: {}", path, msg),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Format { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cleaning {
    /// Keep the table exactly as read.
    None,
    /// Drop duplicate rows, then rows with a missing cell, then columns with a missing cell.
    Strict,
}

impl Cleaning {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "none" | "off" => Some(Cleaning::None),
            "strict" | "on" => Some(Cleaning::Strict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub path: String,
    pub hash_sha256: String,
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub rows_with_missing: usize,
    pub columns_dropped: Vec<String>,
    pub rows_kept: usize,
    pub columns_kept: usize,
}

/// Raw string table as read from CSV. Cells are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Rows must all have `columns.len()` cells.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, String> {
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(format!(
                "row {} has {} cells, expected {}",
                i + 1,
                row.len(),
                columns.len()
            ));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Indices of `names`, or the list of the ones that are absent.
    pub fn require_columns(&self, names: &[&str]) -> Result<Vec<usize>, Vec<String>> {
        let mut found = Vec::with_capacity(names.len());
        let mut missing = Vec::new();
        for name in names {
            match self.column_index(name) {
                Some(idx) => found.push(idx),
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(missing)
        }
    }

    /// Removes exact duplicate rows, keeping the first occurrence.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    /// Removes every row holding a missing cell.
    pub fn drop_missing_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|c| is_missing(c)));
        before - self.rows.len()
    }

    /// Removes every column holding a missing cell; returns the dropped names.
    pub fn drop_missing_columns(&mut self) -> Vec<String> {
        let keep: Vec<bool> = (0..self.columns.len())
            .map(|j| !self.rows.iter().any(|row| is_missing(&row[j])))
            .collect();
        if keep.iter().all(|k| *k) {
            return Vec::new();
        }

        let dropped = self
            .columns
            .iter()
            .zip(&keep)
            .filter(|(_, k)| !**k)
            .map(|(c, _)| c.clone())
            .collect();
        self.columns = retain_flagged(std::mem::take(&mut self.columns), &keep);
        for row in &mut self.rows {
            *row = retain_flagged(std::mem::take(row), &keep);
        }
        dropped
    }

    /// Applies the cleaning pass and fills the counters of `report`.
    pub fn clean(&mut self, cleaning: Cleaning, report: &mut LoadReport) {
        if cleaning == Cleaning::Strict {
            report.duplicates_removed = self.drop_duplicates();
            report.rows_with_missing = self.drop_missing_rows();
            report.columns_dropped = self.drop_missing_columns();
        }
        report.rows_kept = self.rows.len();
        report.columns_kept = self.columns.len();
    }
}

fn retain_flagged(values: Vec<String>, keep: &[bool]) -> Vec<String> {
    values
        .into_iter()
        .zip(keep)
        .filter(|(_, k)| **k)
        .map(|(v, _)| v)
        .collect()
}

/// Reads `path` as CSV with a header row and applies `cleaning`.
pub fn load_table(path: &Path, cleaning: Cleaning) -> Result<(Table, LoadReport), LoadError> {
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        path: display.clone(),
        source,
    })?;

    let mut table = parse_csv(&bytes).map_err(|msg| LoadError::format(&display, msg))?;
    let mut report = LoadReport {
        path: display,
        hash_sha256: sha256_hex(&bytes),
        rows_read: table.len(),
        ..LoadReport::default()
    };
    table.clean(cleaning, &mut report);

    log_dataset_loaded(
        &report.path,
        &report.hash_sha256,
        report.rows_read,
        report.rows_kept,
        report.columns_kept,
        &report.columns_dropped,
    );
    Ok((table, report))
}

/// Parses CSV bytes with a header row into a [`Table`].
pub fn parse_csv(bytes: &[u8]) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err("missing header".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Table::new(columns, rows)
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> Table {
        Table::new(
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn duplicates_keep_first_occurrence() {
        let mut t = table(&["a", "b"], &[&["1", "x"], &["2", "y"], &["1", "x"]]);
        assert_eq!(t.drop_duplicates(), 1);
        assert_eq!(t.rows(), &[vec!["1", "x"], vec!["2", "y"]]);
    }

    #[test]
    fn missing_markers_are_missing() {
        assert!(is_missing(""));
        assert!(is_missing("NaN"));
        assert!(is_missing("N/A"));
        assert!(is_missing("#N/A N/A"));
        assert!(is_missing("-1.#IND"));
        assert!(is_missing("1.#QNAN"));
        assert!(!is_missing("  "));
        assert!(!is_missing(" NA "));
        assert!(!is_missing("na"));
        assert!(!is_missing("0"));
        assert!(!is_missing("No"));
    }

    #[test]
    fn strict_cleaning_runs_in_order() {
        let mut t = table(
            &["company", "state", "note"],
            &[
                &["Acme", "CA", "x"],
                &["Acme", "CA", "x"],
                &["Acme", "", "y"],
                &["Beta", "NY", "z"],
            ],
        );
        let mut report = LoadReport::default();
        t.clean(Cleaning::Strict, &mut report);
        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(report.rows_with_missing, 1);
        assert!(report.columns_dropped.is_empty());
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.columns_kept, 3);
    }

    #[test]
    fn columns_dropped_only_when_no_rows_survive_missing() {
        // Row pass removes every row with a gap, so only an empty table can
        // still show gaps to the column pass.
        let mut t = table(&["a", "b"], &[&["1", ""]]);
        let mut report = LoadReport::default();
        t.clean(Cleaning::Strict, &mut report);
        assert_eq!(report.rows_kept, 0);
        assert!(report.columns_dropped.is_empty());

        let mut t = table(&["a", "b"], &[&["1", ""], &["2", "3"]]);
        assert_eq!(t.drop_missing_columns(), vec!["b".to_string()]);
        assert_eq!(t.columns(), &["a".to_string()]);
        assert_eq!(t.rows(), &[vec!["1"], vec!["2"]]);
    }

    #[test]
    fn cleaning_none_keeps_everything() {
        let mut t = table(&["a"], &[&["1"], &["1"], &[""]]);
        let mut report = LoadReport::default();
        t.clean(Cleaning::None, &mut report);
        assert_eq!(report.rows_kept, 3);
        assert_eq!(report.duplicates_removed, 0);
    }

    #[test]
    fn parse_csv_handles_quoted_commas() {
        let t = parse_csv(b"company,state,narrative\nAcme,CA,\"late, again\"\n").unwrap();
        assert_eq!(t.rows()[0][2], "late, again");
    }

    #[test]
    fn parse_csv_rejects_ragged_rows() {
        assert!(parse_csv(b"a,b\n1,2,3\n").is_err());
    }

    #[test]
    fn require_columns_lists_missing() {
        let t = table(&["company", "state"], &[]);
        assert_eq!(
            t.require_columns(&["company", "consumer_disputed?"]),
            Err(vec!["consumer_disputed?".to_string()])
        );
    }
}
