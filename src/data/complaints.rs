use std::collections::HashSet;
use std::path::Path;

use super::{is_missing, load_table, Cleaning, LoadError, LoadReport, Table};

pub const COMPLAINT_COLUMNS: [&str; 3] = ["company", "state", "consumer_disputed?"];

/// Value of `consumer_disputed?` marking a formally disputed complaint.
pub const DISPUTED_MARKER: &str = "Yes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintRecord {
    pub company: String,
    /// Two-letter state code; empty when the source cell was missing.
    pub state: String,
    pub disputed: bool,
}

impl ComplaintRecord {
    pub fn new(company: &str, state: &str, disputed: bool) -> Self {
        Self {
            company: company.to_string(),
            state: state.to_string(),
            disputed,
        }
    }
}

/// Complaint rows in file order. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ComplaintTable {
    records: Vec<ComplaintRecord>,
    companies: Vec<String>,
    report: LoadReport,
}

impl ComplaintTable {
    pub fn load(path: &Path, cleaning: Cleaning) -> Result<Self, LoadError> {
        let (table, report) = load_table(path, cleaning)?;
        let mut out = Self::from_table(&table).map_err(|msg| LoadError::format(&report.path, msg))?;
        out.report = report;
        Ok(out)
    }

    pub fn from_table(table: &Table) -> Result<Self, String> {
        let idx = table
            .require_columns(&COMPLAINT_COLUMNS)
            .map_err(|missing| format!("missing columns {:?}", missing))?;
        let (company, state, disputed) = (idx[0], idx[1], idx[2]);

        let records = table
            .rows()
            .iter()
            .map(|row| ComplaintRecord {
                company: row[company].trim().to_string(),
                state: if is_missing(&row[state]) {
                    String::new()
                } else {
                    row[state].trim().to_string()
                },
                disputed: row[disputed].trim() == DISPUTED_MARKER,
            })
            .collect();
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ComplaintRecord>) -> Self {
        let mut seen = HashSet::new();
        let companies = records
            .iter()
            .filter(|r| !r.company.is_empty() && seen.insert(r.company.as_str()))
            .map(|r| r.company.clone())
            .collect();
        Self {
            records,
            companies,
            report: LoadReport::default(),
        }
    }

    pub fn records(&self) -> &[ComplaintRecord] {
        &self.records
    }

    /// Distinct company names in order of first appearance.
    pub fn companies(&self) -> &[String] {
        &self.companies
    }

    pub fn has_company(&self, company: &str) -> bool {
        self.companies.iter().any(|c| c == company)
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
