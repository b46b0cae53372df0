use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{is_missing, load_table, Cleaning, LoadError, LoadReport, Table};

pub const TUMOR_COLUMNS: [&str; 2] = ["id", "diagnosis"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Diagnosis {
    #[serde(rename = "M")]
    Malignant,
    #[serde(rename = "B")]
    Benign,
}

impl Diagnosis {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "M" => Some(Diagnosis::Malignant),
            "B" => Some(Diagnosis::Benign),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Diagnosis::Malignant => "M",
            Diagnosis::Benign => "B",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Diagnosis::Malignant => "Malignant",
            Diagnosis::Benign => "Benign",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TumorRecord {
    pub id: String,
    pub diagnosis: Diagnosis,
    /// One value per entry of [`TumorTable::features`].
    pub values: Vec<f64>,
}

/// Tumor rows with their numeric feature columns. Never cleaned.
#[derive(Debug, Clone, Default)]
pub struct TumorTable {
    features: Vec<String>,
    records: Vec<TumorRecord>,
    report: LoadReport,
}

impl TumorTable {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let (table, report) = load_table(path, Cleaning::None)?;
        let mut out = Self::from_table(&table).map_err(|msg| LoadError::format(&report.path, msg))?;
        out.report = report;
        Ok(out)
    }

    /// Feature columns are every column besides `id`/`diagnosis` whose cells
    /// all parse as finite numbers, in file order.
    pub fn from_table(table: &Table) -> Result<Self, String> {
        let idx = table
            .require_columns(&TUMOR_COLUMNS)
            .map_err(|missing| format!("missing columns {:?}", missing))?;
        let (id, diagnosis) = (idx[0], idx[1]);

        let feature_idx: Vec<usize> = (0..table.columns().len())
            .filter(|j| *j != id && *j != diagnosis)
            .filter(|j| {
                table
                    .rows()
                    .iter()
                    .all(|row| parse_number(&row[*j]).is_some())
            })
            .collect();

        let mut records = Vec::with_capacity(table.len());
        for (i, row) in table.rows().iter().enumerate() {
            let diag = Diagnosis::parse(&row[diagnosis]).ok_or_else(|| {
                format!("row {}: unknown diagnosis {:?}", i + 1, row[diagnosis])
            })?;
            records.push(TumorRecord {
                id: row[id].trim().to_string(),
                diagnosis: diag,
                values: feature_idx
                    .iter()
                    .filter_map(|j| parse_number(&row[*j]))
                    .collect(),
            });
        }

        let features = feature_idx
            .iter()
            .map(|j| table.columns()[*j].clone())
            .collect();
        Ok(Self {
            features,
            records,
            report: LoadReport::default(),
        })
    }

    pub fn from_records(features: Vec<String>, records: Vec<TumorRecord>) -> Result<Self, String> {
        if let Some(bad) = records.iter().find(|r| r.values.len() != features.len()) {
            return Err(format!(
                "record {} has {} values, expected {}",
                bad.id,
                bad.values.len(),
                features.len()
            ));
        }
        Ok(Self {
            features,
            records,
            report: LoadReport::default(),
        })
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features.iter().position(|f| f == name)
    }

    pub fn records(&self) -> &[TumorRecord] {
        &self.records
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

fn parse_number(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
