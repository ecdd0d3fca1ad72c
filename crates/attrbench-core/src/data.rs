use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{BenchError, ErrorInfo};

/// Location of a two-dimensional numeric array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Rows written directly into the configuration.
    Inline(Vec<Vec<f64>>),
    /// Headered CSV file of numeric columns.
    Csv(PathBuf),
}

impl DataSource {
    /// Loads the rows, resolving relative CSV paths against `base_dir`.
    pub fn load(&self, base_dir: &Path) -> Result<Vec<Vec<f64>>, BenchError> {
        match self.resolved(base_dir) {
            DataSource::Inline(rows) => Ok(rows),
            DataSource::Csv(path) => read_csv_rows(&path),
        }
    }

    /// Same source with a relative CSV path joined onto `base_dir`.
    pub fn resolved(&self, base_dir: &Path) -> DataSource {
        match self {
            DataSource::Csv(path) if !path.is_absolute() => DataSource::Csv(base_dir.join(path)),
            other => other.clone(),
        }
    }
}

/// Reads a headered numeric CSV into row vectors.
pub fn read_csv_rows(path: &Path) -> Result<Vec<Vec<f64>>, BenchError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        BenchError::Io(
            ErrorInfo::new("csv-open", err.to_string()).with_context("path", path.display()),
        )
    })?;
    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|err| {
            BenchError::Serde(
                ErrorInfo::new("csv-record", err.to_string()).with_context("path", path.display()),
            )
        })?;
        let row = record
            .iter()
            .enumerate()
            .map(|(column, field)| {
                field.trim().parse::<f64>().map_err(|err| {
                    BenchError::Serde(
                        ErrorInfo::new("csv-number", err.to_string())
                            .with_context("path", path.display())
                            .with_context("row", line)
                            .with_context("column", column),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}
