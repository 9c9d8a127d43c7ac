use std::fmt;

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Layout revision of the instrument software's text report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChemStationFormat {
    /// Area in token 5 for 8-token rows, token 6 otherwise. No trailing lines skipped.
    #[default]
    Legacy,
    /// Area always in token 2; the line above the closing marker is a totals row.
    Revised,
}

impl ChemStationFormat {
    pub const ALL: [ChemStationFormat; 2] = [ChemStationFormat::Legacy, ChemStationFormat::Revised];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChemStationFormat::Legacy => "legacy",
            ChemStationFormat::Revised => "revised",
        }
    }
}

impl fmt::Display for ChemStationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ChemStationFormat {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "legacy" | "v1" => Ok(ChemStationFormat::Legacy),
            "revised" | "v2" => Ok(ChemStationFormat::Revised),
            other => Err(format!("unknown chem station format '{other}'")),
        }
    }
}

/// Runs extracted from a chem-station report.
///
/// `run_index` and `area` come from the second section and always have the same
/// length. `timestamps` comes from the first section and is indexed independently;
/// the two are only related through the run index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemStationReport {
    pub format: ChemStationFormat,
    pub run_index: Vec<i64>,
    pub area: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
}

impl ChemStationReport {
    pub fn run_count(&self) -> usize {
        self.run_index.len()
    }

    pub fn runs_dataframe(&self) -> PolarsResult<DataFrame> {
        let columns: Vec<Column> = vec![
            Series::new("run_index".into(), self.run_index.clone()).into(),
            Series::new("area".into(), self.area.clone()).into(),
        ];
        DataFrame::new(columns)
    }
}

/// Temperature samples in log order. Monotonic timestamps are not guaranteed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureLog {
    pub timestamps: Vec<NaiveDateTime>,
    pub temperatures: Vec<f64>,
}

impl TemperatureLog {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
