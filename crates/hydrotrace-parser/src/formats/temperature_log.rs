use tracing::debug;

use crate::errors::ParserError;
use crate::model::TemperatureLog;

use super::{parse_required_f64, parse_timestamp, token};

#[derive(Debug, Default)]
pub struct TemperatureLogParser;

impl TemperatureLogParser {
    pub const NAME: &'static str = "TEMPERATURE_LOG";

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Parses `index,dd/mm/yyyy HH:MM:SS,temperature` rows after a single header line.
    /// Blank lines between data rows are malformed; trailing blank lines are ignored.
    pub fn parse(&self, content: &str) -> Result<TemperatureLog, ParserError> {
        if let Some(line_index) = interior_blank_line(content) {
            return Err(ParserError::DataRow {
                parser: Self::NAME,
                line_index,
                message: "blank line inside temperature log".to_string(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());

        let mut timestamps = Vec::new();
        let mut temperatures = Vec::new();

        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|err| ParserError::Csv {
                parser: Self::NAME,
                source: err,
            })?;
            let line_index = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(row_idx + 2);

            let fields: Vec<&str> = record.iter().collect();
            let timestamp = token(Self::NAME, &fields, 2, line_index)?;
            let temperature = token(Self::NAME, &fields, 3, line_index)?;

            timestamps.push(parse_timestamp(Self::NAME, timestamp, line_index)?);
            temperatures.push(parse_required_f64(
                Self::NAME,
                temperature,
                line_index,
                "temperature",
            )?);
        }

        if timestamps.is_empty() {
            return Err(ParserError::EmptyData {
                parser: Self::NAME,
                section: "temperature log",
            });
        }

        debug!(samples = timestamps.len(), "parsed temperature log");

        Ok(TemperatureLog {
            timestamps,
            temperatures,
        })
    }
}

/// The csv reader skips empty lines silently, so gaps between rows are found up front.
fn interior_blank_line(content: &str) -> Option<usize> {
    let mut seen_row = false;
    let mut blank = None;
    for (idx, line) in content.lines().enumerate() {
        if !line.is_empty() {
            if blank.is_some() {
                return blank;
            }
            seen_row = true;
        } else if seen_row && blank.is_none() {
            blank = Some(idx + 1);
        }
    }
    None
}
