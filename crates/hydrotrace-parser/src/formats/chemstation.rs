use tracing::debug;

use crate::errors::ParserError;
use crate::model::{ChemStationFormat, ChemStationReport};
use crate::registry::ChemStationParser;

use super::{marker_lines, parse_required_f64, parse_required_i64, parse_timestamp, token};

pub const SECTION_MARKER: &str = "---|";
const REQUIRED_MARKERS: usize = 3;

#[derive(Debug, Clone, Copy)]
enum AreaColumn {
    /// Rows with exactly `width` tokens carry the area at `narrow`; wider rows
    /// (extra characters in the peak type column) carry it at `wide`.
    ByWidth {
        width: usize,
        narrow: usize,
        wide: usize,
    },
    Fixed(usize),
}

impl AreaColumn {
    fn position(&self, token_count: usize) -> usize {
        match *self {
            AreaColumn::ByWidth {
                width,
                narrow,
                wide,
            } => {
                if token_count == width {
                    narrow
                } else {
                    wide
                }
            }
            AreaColumn::Fixed(position) => position,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct SectionLayout {
    /// Column header lines sitting between the timestamp rows and the second marker.
    header_offset: usize,
    /// Lines directly above the third marker that are not run rows. A run row found
    /// there is rejected rather than dropped.
    trailing_offset: usize,
    area: AreaColumn,
}

pub struct LegacyChemStationParser;

impl LegacyChemStationParser {
    const NAME: &'static str = "CHEMSTATION_LEGACY";
    const LAYOUT: SectionLayout = SectionLayout {
        header_offset: 6,
        trailing_offset: 0,
        area: AreaColumn::ByWidth {
            width: 8,
            narrow: 5,
            wide: 6,
        },
    };
}

impl ChemStationParser for LegacyChemStationParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn format(&self) -> ChemStationFormat {
        ChemStationFormat::Legacy
    }

    fn parse(&self, content: &str) -> Result<ChemStationReport, ParserError> {
        parse_sections(Self::NAME, self.format(), Self::LAYOUT, content)
    }
}

pub struct RevisedChemStationParser;

impl RevisedChemStationParser {
    const NAME: &'static str = "CHEMSTATION_REVISED";
    const LAYOUT: SectionLayout = SectionLayout {
        header_offset: 6,
        trailing_offset: 1,
        area: AreaColumn::Fixed(2),
    };
}

impl ChemStationParser for RevisedChemStationParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn format(&self) -> ChemStationFormat {
        ChemStationFormat::Revised
    }

    fn parse(&self, content: &str) -> Result<ChemStationReport, ParserError> {
        parse_sections(Self::NAME, self.format(), Self::LAYOUT, content)
    }
}

fn parse_sections(
    parser: &'static str,
    format: ChemStationFormat,
    layout: SectionLayout,
    content: &str,
) -> Result<ChemStationReport, ParserError> {
    let markers = marker_lines(content, SECTION_MARKER);
    if markers.len() < REQUIRED_MARKERS {
        return Err(ParserError::MissingMarkers {
            parser,
            marker: SECTION_MARKER,
            expected: REQUIRED_MARKERS,
            found: markers.len(),
        });
    }
    let (first, second, third) = (markers[0], markers[1], markers[2]);
    let timestamp_end = second.saturating_sub(layout.header_offset);
    let run_end = third.saturating_sub(layout.trailing_offset);
    debug!(
        parser,
        first, second, third, timestamp_end, run_end, "located chem station sections"
    );

    let mut timestamps = Vec::new();
    let mut run_index = Vec::new();
    let mut area = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_index = idx + 1;
        if first < line_index && line_index < timestamp_end {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let date = token(parser, &tokens, 4, line_index)?;
            let time = token(parser, &tokens, 5, line_index)?;
            timestamps.push(parse_timestamp(parser, &format!("{date} {time}"), line_index)?);
        } else if second < line_index && line_index < run_end {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            let index_value = token(parser, &tokens, 1, line_index)?;
            let area_position = layout.area.position(tokens.len());
            let area_value = token(parser, &tokens, area_position, line_index)?;
            run_index.push(parse_required_i64(parser, index_value, line_index, "run index")?);
            area.push(parse_required_f64(parser, area_value, line_index, "peak area")?);
        } else if second < line_index && run_end <= line_index && line_index < third {
            let leading = line.split_whitespace().next().unwrap_or_default();
            if leading.parse::<i64>().is_ok() {
                return Err(ParserError::DataRow {
                    parser,
                    line_index,
                    message: format!(
                        "run row '{}' sits where the totals line is expected",
                        line.trim()
                    ),
                });
            }
        }
    }

    if timestamps.is_empty() {
        return Err(ParserError::EmptyData {
            parser,
            section: "run timestamp section",
        });
    }
    if run_index.is_empty() {
        return Err(ParserError::EmptyData {
            parser,
            section: "peak area section",
        });
    }

    debug!(
        parser,
        runs = run_index.len(),
        timestamps = timestamps.len(),
        "parsed chem station report"
    );

    Ok(ChemStationReport {
        format,
        run_index,
        area,
        timestamps,
    })
}
