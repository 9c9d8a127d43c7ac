use once_cell::sync::Lazy;

use crate::errors::ParserError;
use crate::formats::{decode_utf16, LegacyChemStationParser, RevisedChemStationParser};
use crate::model::{ChemStationFormat, ChemStationReport};

pub trait ChemStationParser {
    fn name(&self) -> &'static str;
    fn format(&self) -> ChemStationFormat;
    fn parse(&self, content: &str) -> Result<ChemStationReport, ParserError>;

    /// Decodes a raw UTF-16 report before parsing it.
    fn parse_bytes(&self, bytes: &[u8]) -> Result<ChemStationReport, ParserError> {
        let content = decode_utf16(self.name(), bytes)?;
        self.parse(&content)
    }
}

#[derive(Debug, Clone)]
pub struct ParserDescriptor {
    pub format: ChemStationFormat,
    pub code: &'static str,
    pub description: &'static str,
}

static LEGACY: LegacyChemStationParser = LegacyChemStationParser;
static REVISED: RevisedChemStationParser = RevisedChemStationParser;

static DESCRIPTORS: Lazy<Vec<ParserDescriptor>> = Lazy::new(|| {
    vec![
        ParserDescriptor {
            format: ChemStationFormat::Legacy,
            code: LEGACY.name(),
            description: "Area column chosen by row width (token 5 or 6)",
        },
        ParserDescriptor {
            format: ChemStationFormat::Revised,
            code: REVISED.name(),
            description: "Area in token 2, totals row above the closing marker",
        },
    ]
});

pub fn parser_descriptors() -> &'static [ParserDescriptor] {
    DESCRIPTORS.as_slice()
}

pub fn parser_for(format: ChemStationFormat) -> &'static dyn ChemStationParser {
    match format {
        ChemStationFormat::Legacy => &LEGACY,
        ChemStationFormat::Revised => &REVISED,
    }
}

pub fn parse_chem_station(
    content: &str,
    format: ChemStationFormat,
) -> Result<ChemStationReport, ParserError> {
    parser_for(format).parse(content)
}

pub fn parse_chem_station_bytes(
    bytes: &[u8],
    format: ChemStationFormat,
) -> Result<ChemStationReport, ParserError> {
    parser_for(format).parse_bytes(bytes)
}
