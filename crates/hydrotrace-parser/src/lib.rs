pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::ParserError;
pub use formats::{TemperatureLogParser, SECTION_MARKER};
pub use model::{ChemStationFormat, ChemStationReport, TemperatureLog};
pub use registry::{
    parse_chem_station, parse_chem_station_bytes, parser_descriptors, parser_for,
    ChemStationParser, ParserDescriptor,
};

pub fn parse_temperature_log(content: &str) -> Result<TemperatureLog, ParserError> {
    TemperatureLogParser.parse(content)
}
