mod chemstation;
mod common;
mod temperature_log;

pub use chemstation::{LegacyChemStationParser, RevisedChemStationParser, SECTION_MARKER};
pub use common::decode_utf16;
pub use temperature_log::TemperatureLogParser;

pub(crate) use common::{
    marker_lines, parse_required_f64, parse_required_i64, parse_timestamp, token,
};
