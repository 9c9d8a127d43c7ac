use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("{parser} expected {expected} section markers containing '{marker}', found {found}")]
    MissingMarkers {
        parser: &'static str,
        marker: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{parser} could not decode input: {message}")]
    Encoding {
        parser: &'static str,
        message: String,
    },

    #[error("{parser} CSV error: {source}")]
    Csv {
        parser: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{parser} line {line_index} invalid: {message}")]
    DataRow {
        parser: &'static str,
        line_index: usize,
        message: String,
    },

    #[error("{parser} {section} did not contain any rows")]
    EmptyData {
        parser: &'static str,
        section: &'static str,
    },
}
