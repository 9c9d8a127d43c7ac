use hydrotrace_parser::ParserError;
use polars::error::PolarsError;
use thiserror::Error;

use crate::alignment::AlignmentError;
use crate::session::WorkflowState;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid input file: {0}")]
    Parse(#[from] ParserError),

    #[error("Alignment failed: {0}")]
    Range(#[from] AlignmentError),

    #[error("Settings error: {0}")]
    Config(#[from] SettingsError),

    #[error("Invalid data: {0}")]
    InvalidInput(String),

    #[error("{command} is not available while {state}")]
    InvalidState {
        command: &'static str,
        state: WorkflowState,
    },

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
