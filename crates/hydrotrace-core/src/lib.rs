pub mod alignment;
pub mod calculator;
pub mod error;
pub mod export;
pub mod plot;
pub mod session;
pub mod settings;

pub use alignment::{
    align, AlignedSeries, AlignmentError, AlignmentOptions, RunTimestampIndexing,
};
pub use calculator::{
    apply_desorption_rate, desorption_rates, total_hydrogen_ppm, InstrumentConfig,
    MeasurementParameters,
};
pub use error::{PipelineError, Result};
pub use plot::{PlotMode, PlotSeries};
pub use session::{CalculationMode, Command, Outcome, Session, WorkflowState};
pub use settings::{FlowSettings, Settings, SettingsError};
