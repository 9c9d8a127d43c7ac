use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use hydrotrace_parser::{
    parse_chem_station_bytes, parse_temperature_log, ChemStationFormat, ChemStationReport,
    TemperatureLog,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::alignment::{align, AlignedSeries, AlignmentOptions};
use crate::calculator::{
    desorption_rates, total_hydrogen_ppm, InstrumentConfig, MeasurementParameters,
};
use crate::error::{PipelineError, Result};
use crate::export::export_aligned;
use crate::plot::{PlotMode, PlotSeries};
use crate::settings::{FlowSettings, Settings};

const UNDEFINED_RESULT: &str = "Undefined";
const INVALID_DATA: &str = "Invalid data.";

/// Position in the load → calculate → align → export workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum WorkflowState {
    Idle,
    ChemLoaded,
    Calculated,
    TemperatureLoaded,
    Aligned,
    Exported,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::ChemLoaded => "chem station data loaded",
            WorkflowState::Calculated => "calculated",
            WorkflowState::TemperatureLoaded => "temperature log loaded",
            WorkflowState::Aligned => "aligned",
            WorkflowState::Exported => "exported",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CalculationMode {
    Total,
    Rate,
}

/// One user action.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadChemStation {
        path: PathBuf,
        format: ChemStationFormat,
    },
    Calculate(CalculationMode),
    LoadTemperature {
        path: PathBuf,
    },
    Align(AlignmentOptions),
    Export {
        path: PathBuf,
    },
    Plot(PlotMode),
    SetMeasurement(MeasurementParameters),
    UpdateSettings(FlowSettings),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoadChemStation { .. } => "load chem station report",
            Command::Calculate(CalculationMode::Total) => "calculate total",
            Command::Calculate(CalculationMode::Rate) => "calculate rate",
            Command::LoadTemperature { .. } => "load temperature log",
            Command::Align(_) => "align",
            Command::Export { .. } => "export",
            Command::Plot(_) => "plot",
            Command::SetMeasurement(_) => "set measurement parameters",
            Command::UpdateSettings(_) => "update settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    ChemLoaded { runs: usize, timestamps: usize },
    Total { ppm: f64 },
    Rates { run_index: Vec<i64>, rate: Vec<f64> },
    TemperatureLoaded { samples: usize },
    Aligned { samples: usize },
    Exported { path: PathBuf, rows: usize },
    Plot(PlotSeries),
    MeasurementUpdated(MeasurementParameters),
    SettingsUpdated(FlowSettings),
}

impl Outcome {
    fn status(&self) -> String {
        match self {
            Outcome::ChemLoaded { runs, timestamps } => {
                format!("Loaded {runs} runs ({timestamps} timestamps)")
            }
            Outcome::Total { ppm } => format!("Total hydrogen {ppm:.4} ppm"),
            Outcome::Rates { rate, .. } => format!("Calculated {} desorption rates", rate.len()),
            Outcome::TemperatureLoaded { samples } => {
                format!("Loaded {samples} temperature samples")
            }
            Outcome::Aligned { samples } => format!("Aligned {samples} runs"),
            Outcome::Exported { path, rows } => {
                format!("Exported {rows} rows to {}", path.display())
            }
            Outcome::Plot(series) => format!("Plotted {}", series.mode),
            Outcome::MeasurementUpdated(_) => "Measurement parameters updated".to_string(),
            Outcome::SettingsUpdated(_) => "Settings saved".to_string(),
        }
    }
}

/// Owns the loaded data and settings, and applies commands one at a time.
///
/// A failing command leaves every stored value as it was; only the status line changes.
#[derive(Debug)]
pub struct Session {
    settings_path: PathBuf,
    settings: Settings,
    measurement: MeasurementParameters,
    state: WorkflowState,
    chem: Option<ChemStationReport>,
    temperature: Option<TemperatureLog>,
    aligned: Option<AlignedSeries>,
    total_ppm: Option<f64>,
    status: String,
}

impl Session {
    pub fn new(settings: Settings, settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            settings,
            measurement: MeasurementParameters::default(),
            state: WorkflowState::Idle,
            chem: None,
            temperature: None,
            aligned: None,
            total_ppm: None,
            status: "Idle".to_string(),
        }
    }

    /// Startup entry point; a settings file that cannot be read or created is fatal.
    pub fn open(settings_path: impl Into<PathBuf>) -> Result<Self> {
        let settings_path = settings_path.into();
        let settings = Settings::load_or_init(&settings_path)?;
        Ok(Self::new(settings, settings_path))
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn measurement(&self) -> MeasurementParameters {
        self.measurement
    }

    pub fn instrument_config(&self) -> InstrumentConfig {
        self.settings.instrument(self.measurement)
    }

    pub fn chem_report(&self) -> Option<&ChemStationReport> {
        self.chem.as_ref()
    }

    pub fn temperature_log(&self) -> Option<&TemperatureLog> {
        self.temperature.as_ref()
    }

    pub fn aligned(&self) -> Option<&AlignedSeries> {
        self.aligned.as_ref()
    }

    /// Last total formatted for display, or "Undefined" once inputs have changed.
    pub fn result_text(&self) -> String {
        match self.total_ppm {
            Some(ppm) => format!("{ppm:.4}"),
            None => UNDEFINED_RESULT.to_string(),
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Outcome> {
        let name = command.name();
        let result = match command {
            Command::LoadChemStation { path, format } => self.load_chem_station(&path, format),
            Command::Calculate(mode) => self.calculate(mode),
            Command::LoadTemperature { path } => self.load_temperature(&path),
            Command::Align(options) => self.align(&options),
            Command::Export { path } => self.export(path),
            Command::Plot(mode) => self.plot(mode),
            Command::SetMeasurement(measurement) => Ok(self.set_measurement(measurement)),
            Command::UpdateSettings(flow) => self.update_settings(flow),
        };

        match result {
            Ok(outcome) => {
                self.status = outcome.status();
                info!(command = name, state = %self.state, "{}", self.status);
                Ok(outcome)
            }
            Err(err) => {
                self.status = match &err {
                    PipelineError::InvalidInput(_) => INVALID_DATA.to_string(),
                    PipelineError::Parse(_) => format!("No data read from file. {err}"),
                    other => other.to_string(),
                };
                warn!(command = name, state = %self.state, error = %err, "command failed");
                Err(err)
            }
        }
    }

    fn require(&self, command: &'static str, minimum: WorkflowState) -> Result<()> {
        if self.state >= minimum {
            Ok(())
        } else {
            Err(PipelineError::InvalidState {
                command,
                state: self.state,
            })
        }
    }

    /// Drops results derived from the current inputs.
    fn invalidate_results(&mut self) {
        self.total_ppm = None;
        self.aligned = None;
        if self.state > WorkflowState::ChemLoaded {
            self.state = WorkflowState::ChemLoaded;
        }
    }

    fn load_chem_station(&mut self, path: &Path, format: ChemStationFormat) -> Result<Outcome> {
        let bytes = fs::read(path)?;
        let report = parse_chem_station_bytes(&bytes, format)?;

        let outcome = Outcome::ChemLoaded {
            runs: report.run_count(),
            timestamps: report.timestamps.len(),
        };
        self.chem = Some(report);
        self.temperature = None;
        self.aligned = None;
        self.total_ppm = None;
        self.state = WorkflowState::ChemLoaded;
        Ok(outcome)
    }

    fn calculate(&mut self, mode: CalculationMode) -> Result<Outcome> {
        self.require("calculate", WorkflowState::ChemLoaded)?;
        let Some(report) = self.chem.as_ref() else {
            return Err(PipelineError::InvalidState {
                command: "calculate",
                state: self.state,
            });
        };
        let config = self.instrument_config();

        let outcome = match mode {
            CalculationMode::Total => {
                let ppm = total_hydrogen_ppm(&config, &report.area);
                ensure_finite("total hydrogen", [ppm])?;
                Outcome::Total { ppm }
            }
            CalculationMode::Rate => {
                let rate = desorption_rates(&config, &report.area);
                ensure_finite("desorption rate", rate.iter().copied())?;
                Outcome::Rates {
                    run_index: report.run_index.clone(),
                    rate,
                }
            }
        };

        if let Outcome::Total { ppm } = outcome {
            self.total_ppm = Some(ppm);
        }
        self.aligned = None;
        self.state = if self.temperature.is_some() {
            WorkflowState::TemperatureLoaded
        } else {
            WorkflowState::Calculated
        };
        Ok(outcome)
    }

    fn load_temperature(&mut self, path: &Path) -> Result<Outcome> {
        self.require("load temperature log", WorkflowState::Calculated)?;
        let content = fs::read_to_string(path)?;
        let log = parse_temperature_log(&content)?;

        let outcome = Outcome::TemperatureLoaded { samples: log.len() };
        self.temperature = Some(log);
        self.aligned = None;
        self.state = WorkflowState::TemperatureLoaded;
        Ok(outcome)
    }

    fn align(&mut self, options: &AlignmentOptions) -> Result<Outcome> {
        self.require("align", WorkflowState::TemperatureLoaded)?;
        let (Some(report), Some(log)) = (self.chem.as_ref(), self.temperature.as_ref()) else {
            return Err(PipelineError::InvalidState {
                command: "align",
                state: self.state,
            });
        };

        let series = align(report, log, &self.instrument_config(), options)?;
        ensure_finite("interpolated temperature", series.common_temp.iter().copied())?;
        ensure_finite("desorption rate", series.desorption_rate.iter().copied())?;

        let outcome = Outcome::Aligned {
            samples: series.len(),
        };
        self.aligned = Some(series);
        self.state = WorkflowState::Aligned;
        Ok(outcome)
    }

    fn export(&mut self, path: PathBuf) -> Result<Outcome> {
        self.require("export", WorkflowState::Aligned)?;
        let Some(series) = self.aligned.as_ref() else {
            return Err(PipelineError::InvalidState {
                command: "export",
                state: self.state,
            });
        };

        let rows = export_aligned(&path, series)?;
        self.state = WorkflowState::Exported;
        Ok(Outcome::Exported { path, rows })
    }

    fn plot(&self, mode: PlotMode) -> Result<Outcome> {
        let series = if mode.needs_alignment() {
            self.aligned
                .as_ref()
                .and_then(|aligned| PlotSeries::from_aligned(aligned, mode))
        } else {
            self.chem.as_ref().map(PlotSeries::area_vs_run)
        };

        series.map(Outcome::Plot).ok_or(PipelineError::InvalidState {
            command: "plot",
            state: self.state,
        })
    }

    fn set_measurement(&mut self, measurement: MeasurementParameters) -> Outcome {
        if measurement != self.measurement {
            self.measurement = measurement;
            self.invalidate_results();
        }
        Outcome::MeasurementUpdated(measurement)
    }

    fn update_settings(&mut self, flow: FlowSettings) -> Result<Outcome> {
        let updated = Settings { flow };
        updated.save(&self.settings_path)?;

        self.settings = updated;
        self.invalidate_results();
        Ok(Outcome::SettingsUpdated(flow))
    }
}

fn ensure_finite(quantity: &str, values: impl IntoIterator<Item = f64>) -> Result<()> {
    match values.into_iter().find(|value| !value.is_finite()) {
        Some(value) => Err(PipelineError::InvalidInput(format!(
            "{quantity} evaluated to {value}; check the input data and measurement parameters"
        ))),
        None => Ok(()),
    }
}
