use std::fmt;

use hydrotrace_parser::ChemStationReport;
use serde::{Deserialize, Serialize};

use crate::alignment::AlignedSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlotMode {
    AreaVsRun,
    DesorptionVsTemperature,
    DesorptionVsTime,
    TemperatureVsTime,
}

impl PlotMode {
    pub const ALL: [PlotMode; 4] = [
        PlotMode::AreaVsRun,
        PlotMode::DesorptionVsTemperature,
        PlotMode::DesorptionVsTime,
        PlotMode::TemperatureVsTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlotMode::AreaVsRun => "area-vs-run",
            PlotMode::DesorptionVsTemperature => "desorption-vs-temperature",
            PlotMode::DesorptionVsTime => "desorption-vs-time",
            PlotMode::TemperatureVsTime => "temperature-vs-time",
        }
    }

    pub fn axis_labels(&self) -> (&'static str, &'static str) {
        match self {
            PlotMode::AreaVsRun => ("Run number", "Area (15 µV-s)"),
            PlotMode::DesorptionVsTemperature => ("Temperature (C)", "Desorption rate (ppm/min)"),
            PlotMode::DesorptionVsTime => ("Time (min)", "Desorption rate (ppm/min)"),
            PlotMode::TemperatureVsTime => ("Time (min)", "Temperature (C)"),
        }
    }

    /// Whether the mode draws from an aligned series rather than the raw report.
    pub fn needs_alignment(&self) -> bool {
        !matches!(self, PlotMode::AreaVsRun)
    }
}

impl fmt::Display for PlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PlotMode {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        PlotMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == normalized)
            .ok_or_else(|| format!("unknown plot mode '{}'", value.trim()))
    }
}

/// Scatter points with axis labels, independent of any renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotSeries {
    pub mode: PlotMode,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<(f64, f64)>,
}

impl PlotSeries {
    fn new(mode: PlotMode, xs: &[f64], ys: &[f64]) -> Self {
        let (x_label, y_label) = mode.axis_labels();
        Self {
            mode,
            x_label,
            y_label,
            points: xs.iter().copied().zip(ys.iter().copied()).collect(),
        }
    }

    pub fn area_vs_run(report: &ChemStationReport) -> Self {
        let runs: Vec<f64> = report.run_index.iter().map(|&run| run as f64).collect();
        Self::new(PlotMode::AreaVsRun, &runs, &report.area)
    }

    /// Returns `None` for modes that plot the raw report.
    pub fn from_aligned(series: &AlignedSeries, mode: PlotMode) -> Option<Self> {
        let plot = match mode {
            PlotMode::AreaVsRun => return None,
            PlotMode::DesorptionVsTemperature => {
                Self::new(mode, &series.common_temp, &series.desorption_rate)
            }
            PlotMode::DesorptionVsTime => {
                Self::new(mode, &series.common_time, &series.desorption_rate)
            }
            PlotMode::TemperatureVsTime => {
                Self::new(mode, &series.temperature_time, &series.temperature)
            }
        };
        Some(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mode_names() {
        for mode in PlotMode::ALL {
            assert_eq!(PlotMode::try_from(mode.as_str()), Ok(mode));
        }
        assert_eq!(
            PlotMode::try_from("Desorption_vs_Time"),
            Ok(PlotMode::DesorptionVsTime)
        );
        assert!(PlotMode::try_from("histogram").is_err());
    }

    #[test]
    fn raw_report_modes_do_not_read_aligned_series() {
        assert!(!PlotMode::AreaVsRun.needs_alignment());
        assert!(PlotMode::TemperatureVsTime.needs_alignment());
    }
}
