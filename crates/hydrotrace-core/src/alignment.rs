use chrono::{Duration, NaiveDateTime};
use hydrotrace_parser::{ChemStationReport, TemperatureLog};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::calculator::{desorption_rates, InstrumentConfig};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// Offset historically added to a run index to find its timestamp row.
pub const LEGACY_RUN_OFFSET: i64 = 1;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("target time {target:.3} min lies outside the temperature span [{start:.3}, {end:.3}] min")]
    OutOfRange { target: f64, start: f64, end: f64 },
    #[error("run {run_index} resolves to timestamp position {position}, but the report has {available} timestamps")]
    RunOutOfBounds {
        run_index: i64,
        position: i64,
        available: usize,
    },
    #[error("{0} series is empty")]
    EmptySeries(&'static str),
    #[error("{series} has {times} timestamps but {values} values")]
    LengthMismatch {
        series: &'static str,
        times: usize,
        values: usize,
    },
    #[error("delay must be a finite number of minutes, got {0}")]
    InvalidDelay(f64),
}

/// How a data row's run index selects its timestamp in the first report section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunTimestampIndexing {
    /// `timestamps[run_index + offset]`
    Offset(i64),
    /// The n-th data row takes the n-th timestamp.
    Sequential,
}

impl Default for RunTimestampIndexing {
    fn default() -> Self {
        RunTimestampIndexing::Offset(LEGACY_RUN_OFFSET)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AlignmentOptions {
    /// Minutes added to every temperature timestamp.
    pub delay_minutes: f64,
    pub indexing: RunTimestampIndexing,
}

/// Temperature and desorption rate on a shared minutes axis.
///
/// `common_time`, `common_temp` and `desorption_rate` have one entry per run.
/// `temperature_time`/`temperature` hold the delayed source log on the same axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    pub origin: NaiveDateTime,
    pub common_time: Vec<f64>,
    pub common_temp: Vec<f64>,
    pub desorption_rate: Vec<f64>,
    pub temperature_time: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl AlignedSeries {
    pub fn len(&self) -> usize {
        self.common_time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.common_time.is_empty()
    }
}

pub fn resolve_run_timestamps(
    report: &ChemStationReport,
    indexing: RunTimestampIndexing,
) -> Result<Vec<NaiveDateTime>, AlignmentError> {
    let available = report.timestamps.len();
    report
        .run_index
        .iter()
        .enumerate()
        .map(|(row, &run_index)| {
            let position = match indexing {
                RunTimestampIndexing::Offset(offset) => run_index.saturating_add(offset),
                RunTimestampIndexing::Sequential => row as i64,
            };
            usize::try_from(position)
                .ok()
                .and_then(|idx| report.timestamps.get(idx).copied())
                .ok_or(AlignmentError::RunOutOfBounds {
                    run_index,
                    position,
                    available,
                })
        })
        .collect()
}

/// Piecewise-linear interpolation of `ys` over ascending `xs`.
///
/// Targets outside `[xs[0], xs[last]]` are rejected rather than extrapolated.
/// Targets equal to a node return that node's value exactly.
pub fn interpolate(xs: &[f64], ys: &[f64], targets: &[f64]) -> Result<Vec<f64>, AlignmentError> {
    if xs.len() != ys.len() {
        return Err(AlignmentError::LengthMismatch {
            series: "interpolation source",
            times: xs.len(),
            values: ys.len(),
        });
    }
    let (Some(&start), Some(&end)) = (xs.first(), xs.last()) else {
        return Err(AlignmentError::EmptySeries("interpolation source"));
    };

    targets
        .iter()
        .map(|&target| {
            if !(start..=end).contains(&target) {
                return Err(AlignmentError::OutOfRange { target, start, end });
            }
            let upper = xs.partition_point(|&x| x < target);
            if xs[upper] == target {
                return Ok(ys[upper]);
            }
            let (x0, x1) = (xs[upper - 1], xs[upper]);
            let (y0, y1) = (ys[upper - 1], ys[upper]);
            Ok(y0 + (y1 - y0) * (target - x0) / (x1 - x0))
        })
        .collect()
}

fn minutes_since(reference: NaiveDateTime, timestamp: NaiveDateTime) -> f64 {
    (timestamp - reference).num_milliseconds() as f64 / MILLIS_PER_MINUTE
}

/// Interpolates the delayed temperature log onto the run timestamps and zeroes both
/// series at the earliest sample of either.
pub fn align(
    report: &ChemStationReport,
    log: &TemperatureLog,
    config: &InstrumentConfig,
    options: &AlignmentOptions,
) -> Result<AlignedSeries, AlignmentError> {
    if !options.delay_minutes.is_finite() {
        return Err(AlignmentError::InvalidDelay(options.delay_minutes));
    }
    if log.timestamps.len() != log.temperatures.len() {
        return Err(AlignmentError::LengthMismatch {
            series: "temperature log",
            times: log.timestamps.len(),
            values: log.temperatures.len(),
        });
    }
    if report.run_index.len() != report.area.len() {
        return Err(AlignmentError::LengthMismatch {
            series: "chem station runs",
            times: report.run_index.len(),
            values: report.area.len(),
        });
    }

    let targets = resolve_run_timestamps(report, options.indexing)?;
    let (Some(&log_start), Some(&target_start)) =
        (log.timestamps.iter().min(), targets.iter().min())
    else {
        return Err(AlignmentError::EmptySeries(if log.is_empty() {
            "temperature log"
        } else {
            "chem station runs"
        }));
    };
    let reference = log_start.min(target_start);

    let mut samples: Vec<(f64, f64)> = log
        .timestamps
        .iter()
        .zip(&log.temperatures)
        .map(|(&ts, &temp)| (minutes_since(reference, ts) + options.delay_minutes, temp))
        .collect();
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (mut temperature_time, temperature): (Vec<f64>, Vec<f64>) = samples.into_iter().unzip();

    let mut common_time: Vec<f64> = targets
        .iter()
        .map(|&ts| minutes_since(reference, ts))
        .collect();
    let common_temp = interpolate(&temperature_time, &temperature, &common_time)?;

    let zero = temperature_time[0].min(
        common_time
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min),
    );
    for value in temperature_time.iter_mut().chain(common_time.iter_mut()) {
        *value -= zero;
    }
    let origin = reference + Duration::milliseconds((zero * MILLIS_PER_MINUTE).round() as i64);

    debug!(
        runs = common_time.len(),
        samples = temperature_time.len(),
        delay_minutes = options.delay_minutes,
        %origin,
        "aligned temperature log onto run timestamps"
    );

    Ok(AlignedSeries {
        origin,
        common_time,
        common_temp,
        desorption_rate: desorption_rates(config, &report.area),
        temperature_time,
        temperature,
    })
}
