use polars::prelude::*;
use serde::{Deserialize, Serialize};

const MICROMOL_TO_MOL: f64 = 1e-6;
const PPM_SCALE: f64 = 12.0;

pub const DEFAULT_H_STD_CONTENT: f64 = 61.0;
pub const DEFAULT_CARRIER_GAS_MOLAR_RATE: f64 = 7.44;

/// Per-measurement values entered alongside a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementParameters {
    pub h_std_peak_area: f64,
    /// grams
    pub sample_weight: f64,
    /// mL/min
    pub flow_rate: f64,
    /// minutes per run
    pub cycle_time: f64,
}

impl Default for MeasurementParameters {
    fn default() -> Self {
        Self {
            h_std_peak_area: 86485.0,
            sample_weight: 5.0,
            flow_rate: 20.0,
            cycle_time: 2.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// ppm
    pub h_std_content: f64,
    pub h_std_peak_area: f64,
    pub sample_weight: f64,
    /// µmol/s
    pub carrier_gas_molar_rate: f64,
    pub flow_rate: f64,
    pub cycle_time: f64,
}

impl InstrumentConfig {
    pub fn new(
        h_std_content: f64,
        carrier_gas_molar_rate: f64,
        measurement: MeasurementParameters,
    ) -> Self {
        Self {
            h_std_content,
            h_std_peak_area: measurement.h_std_peak_area,
            sample_weight: measurement.sample_weight,
            carrier_gas_molar_rate,
            flow_rate: measurement.flow_rate,
            cycle_time: measurement.cycle_time,
        }
    }

    /// ppm/min contributed by one unit of peak area.
    pub fn rate_factor(&self) -> f64 {
        self.h_std_content
            * self.flow_rate
            * (self.carrier_gas_molar_rate * MICROMOL_TO_MOL)
            * PPM_SCALE
            / (self.h_std_peak_area * self.sample_weight)
    }
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_H_STD_CONTENT,
            DEFAULT_CARRIER_GAS_MOLAR_RATE,
            MeasurementParameters::default(),
        )
    }
}

/// Total hydrogen content in ppm, summed over every run.
///
/// Zero peak area or weight is not trapped; the result is then infinite or NaN.
pub fn total_hydrogen_ppm(config: &InstrumentConfig, area: &[f64]) -> f64 {
    let factor = config.rate_factor() * config.cycle_time;
    area.iter().map(|value| value * factor).sum()
}

/// Desorption rate in ppm/min for each run.
pub fn desorption_rates(config: &InstrumentConfig, area: &[f64]) -> Vec<f64> {
    let factor = config.rate_factor();
    area.iter().map(|value| value * factor).collect()
}

/// Appends a `desorption_rate_ppm_min` column computed from the `area` column.
pub fn apply_desorption_rate(
    df: &DataFrame,
    config: &InstrumentConfig,
) -> Result<DataFrame, PolarsError> {
    let len = df.height();
    let area = df.column("area")?.f64()?;
    let factor = config.rate_factor();

    let rates: Vec<Option<f64>> = (0..len)
        .map(|idx| area.get(idx).map(|value| value * factor))
        .collect();

    let mut output = df.clone();
    output.hstack_mut(&mut [Series::new("desorption_rate_ppm_min".into(), rates).into()])?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_factor_matches_closed_form() {
        let config = InstrumentConfig::default();
        let expected = 61.0 * 20.0 * 7.44e-6 * 12.0 / (86485.0 * 5.0);
        assert!((config.rate_factor() - expected).abs() < 1e-18);
    }

    #[test]
    fn zero_weight_propagates_infinity() {
        let config = InstrumentConfig {
            sample_weight: 0.0,
            ..InstrumentConfig::default()
        };
        assert!(total_hydrogen_ppm(&config, &[100.0]).is_infinite());
        assert!(total_hydrogen_ppm(&config, &[0.0]).is_nan());
    }

    #[test]
    fn empty_area_totals_zero() {
        assert_eq!(total_hydrogen_ppm(&InstrumentConfig::default(), &[]), 0.0);
        assert!(desorption_rates(&InstrumentConfig::default(), &[]).is_empty());
    }
}
