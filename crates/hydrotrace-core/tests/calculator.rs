use hydrotrace_core::calculator::{
    apply_desorption_rate, desorption_rates, total_hydrogen_ppm, InstrumentConfig,
};
use polars::prelude::*;

fn reference_config() -> InstrumentConfig {
    InstrumentConfig {
        h_std_content: 61.0,
        h_std_peak_area: 86485.0,
        sample_weight: 5.0,
        carrier_gas_molar_rate: 7.44,
        flow_rate: 20.0,
        cycle_time: 2.3,
    }
}

fn relative_eq(a: f64, b: f64, tolerance: f64) -> bool {
    ((a - b) / b).abs() < tolerance
}

#[test]
fn total_matches_closed_form_example() {
    let area = [100.0, 200.0];
    let expected: f64 = area
        .iter()
        .map(|a| a * 61.0 * 20.0 * 7.44e-6 * 2.3 * 12.0 / (86485.0 * 5.0))
        .sum();

    let total = total_hydrogen_ppm(&reference_config(), &area);
    assert!(relative_eq(total, expected, 1e-6), "{total} != {expected}");
}

#[test]
fn total_is_linear_in_area() {
    let config = reference_config();
    let area = [1523.4521, 1498.11, 1210.5, 987.25, 640.75];
    let base = total_hydrogen_ppm(&config, &area);

    for k in [0.5, 2.0, 17.25] {
        let scaled: Vec<f64> = area.iter().map(|a| a * k).collect();
        let total = total_hydrogen_ppm(&config, &scaled);
        assert!(relative_eq(total, base * k, 1e-12));
    }
}

#[test]
fn rates_are_proportional_to_area() {
    let config = reference_config();
    let area = [100.0, 250.0, 1234.5, 7.0];
    let rates = desorption_rates(&config, &area);

    assert_eq!(rates.len(), area.len());
    let ratio = rates[0] / area[0];
    for (rate, value) in rates.iter().zip(area) {
        assert!(relative_eq(rate / value, ratio, 1e-12));
    }
}

#[test]
fn total_equals_cycle_time_weighted_rate_sum() {
    let config = reference_config();
    let area = [10.0, 20.0, 30.0];
    let rate_sum: f64 = desorption_rates(&config, &area).iter().sum();
    let total = total_hydrogen_ppm(&config, &area);
    assert!(relative_eq(total, rate_sum * config.cycle_time, 1e-12));
}

#[test]
fn dataframe_gains_rate_column() -> PolarsResult<()> {
    let df = df!(
        "run_index" => &[1i64, 2i64],
        "area" => &[100.0f64, 200.0f64],
    )?;
    let config = reference_config();

    let result = apply_desorption_rate(&df, &config)?;
    let rates = result.column("desorption_rate_ppm_min")?.f64()?;
    let expected = desorption_rates(&config, &[100.0, 200.0]);

    assert_eq!(result.height(), 2);
    assert!((rates.get(0).unwrap() - expected[0]).abs() < 1e-15);
    assert!((rates.get(1).unwrap() - expected[1]).abs() < 1e-15);
    Ok(())
}

#[test]
fn dataframe_without_area_is_rejected() {
    let df = df!("run_index" => &[1i64]).unwrap();
    assert!(apply_desorption_rate(&df, &reference_config()).is_err());
}
