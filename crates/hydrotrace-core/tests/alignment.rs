use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use hydrotrace_core::alignment::{
    align, interpolate, resolve_run_timestamps, AlignmentError, AlignmentOptions,
    RunTimestampIndexing,
};
use hydrotrace_core::calculator::{desorption_rates, InstrumentConfig};
use hydrotrace_parser::{
    parse_chem_station_bytes, parse_temperature_log, ChemStationFormat, ChemStationReport,
    TemperatureLog,
};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../hydrotrace-parser/tests/data")
        .join(name)
}

fn legacy_report() -> ChemStationReport {
    let bytes = fs::read(fixture_path("chemstation_legacy.txt")).expect("read fixture");
    parse_chem_station_bytes(&bytes, ChemStationFormat::Legacy).expect("parse report")
}

fn temperature_log() -> TemperatureLog {
    let content = fs::read_to_string(fixture_path("temperature_log.csv")).expect("read fixture");
    parse_temperature_log(&content).expect("parse log")
}

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 3, 12)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn legacy_offset_picks_timestamp_after_run() {
    let report = legacy_report();
    let targets = resolve_run_timestamps(&report, RunTimestampIndexing::default()).unwrap();
    assert_eq!(targets.len(), 5);
    assert_eq!(targets[0], report.timestamps[2]);
    assert_eq!(targets[4], report.timestamps[6]);

    let sequential = resolve_run_timestamps(&report, RunTimestampIndexing::Sequential).unwrap();
    assert_eq!(sequential[0], report.timestamps[0]);
}

#[test]
fn run_index_past_timestamps_is_rejected() {
    let report = legacy_report();
    let err = resolve_run_timestamps(&report, RunTimestampIndexing::Offset(3)).unwrap_err();
    match err {
        AlignmentError::RunOutOfBounds {
            run_index,
            position,
            available,
        } => {
            assert_eq!(run_index, 5);
            assert_eq!(position, 8);
            assert_eq!(available, 8);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(resolve_run_timestamps(&report, RunTimestampIndexing::Offset(-2)).is_err());
}

#[test]
fn aligns_fixture_without_delay() {
    let report = legacy_report();
    let config = InstrumentConfig::default();
    let series = align(
        &report,
        &temperature_log(),
        &config,
        &AlignmentOptions::default(),
    )
    .expect("alignment failed");

    assert_eq!(series.origin, at(9, 58, 0));
    assert_eq!(series.len(), report.run_count());
    assert_eq!(series.desorption_rate, desorption_rates(&config, &report.area));

    // log rises one degree per minute from 25 C at 09:58:00
    let first = 6.0 + 41.0 / 60.0;
    assert!(close(series.common_time[0], first));
    assert!(close(series.common_temp[0], 25.0 + first));
    assert!(close(series.temperature_time[0], 0.0));
    assert_eq!(series.temperature.len(), 23);
}

#[test]
fn delay_shifts_temperature_and_origin() {
    let options = AlignmentOptions {
        delay_minutes: 5.0,
        ..AlignmentOptions::default()
    };
    let series = align(
        &legacy_report(),
        &temperature_log(),
        &InstrumentConfig::default(),
        &options,
    )
    .expect("alignment failed");

    assert_eq!(series.origin, at(10, 3, 0));
    assert!(close(series.temperature_time[0], 0.0));
    let first = 1.0 + 41.0 / 60.0;
    assert!(close(series.common_time[0], first));
    assert!(close(series.common_temp[0], 25.0 + first));
}

#[test]
fn delay_pushing_span_past_targets_is_a_range_error() {
    let options = AlignmentOptions {
        delay_minutes: 10.0,
        ..AlignmentOptions::default()
    };
    let err = align(
        &legacy_report(),
        &temperature_log(),
        &InstrumentConfig::default(),
        &options,
    )
    .unwrap_err();
    assert!(matches!(err, AlignmentError::OutOfRange { .. }), "{err}");
}

#[test]
fn interpolation_reproduces_nodes() {
    let times = vec![at(10, 0, 0), at(10, 1, 0), at(10, 2, 30), at(10, 4, 0)];
    let log = TemperatureLog {
        timestamps: times.clone(),
        temperatures: vec![20.5, 22.0, 21.25, 30.0],
    };
    let report = ChemStationReport {
        format: ChemStationFormat::Legacy,
        run_index: vec![1, 2, 3, 4],
        area: vec![1.0, 2.0, 3.0, 4.0],
        timestamps: times,
    };
    let options = AlignmentOptions {
        delay_minutes: 0.0,
        indexing: RunTimestampIndexing::Sequential,
    };

    let series = align(&report, &log, &InstrumentConfig::default(), &options).unwrap();
    assert_eq!(series.common_temp, log.temperatures);
    for (time, expected) in series.common_time.iter().zip([0.0, 1.0, 2.5, 4.0]) {
        assert!(close(*time, expected));
    }
}

#[test]
fn unsorted_log_is_ordered_before_interpolating() {
    let log = TemperatureLog {
        timestamps: vec![at(10, 2, 0), at(10, 0, 0), at(10, 1, 0)],
        temperatures: vec![40.0, 20.0, 30.0],
    };
    let report = ChemStationReport {
        format: ChemStationFormat::Legacy,
        run_index: vec![0],
        area: vec![1.0],
        timestamps: vec![at(10, 1, 30)],
    };
    let options = AlignmentOptions {
        delay_minutes: 0.0,
        indexing: RunTimestampIndexing::Sequential,
    };

    let series = align(&report, &log, &InstrumentConfig::default(), &options).unwrap();
    assert!(close(series.common_temp[0], 35.0));
    assert_eq!(series.temperature, vec![20.0, 30.0, 40.0]);
}

#[test]
fn interpolate_rejects_out_of_span_targets() {
    let xs = [0.0, 1.0, 2.0];
    let ys = [0.0, 10.0, 20.0];

    assert_eq!(interpolate(&xs, &ys, &[0.25, 2.0]).unwrap(), vec![2.5, 20.0]);
    assert!(matches!(
        interpolate(&xs, &ys, &[-0.1]),
        Err(AlignmentError::OutOfRange { .. })
    ));
    assert!(matches!(
        interpolate(&xs, &ys, &[f64::NAN]),
        Err(AlignmentError::OutOfRange { .. })
    ));
    assert!(matches!(
        interpolate(&[], &[], &[0.0]),
        Err(AlignmentError::EmptySeries(_))
    ));
    assert!(matches!(
        interpolate(&xs, &ys[..2], &[0.0]),
        Err(AlignmentError::LengthMismatch { .. })
    ));
}

#[test]
fn non_finite_delay_is_rejected() {
    let options = AlignmentOptions {
        delay_minutes: f64::NAN,
        ..AlignmentOptions::default()
    };
    let err = align(
        &legacy_report(),
        &temperature_log(),
        &InstrumentConfig::default(),
        &options,
    )
    .unwrap_err();
    assert!(matches!(err, AlignmentError::InvalidDelay(_)));
}
