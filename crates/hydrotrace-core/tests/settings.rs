use std::fs;

use hydrotrace_core::calculator::MeasurementParameters;
use hydrotrace_core::settings::{FlowSettings, Settings, SettingsError};

#[test]
fn first_launch_writes_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("HydroTraceSettings.yml");

    let settings = Settings::load_or_init(&path).expect("defaults should be written");
    assert_eq!(settings, Settings::default());
    assert!(path.exists());

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("FlowSettings:"));
    assert!(written.contains("content: 61.0"));
    assert!(written.contains("molar_rate: 7.44"));
}

#[test]
fn reads_existing_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");
    fs::write(&path, "FlowSettings:\n  content: 58.5\n  molar_rate: 7.1\n").unwrap();

    let settings = Settings::load_or_init(&path).unwrap();
    assert_eq!(
        settings.flow,
        FlowSettings {
            content: 58.5,
            molar_rate: 7.1
        }
    );

    let config = settings.instrument(MeasurementParameters::default());
    assert_eq!(config.h_std_content, 58.5);
    assert_eq!(config.carrier_gas_molar_rate, 7.1);
    assert_eq!(config.h_std_peak_area, 86485.0);
}

#[test]
fn save_rewrites_whole_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");
    fs::write(&path, "FlowSettings:\n  content: 1.0\n  molar_rate: 1.0\n# stale\n").unwrap();

    let settings = Settings {
        flow: FlowSettings {
            content: 64.0,
            molar_rate: 7.5,
        },
    };
    settings.save(&path).unwrap();

    assert_eq!(Settings::load(&path).unwrap(), settings);
    assert!(!fs::read_to_string(&path).unwrap().contains("stale"));
}

#[test]
fn corrupt_document_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");
    fs::write(&path, "FlowSettings: [not, a, map]\n").unwrap();

    let err = Settings::load_or_init(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Corrupt { .. }), "{err}");
}

#[test]
fn non_positive_values_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.yml");
    fs::write(&path, "FlowSettings:\n  content: 0.0\n  molar_rate: 7.44\n").unwrap();

    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(
        err,
        SettingsError::InvalidValue {
            field: "content",
            ..
        }
    ));
}

#[test]
fn unwritable_location_fails_first_launch() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("settings.yml");

    let err = Settings::load_or_init(&path).unwrap_err();
    assert!(matches!(err, SettingsError::Write { .. }));
}
