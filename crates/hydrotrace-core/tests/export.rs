use chrono::NaiveDate;
use hydrotrace_core::alignment::AlignedSeries;
use hydrotrace_core::export::{export_aligned, write_aligned, EXPORT_HEADER};

fn series() -> AlignedSeries {
    AlignedSeries {
        origin: NaiveDate::from_ymd_opt(2020, 3, 12)
            .unwrap()
            .and_hms_opt(9, 58, 0)
            .unwrap(),
        common_time: vec![0.0, 2.5],
        common_temp: vec![25.0, 27.5],
        desorption_rate: vec![0.125, 0.25],
        temperature_time: vec![0.0, 1.0, 2.0, 3.0],
        temperature: vec![25.0, 26.0, 27.0, 28.0],
    }
}

#[test]
fn writes_commented_header_and_rows() {
    let mut buffer = Vec::new();
    let rows = write_aligned(&mut buffer, &series()).unwrap();
    assert_eq!(rows, 2);

    let text = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("# {EXPORT_HEADER}"));
    assert_eq!(lines[0], "# Time (min),Temp (C),D_rate (ppm/min)");
    assert_eq!(lines.len(), 3);

    let values: Vec<f64> = lines[2]
        .split(',')
        .map(|field| field.parse().unwrap())
        .collect();
    assert_eq!(values, vec![2.5, 27.5, 0.25]);
}

#[test]
fn exports_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aligned.csv");

    let rows = export_aligned(&path, &series()).unwrap();
    assert_eq!(rows, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Time (min)"));
    assert_eq!(text.lines().count(), 3);
}
