use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::alignment::AlignedSeries;
use crate::error::Result;

pub const EXPORT_HEADER: &str = "Time (min),Temp (C),D_rate (ppm/min)";

/// Writes the commented header followed by one `time,temp,rate` row per run.
pub fn write_aligned<W: Write>(mut writer: W, series: &AlignedSeries) -> Result<usize> {
    writeln!(writer, "# {EXPORT_HEADER}")?;

    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    let rows = series
        .common_time
        .iter()
        .zip(&series.common_temp)
        .zip(&series.desorption_rate);
    let mut count = 0usize;
    for ((time, temp), rate) in rows {
        csv_writer.serialize((time, temp, rate))?;
        count += 1;
    }
    csv_writer.flush()?;

    Ok(count)
}

pub fn export_aligned(path: &Path, series: &AlignedSeries) -> Result<usize> {
    let file = File::create(path)?;
    let rows = write_aligned(BufWriter::new(file), series)?;
    info!(path = %path.display(), rows, "exported aligned series");
    Ok(rows)
}
