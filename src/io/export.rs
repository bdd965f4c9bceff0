//! CSV export for control-loop step results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::sim::types::StepResult;

/// Column header for CSV telemetry export.
pub const HEADER: &str = "tick,time_h,indoor_c,wall_c,outdoor_c,indoor_rh,outdoor_rh,\
                          measured_c,measured_rh,co2_ppm,u_temp_pct,u_rh_pct,\
                          heating_w,cooling_w,humidity_w,fan_w,energy_wh,sensor_fault";

/// Exports step results to a CSV file at the given path.
///
/// Produces byte-identical output for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(results: &[StepResult], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(results, buf)
}

/// Writes step results as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(results: &[StepResult], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for r in results {
        wtr.write_record(&[
            r.tick.to_string(),
            format!("{:.4}", r.time_hours()),
            format!("{:.4}", r.state.indoor_temp_c),
            format!("{:.4}", r.state.wall_temp_c),
            format!("{:.4}", r.state.outdoor_temp_c),
            format!("{:.3}", r.state.indoor_rh),
            format!("{:.3}", r.state.outdoor_rh),
            format!("{:.4}", r.measured.indoor_temp_c),
            format!("{:.3}", r.measured.indoor_rh),
            format!("{:.1}", r.measured.co2_ppm),
            format!("{:.3}", r.actuation.temperature),
            format!("{:.3}", r.actuation.humidity),
            format!("{:.2}", r.energy.heating_w),
            format!("{:.2}", r.energy.cooling_w),
            format!("{:.2}", r.energy.humidity_w),
            format!("{:.2}", r.energy.fan_w),
            format!("{:.4}", r.energy.energy_wh),
            r.sensor_fault.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
