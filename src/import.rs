//! CSV import for mean-maximal-power curves
//!
//! The CLI accepts curves as two-column CSV (`duration,power`), one sample
//! per row, seconds and watts. Assembly of the curve itself from activity
//! recordings happens upstream.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::models::MmpCurve;

#[derive(Debug, Deserialize)]
struct CurveRecord {
    duration: f64,
    power: f64,
}

/// Read an MMP curve from a CSV file with a `duration,power` header.
pub fn read_mmp_csv(path: &Path) -> Result<MmpCurve> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    read_curve(reader)
}

/// Read an MMP curve from any reader producing `duration,power` CSV.
pub fn read_mmp_reader<R: Read>(source: R) -> Result<MmpCurve> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    read_curve(reader)
}

fn read_curve<R: Read>(mut reader: csv::Reader<R>) -> Result<MmpCurve> {
    let mut durations = Vec::new();
    let mut powers = Vec::new();

    for record in reader.deserialize() {
        let record: CurveRecord = record?;
        durations.push(record.duration);
        powers.push(record.power);
    }

    Ok(MmpCurve::new(durations, powers)?)
}
