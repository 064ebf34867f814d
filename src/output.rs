use std::path::Path;
use std::{fs::File, io::BufWriter};

use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;

use crate::sweep::SweepResult;

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> SweepResult {
        SweepResult {
            wavelengths: vec![400.0, 500.0],
            angles: vec![0.0, std::f64::consts::FRAC_PI_6],
            reflected: array![[0.1, 0.2], [0.3, 0.4]],
            transmitted: array![[0.9, 0.7], [0.6, 0.5]],
        }
    }

    #[test]
    fn table_rows() {
        let path = std::env::temp_dir().join("thinfilm_output_table.dat");
        write_table(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<Vec<f64>> = text
            .lines()
            .filter(|line| !line.starts_with('#'))
            .map(|line| line.split_whitespace().map(|v| v.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1][0], 400.0);
        assert!((rows[1][1] - 30.0).abs() < 1e-9);
        assert!((rows[1][4] - 0.1).abs() < 1e-9);
        assert_eq!(rows[2][2], 0.3);
    }

    #[test]
    fn json_records() {
        let path = std::env::temp_dir().join("thinfilm_output.json");
        write_json(&sample(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[3]["wavelength"], 500.0);
        assert_eq!(records[3]["transmitted"], 0.5);
    }
}

/// One grid point of a sweep, as written to disk.
#[derive(Debug, Serialize)]
struct Record {
    wavelength: f64,
    angle_deg: f64,
    reflected: f64,
    transmitted: f64,
    absorbed: f64,
}

fn records(result: &SweepResult) -> Vec<Record> {
    let mut records = Vec::with_capacity(result.wavelengths.len() * result.angles.len());
    for (i, wavelength) in result.wavelengths.iter().enumerate() {
        for (j, angle) in result.angles.iter().enumerate() {
            let powers = result.powers(i, j);
            records.push(Record {
                wavelength: *wavelength,
                angle_deg: angle.to_degrees(),
                reflected: powers.reflected,
                transmitted: powers.transmitted,
                absorbed: powers.absorbed(),
            });
        }
    }
    records
}

/// Write the sweep as whitespace-separated columns, one grid point per row.
pub fn write_table(result: &SweepResult, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# wavelength angle_deg reflected transmitted absorbed")?;
    for record in records(result) {
        writeln!(
            writer,
            "{} {} {} {} {}",
            record.wavelength,
            record.angle_deg,
            record.reflected,
            record.transmitted,
            record.absorbed
        )?;
    }
    writer.flush()?;

    Ok(())
}

/// Write the sweep as a JSON array of records.
pub fn write_json(result: &SweepResult, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &records(result))?;
    writer.flush()?;
    Ok(())
}

/// Write the sweep, choosing the format from the file extension.
pub fn write(result: &SweepResult, path: &Path) -> Result<()> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => write_json(result, path),
        _ => write_table(result, path),
    }
}
