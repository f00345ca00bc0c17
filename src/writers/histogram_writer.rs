use crate::error::Result;
use crate::models::WindHistogram;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Hands histograms to plotting tools as a JSON document.
pub struct HistogramWriter {
    pretty: bool,
}

impl HistogramWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(pretty: bool) -> Self {
        Self { pretty }
    }

    pub fn write(&self, histogram: &WindHistogram, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = BufWriter::new(File::create(path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, histogram)?;
        } else {
            serde_json::to_writer(&mut writer, histogram)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read(&self, path: &Path) -> Result<WindHistogram> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl Default for HistogramWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_histogram_json_layout() -> Result<()> {
        let histogram = WindHistogram {
            station_id: 7481,
            hour_a: 6,
            hour_b: 15,
            min_wind_speed: 5.0,
            bin_width: 180.0,
            x_edges: vec![0.0, 180.0, 360.0],
            y_edges: vec![0.0, 180.0, 360.0],
            counts: vec![vec![0, 2], vec![1, 0]],
            total: 3,
            missing_direction: 1,
        };

        let dir = TempDir::new()?;
        let path = dir.path().join("hist").join("wind.json");
        HistogramWriter::with_pretty(false).write(&histogram, &path)?;

        let value: serde_json::Value = serde_json::from_slice(&std::fs::read(&path)?)?;
        assert_eq!(value["counts"][0][1], 2);
        assert_eq!(value["x_edges"][2], 360.0);
        assert_eq!(value["total"], 3);
        assert_eq!(value["missing_direction"], 1);

        assert_eq!(HistogramWriter::new().read(&path)?, histogram);
        Ok(())
    }
}
