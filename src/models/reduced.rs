use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ProcessingError, Result};

/// One column kept from the raw SYNOP export, with its reduced name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub source_name: &'static str,
    pub output_name: &'static str,
    pub description: &'static str,
}

/// Columns kept from the raw export, in reduced output order.
///
/// Parameter names follow Météo-France's SYNOP parameter documentation.
pub const SYNOP_FIELDS: [FieldMapping; 7] = [
    FieldMapping {
        source_name: "numer_sta",
        output_name: "station_id",
        description: "Station number",
    },
    FieldMapping {
        source_name: "date",
        output_name: "date",
        description: "Acquisition date, YYYYMMDDHHMMSS, UTC",
    },
    FieldMapping {
        source_name: "dd",
        output_name: "wind_dir",
        description: "Wind direction, degrees",
    },
    FieldMapping {
        source_name: "ff",
        output_name: "wind_speed",
        description: "Wind speed, m/s",
    },
    FieldMapping {
        source_name: "t",
        output_name: "temperature",
        description: "Temperature, K",
    },
    FieldMapping {
        source_name: "u",
        output_name: "humidity",
        description: "Humidity, percent",
    },
    FieldMapping {
        source_name: "raf10",
        output_name: "gust_ten",
        description: "Gust over the last 10 minutes, m/s",
    },
];

pub const REDUCED_HEADER: [&str; 7] = [
    "station_id",
    "date",
    "wind_dir",
    "wind_speed",
    "temperature",
    "humidity",
    "gust_ten",
];

/// A raw row pruned to the seven kept columns. Values are untouched strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedRecord {
    pub station_id: String,
    pub date: String,
    pub wind_dir: String,
    pub wind_speed: String,
    pub temperature: String,
    pub humidity: String,
    pub gust_ten: String,
}

impl ReducedRecord {
    pub fn from_fields(fields: [String; 7]) -> Self {
        let [station_id, date, wind_dir, wind_speed, temperature, humidity, gust_ten] = fields;
        Self {
            station_id,
            date,
            wind_dir,
            wind_speed,
            temperature,
            humidity,
            gust_ten,
        }
    }

    pub fn as_fields(&self) -> [&str; 7] {
        [
            &self.station_id,
            &self.date,
            &self.wind_dir,
            &self.wind_speed,
            &self.temperature,
            &self.humidity,
            &self.gust_ten,
        ]
    }
}

/// Column positions of the kept fields, resolved once from a raw header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMap {
    positions: [usize; 7],
}

impl SchemaMap {
    /// Resolve every kept field against `header`. The first matching column wins.
    pub fn resolve(header: &StringRecord, path: &Path) -> Result<Self> {
        let mut positions = [0usize; 7];

        for (slot, mapping) in positions.iter_mut().zip(SYNOP_FIELDS.iter()) {
            *slot = header
                .iter()
                .position(|name| name.trim() == mapping.source_name)
                .ok_or_else(|| ProcessingError::Schema {
                    path: path.to_path_buf(),
                    field: mapping.source_name.to_string(),
                })?;
        }

        Ok(Self { positions })
    }

    pub fn positions(&self) -> &[usize; 7] {
        &self.positions
    }

    /// Project a raw row onto the kept columns. Cells past the end of a short row are empty.
    pub fn project(&self, row: &StringRecord) -> ReducedRecord {
        let fields = self
            .positions
            .map(|index| row.get(index).unwrap_or_default().to_string());
        ReducedRecord::from_fields(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_matches_mappings() {
        let names: Vec<&str> = SYNOP_FIELDS.iter().map(|m| m.output_name).collect();
        assert_eq!(names, REDUCED_HEADER.to_vec());
    }

    #[test]
    fn test_resolve_any_column_order() {
        let header = StringRecord::from(vec![
            "u", "raf10", "pmer", "date", "numer_sta", "t", "ff", "dd",
        ]);
        let schema = SchemaMap::resolve(&header, Path::new("synop.202001.csv")).unwrap();
        assert_eq!(schema.positions(), &[4, 3, 7, 6, 5, 0, 1]);

        let row = StringRecord::from(vec![
            "81", "7.2", "101320", "20200101060000", "07481", "275.15", "6.0", "10",
        ]);
        let reduced = schema.project(&row);
        assert_eq!(reduced.station_id, "07481");
        assert_eq!(reduced.wind_dir, "10");
        assert_eq!(reduced.gust_ten, "7.2");
    }

    #[test]
    fn test_resolve_missing_field() {
        let header = StringRecord::from(vec!["numer_sta", "date", "dd", "ff", "t", "u"]);
        let err = SchemaMap::resolve(&header, Path::new("raw.csv")).unwrap_err();
        match err {
            ProcessingError::Schema { field, .. } => assert_eq!(field, "raf10"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_project_short_row() {
        let header = StringRecord::from(vec!["numer_sta", "date", "dd", "ff", "t", "u", "raf10"]);
        let schema = SchemaMap::resolve(&header, Path::new("raw.csv")).unwrap();
        let reduced = schema.project(&StringRecord::from(vec!["7481", "20200101060000"]));
        assert_eq!(reduced.date, "20200101060000");
        assert_eq!(reduced.gust_ten, "");
    }
}
