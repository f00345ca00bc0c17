use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::WeatherField;
use crate::utils::constants::HOURS_PER_DAY;

/// One calendar day of a station, with every field spread over 24 hour slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRow {
    pub date: NaiveDate,
    values: [[Option<f64>; HOURS_PER_DAY]; 5],
}

impl DayRow {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            values: [[None; HOURS_PER_DAY]; 5],
        }
    }

    pub fn get(&self, field: WeatherField, hour: u32) -> Option<f64> {
        self.values[field.index()]
            .get(hour as usize)
            .copied()
            .flatten()
    }

    /// Store a value, returning the one it replaced.
    pub fn set(&mut self, field: WeatherField, hour: u32, value: Option<f64>) -> Option<f64> {
        let slot = &mut self.values[field.index()][hour as usize];
        std::mem::replace(slot, value)
    }

    /// Lookup by column name such as `wind_dir_06`. Unknown names yield `None`.
    pub fn column(&self, name: &str) -> Option<f64> {
        let (field, hour) = parse_column_name(name)?;
        self.get(field, hour)
    }

    pub fn hours_with_data(&self) -> usize {
        (0..HOURS_PER_DAY)
            .filter(|&hour| self.values.iter().any(|field| field[hour].is_some()))
            .count()
    }

    pub fn field_values(&self, field: WeatherField) -> &[Option<f64>; HOURS_PER_DAY] {
        &self.values[field.index()]
    }
}

/// All 120 column names, field-major: `wind_dir_00 .. wind_dir_23, wind_speed_00 ..`.
pub fn column_names() -> Vec<String> {
    WeatherField::ALL
        .iter()
        .flat_map(|field| (0..HOURS_PER_DAY as u32).map(move |hour| field.column_name(hour)))
        .collect()
}

pub fn parse_column_name(name: &str) -> Option<(WeatherField, u32)> {
    let (prefix, hour) = name.rsplit_once('_')?;
    if hour.len() != 2 {
        return None;
    }
    let hour = hour.parse::<u32>().ok()?;
    if hour as usize >= HOURS_PER_DAY {
        return None;
    }
    Some((WeatherField::parse(prefix)?, hour))
}

/// Pivoted observations of one station, sorted by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayTable {
    pub station_id: u32,
    pub rows: Vec<DayRow>,
    pub overwritten_cells: usize,
}

impl DayTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.rows.first()?.date, self.rows.last()?.date))
    }

    pub fn summary(&self) -> String {
        match self.date_range() {
            Some((first, last)) => format!(
                "Station {}: {} days from {} to {} ({} same-hour values overwritten)",
                self.station_id,
                self.rows.len(),
                first,
                last,
                self.overwritten_cells
            ),
            None => format!("Station {}: no observations", self.station_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_names() {
        let names = column_names();
        assert_eq!(names.len(), 120);
        assert_eq!(names[0], "wind_dir_00");
        assert_eq!(names[23], "wind_dir_23");
        assert_eq!(names[24], "wind_speed_00");
        assert_eq!(names[119], "gust_ten_23");
    }

    #[test]
    fn test_parse_column_name() {
        assert_eq!(
            parse_column_name("wind_speed_06"),
            Some((WeatherField::WindSpeed, 6))
        );
        assert_eq!(parse_column_name("gust_ten_23"), Some((WeatherField::GustTen, 23)));
        assert_eq!(parse_column_name("gust_ten_24"), None);
        assert_eq!(parse_column_name("wind_speed_6"), None);
        assert_eq!(parse_column_name("pressure_06"), None);
    }

    #[test]
    fn test_set_and_lookup() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut row = DayRow::new(date);

        assert_eq!(row.set(WeatherField::WindSpeed, 6, Some(10.0)), None);
        assert_eq!(row.set(WeatherField::WindSpeed, 6, Some(20.0)), Some(10.0));
        assert_eq!(row.column("wind_speed_06"), Some(20.0));
        assert_eq!(row.column("wind_speed_07"), None);
        assert_eq!(row.get(WeatherField::WindSpeed, 30), None);
        assert_eq!(row.hours_with_data(), 1);
    }
}
