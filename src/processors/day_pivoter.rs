use crate::models::{DayRow, DayTable, Observation, WeatherField};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Turns an observation stream into one row per calendar day.
pub struct DayPivoter;

impl DayPivoter {
    pub fn new() -> Self {
        Self
    }

    /// Pivot observations of `station_id` into day rows sorted by date.
    ///
    /// Each observation fills the `{field}_{hour}` slots of its day. A later observation for
    /// the same day and hour replaces every field of the earlier one, missing values included.
    pub fn pivot(&self, station_id: u32, observations: &[Observation]) -> DayTable {
        let mut days: BTreeMap<NaiveDate, DayRow> = BTreeMap::new();
        let mut filled: HashSet<(NaiveDate, u32)> = HashSet::new();
        let mut overwritten_cells = 0;

        for observation in observations {
            let date = observation.day();
            let hour = observation.hour();
            let row = days.entry(date).or_insert_with(|| DayRow::new(date));

            if !filled.insert((date, hour)) {
                overwritten_cells += WeatherField::ALL.len();
                debug!(
                    "Station {}: {} {:02}h seen again, keeping the later values",
                    station_id, date, hour
                );
            }

            for field in WeatherField::ALL {
                row.set(field, hour, observation.value(field));
            }
        }

        let table = DayTable {
            station_id,
            rows: days.into_values().collect(),
            overwritten_cells,
        };
        info!("{}", table.summary());
        table
    }
}

impl Default for DayPivoter {
    fn default() -> Self {
        Self::new()
    }
}
