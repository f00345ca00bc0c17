use crate::config::PipelineConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DayRow, DayTable, WeatherField, WindHistogram};
use crate::utils::constants::{FULL_CIRCLE_DEG, HOURS_PER_DAY};
use tracing::{debug, info, warn};

/// Joint histogram of wind direction at two hours of the same day, restricted to days
/// where the wind blew at least `min_wind_speed` at both hours.
#[derive(Debug, Clone, PartialEq)]
pub struct WindCorrelation {
    hour_a: u32,
    hour_b: u32,
    min_wind_speed: f64,
    bin_width: f64,
    bins: usize,
}

impl WindCorrelation {
    pub fn new(hour_a: u32, hour_b: u32, min_wind_speed: f64, bin_width: f64) -> Result<Self> {
        for hour in [hour_a, hour_b] {
            if hour as usize >= HOURS_PER_DAY {
                return Err(ProcessingError::Config(format!(
                    "Hour {} is outside 0-23",
                    hour
                )));
            }
        }

        if min_wind_speed.is_nan() {
            return Err(ProcessingError::Config(
                "Minimum wind speed must be a number".to_string(),
            ));
        }

        let bins = bin_count(bin_width).ok_or_else(|| {
            ProcessingError::Config(format!(
                "Bin width {} does not divide 360 degrees evenly",
                bin_width
            ))
        })?;

        Ok(Self {
            hour_a,
            hour_b,
            min_wind_speed,
            bin_width,
            bins,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(
            config.hour_a,
            config.hour_b,
            config.min_wind_speed,
            config.bin_width,
        )
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// `[0, w, 2w, ..., 360]`
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.bins)
            .map(|i| {
                if i == self.bins {
                    FULL_CIRCLE_DEG
                } else {
                    i as f64 * self.bin_width
                }
            })
            .collect()
    }

    /// Bin of a direction. Anything outside `[0, 360)`, 360 itself included, goes to the last bin.
    pub fn bin_index(&self, direction: f64) -> usize {
        let last = self.bins - 1;
        if !(0.0..FULL_CIRCLE_DEG).contains(&direction) {
            return last;
        }
        ((direction / self.bin_width).floor() as usize).min(last)
    }

    pub fn passes_speed_filter(&self, row: &DayRow) -> bool {
        let fast_enough = |hour| {
            row.get(WeatherField::WindSpeed, hour)
                .is_some_and(|speed| speed >= self.min_wind_speed)
        };
        fast_enough(self.hour_a) && fast_enough(self.hour_b)
    }

    /// Directions at both hours for a day passing the speed filter.
    fn directions(&self, row: &DayRow) -> Option<(f64, f64)> {
        if !self.passes_speed_filter(row) {
            return None;
        }
        Some((
            row.get(WeatherField::WindDir, self.hour_a)?,
            row.get(WeatherField::WindDir, self.hour_b)?,
        ))
    }

    pub fn compute(&self, table: &DayTable) -> WindHistogram {
        let mut counts = vec![vec![0u64; self.bins]; self.bins];
        let mut total = 0u64;
        let mut missing_direction = 0u64;

        for row in &table.rows {
            match self.directions(row) {
                Some((dir_a, dir_b)) => {
                    counts[self.bin_index(dir_a)][self.bin_index(dir_b)] += 1;
                    total += 1;
                }
                None if self.passes_speed_filter(row) => {
                    missing_direction += 1;
                    debug!("{}: wind direction missing, day not binned", row.date);
                }
                None => {}
            }
        }

        if missing_direction > 0 {
            warn!(
                "Station {}: {} days passed the speed filter without a direction at {:02}h or {:02}h",
                table.station_id, missing_direction, self.hour_a, self.hour_b
            );
        }
        info!(
            "Station {}: {} of {} days counted ({} without direction)",
            table.station_id,
            total,
            table.len(),
            missing_direction
        );

        let edges = self.edges();
        WindHistogram {
            station_id: table.station_id,
            hour_a: self.hour_a,
            hour_b: self.hour_b,
            min_wind_speed: self.min_wind_speed,
            bin_width: self.bin_width,
            x_edges: edges.clone(),
            y_edges: edges,
            counts,
            total,
            missing_direction,
        }
    }
}

/// Number of bins of width `bin_width` in a full circle, if they tile it exactly.
fn bin_count(bin_width: f64) -> Option<usize> {
    if !bin_width.is_finite() || bin_width <= 0.0 || bin_width > FULL_CIRCLE_DEG {
        return None;
    }
    let bins = (FULL_CIRCLE_DEG / bin_width).round();
    ((bins * bin_width - FULL_CIRCLE_DEG).abs() < 1e-9).then_some(bins as usize)
}
