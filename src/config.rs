use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DEFAULT_BIN_WIDTH, DEFAULT_HOUR_A, DEFAULT_HOUR_B, DEFAULT_MIN_WIND_SPEED,
    DEFAULT_STATION_ID, ENV_PREFIX,
};

/// Parameters of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PipelineConfig {
    pub station_id: u32,

    #[validate(range(max = 23))]
    pub hour_a: u32,

    #[validate(range(max = 23))]
    pub hour_b: u32,

    #[validate(range(min = 0.0))]
    pub min_wind_speed: f64,

    #[validate(range(min = 0.0, max = 360.0))]
    pub bin_width: f64,
}

/// Values given explicitly on the command line. They win over every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub station_id: Option<u32>,
    pub hour_a: Option<u32>,
    pub hour_b: Option<u32>,
    pub min_wind_speed: Option<f64>,
    pub bin_width: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            station_id: DEFAULT_STATION_ID,
            hour_a: DEFAULT_HOUR_A,
            hour_b: DEFAULT_HOUR_B,
            min_wind_speed: DEFAULT_MIN_WIND_SPEED,
            bin_width: DEFAULT_BIN_WIDTH,
        }
    }
}

impl PipelineConfig {
    pub fn for_station(station_id: u32) -> Self {
        Self {
            station_id,
            ..Self::default()
        }
    }

    /// Layer defaults, an optional config file and `SYNOP_WIND_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("station_id", defaults.station_id as i64)?
            .set_default("hour_a", defaults.hour_a as i64)?
            .set_default("hour_b", defaults.hour_b as i64)?
            .set_default("min_wind_speed", defaults.min_wind_speed)?
            .set_default("bin_width", defaults.bin_width)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let config: PipelineConfig = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.check()?;
        Ok(config)
    }

    /// Range checks, reported as configuration errors.
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| ProcessingError::Config(format!("Invalid pipeline configuration: {}", e)))
    }

    pub fn with_overrides(mut self, overrides: &ConfigOverrides) -> Result<Self> {
        if let Some(station_id) = overrides.station_id {
            self.station_id = station_id;
        }
        if let Some(hour_a) = overrides.hour_a {
            self.hour_a = hour_a;
        }
        if let Some(hour_b) = overrides.hour_b {
            self.hour_b = hour_b;
        }
        if let Some(min_wind_speed) = overrides.min_wind_speed {
            self.min_wind_speed = min_wind_speed;
        }
        if let Some(bin_width) = overrides.bin_width {
            self.bin_width = bin_width;
        }

        self.check()?;
        Ok(self)
    }
}
