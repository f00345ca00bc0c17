/// Source format markers
pub const MISSING_VALUE: &str = "mq";
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
pub const RAW_DELIMITER: u8 = b';';
pub const REDUCED_DELIMITER: u8 = b',';

/// File names
pub const ARCHIVE_PREFIX: &str = "synop.";
pub const CSV_EXTENSION: &str = "csv";
pub const GZIP_EXTENSION: &str = "gz";

/// Day layout
pub const HOURS_PER_DAY: usize = 24;
pub const FULL_CIRCLE_DEG: f64 = 360.0;

/// Pipeline defaults
pub const DEFAULT_STATION_ID: u32 = 7481;
pub const DEFAULT_HOUR_A: u32 = 6;
pub const DEFAULT_HOUR_B: u32 = 15;
pub const DEFAULT_MIN_WIND_SPEED: f64 = 5.0;
pub const DEFAULT_BIN_WIDTH: f64 = 20.0;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Environment prefix for configuration overrides, e.g. SYNOP_WIND_STATION_ID
pub const ENV_PREFIX: &str = "SYNOP_WIND";
