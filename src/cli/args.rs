use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigOverrides;

#[derive(Parser)]
#[command(name = "synop-wind")]
#[command(about = "Reduce Météo-France SYNOP archives and correlate daily wind directions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Log file path")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reduce raw synop.YYYYMM.csv[.gz] exports to the seven kept columns
    Reduce {
        #[arg(short, long, help = "Directory containing raw SYNOP exports")]
        input_dir: PathBuf,

        #[arg(short, long, help = "Directory receiving reduced CSV files")]
        output_dir: PathBuf,

        #[arg(
            long,
            help = "Filter to specific file pattern (e.g., 'synop.2020')",
            default_value = ""
        )]
        file_pattern: String,

        #[arg(long, help = "Also keep decompressed copies of .gz archives here")]
        extract_dir: Option<PathBuf>,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Pivot one station's observations into a per-day Parquet table
    Pivot {
        #[arg(short, long, help = "Directory containing reduced CSV files")]
        input_dir: PathBuf,

        #[arg(short, long)]
        station_id: u32,

        #[arg(
            short,
            long,
            help = "Output Parquet file path [default: synop-{station}-days-{YYMMDD}.parquet]"
        )]
        output_file: Option<PathBuf>,

        #[arg(short, long, default_value = "snappy")]
        compression: String,

        #[arg(long, default_value = "")]
        file_pattern: String,

        #[arg(long, help = "Abort on the first corrupt row instead of dropping its file")]
        strict: bool,

        #[arg(long, help = "Memory-map uncompressed input files")]
        mmap: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Histogram of wind direction at two hours of the day for one station
    Correlate {
        #[arg(short, long, help = "Directory containing reduced CSV files")]
        input_dir: PathBuf,

        #[arg(long, help = "Configuration file (TOML, JSON or YAML)")]
        config: Option<PathBuf>,

        #[arg(short, long)]
        station_id: Option<u32>,

        #[arg(long, help = "First hour of the day (0-23) [default: 6]")]
        hour_a: Option<u32>,

        #[arg(long, help = "Second hour of the day (0-23) [default: 15]")]
        hour_b: Option<u32>,

        #[arg(long, help = "Minimum wind speed at both hours, m/s [default: 5.0]")]
        min_wind_speed: Option<f64>,

        #[arg(long, help = "Direction bin width, must divide 360 [default: 20.0]")]
        bin_width: Option<f64>,

        #[arg(
            short,
            long,
            help = "Histogram JSON path [default: synop-{station}-wind-{HH}h-{HH}h-{YYMMDD}.json]"
        )]
        output_file: Option<PathBuf>,

        #[arg(long, help = "Also write the per-day table to this Parquet file")]
        day_table: Option<PathBuf>,

        #[arg(long, default_value = "")]
        file_pattern: String,

        #[arg(long)]
        strict: bool,

        #[arg(long, help = "Memory-map uncompressed input files")]
        mmap: bool,

        #[arg(long, default_value_t = num_cpus::get())]
        max_workers: usize,
    },

    /// Display information about a per-day Parquet table
    Info {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "10")]
        sample: usize,
    },
}

impl Commands {
    /// Pipeline parameters given explicitly to `correlate`.
    pub fn config_overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Correlate {
                station_id,
                hour_a,
                hour_b,
                min_wind_speed,
                bin_width,
                ..
            } => ConfigOverrides {
                station_id: *station_id,
                hour_a: *hour_a,
                hour_b: *hour_b,
                min_wind_speed: *min_wind_speed,
                bin_width: *bin_width,
            },
            _ => ConfigOverrides::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_correlate() {
        let cli = Cli::try_parse_from([
            "synop-wind",
            "correlate",
            "--input-dir",
            "data/reduced",
            "--station-id",
            "7630",
            "--hour-b",
            "18",
            "--bin-width",
            "30",
        ])
        .unwrap();

        let overrides = cli.command.config_overrides();
        assert_eq!(overrides.station_id, Some(7630));
        assert_eq!(overrides.hour_a, None);
        assert_eq!(overrides.hour_b, Some(18));
        assert_eq!(overrides.bin_width, Some(30.0));
    }

    #[test]
    fn test_parse_pivot_flags() {
        let cli = Cli::try_parse_from([
            "synop-wind",
            "pivot",
            "--input-dir",
            "data/reduced",
            "--station-id",
            "7481",
            "--mmap",
            "--strict",
        ])
        .unwrap();

        match cli.command {
            Commands::Pivot {
                station_id,
                mmap,
                strict,
                ..
            } => {
                assert_eq!(station_id, 7481);
                assert!(mmap);
                assert!(strict);
            }
            _ => panic!("expected pivot"),
        }
    }

    #[test]
    fn test_pivot_requires_station() {
        assert!(Cli::try_parse_from(["synop-wind", "pivot", "--input-dir", "data"]).is_err());
    }
}
