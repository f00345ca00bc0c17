use chrono::{Datelike, Local};
use std::path::{Path, PathBuf};

use crate::utils::constants::{ARCHIVE_PREFIX, CSV_EXTENSION, GZIP_EXTENSION};

fn today_stamp() -> String {
    let now = Local::now();
    format!("{:02}{:02}{:02}", now.year() % 100, now.month(), now.day())
}

/// Default day table path: output/synop-{station}-days-{YYMMDD}.parquet
pub fn generate_default_day_table_filename(station_id: u32) -> PathBuf {
    let filename = format!("synop-{}-days-{}.parquet", station_id, today_stamp());
    PathBuf::from("output").join(filename)
}

/// Default histogram path: output/synop-{station}-wind-{HH}h-{HH}h-{YYMMDD}.json
pub fn generate_default_histogram_filename(station_id: u32, hour_a: u32, hour_b: u32) -> PathBuf {
    let filename = format!(
        "synop-{}-wind-{:02}h-{:02}h-{}.json",
        station_id,
        hour_a,
        hour_b,
        today_stamp()
    );
    PathBuf::from("output").join(filename)
}

/// Name of the reduced file produced from a raw source file.
///
/// `synop.202001.csv.gz` and `synop.202001.csv` both reduce to `synop.202001.csv`.
pub fn reduced_file_name(source: &Path) -> Option<String> {
    let name = source.file_name()?.to_str()?;
    let name = name
        .strip_suffix(&format!(".{}", GZIP_EXTENSION))
        .unwrap_or(name);
    if name.ends_with(&format!(".{}", CSV_EXTENSION)) {
        Some(name.to_string())
    } else {
        Some(format!("{}.{}", name, CSV_EXTENSION))
    }
}

/// Source month `(year, month)` from names like `synop.202001.csv.gz`.
pub fn parse_source_month(file_name: &str) -> Option<(i32, u32)> {
    let stamp = file_name.strip_prefix(ARCHIVE_PREFIX)?.get(..6)?;
    if !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = stamp[..4].parse::<i32>().ok()?;
    let month = stamp[4..].parse::<u32>().ok()?;
    (1..=12).contains(&month).then_some((year, month))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_day_table_filename() {
        let filename = generate_default_day_table_filename(7481);
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.contains("synop-7481-days-"));
        assert!(filename_str.ends_with(".parquet"));
    }

    #[test]
    fn test_generate_default_histogram_filename() {
        let filename = generate_default_histogram_filename(7481, 6, 15);
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.contains("synop-7481-wind-06h-15h-"));
        assert!(filename_str.ends_with(".json"));
    }

    #[test]
    fn test_reduced_file_name() {
        assert_eq!(
            reduced_file_name(Path::new("raw/synop.202001.csv.gz")).as_deref(),
            Some("synop.202001.csv")
        );
        assert_eq!(
            reduced_file_name(Path::new("synop.202001.csv")).as_deref(),
            Some("synop.202001.csv")
        );
        assert_eq!(
            reduced_file_name(Path::new("export")).as_deref(),
            Some("export.csv")
        );
    }

    #[test]
    fn test_parse_source_month() {
        assert_eq!(parse_source_month("synop.202001.csv.gz"), Some((2020, 1)));
        assert_eq!(parse_source_month("synop.201512.csv"), Some((2015, 12)));
        assert_eq!(parse_source_month("synop.201513.csv"), None);
        assert_eq!(parse_source_month("postesSynop.csv"), None);
        assert_eq!(parse_source_month("synop.2020.csv"), None);
    }
}
