use flate2::write::GzEncoder;
use flate2::Compression;
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use synop_wind::archive::SourceCatalog;
use synop_wind::config::PipelineConfig;
use synop_wind::error::ProcessingError;
use synop_wind::models::WeatherField;
use synop_wind::processors::{FieldReducer, WindPipeline};
use synop_wind::utils::reduced_file_name;
use synop_wind::writers::{HistogramWriter, ParquetWriter};
use tempfile::TempDir;

const RAW_HEADER: &str = "numer_sta;date;pmer;tend;cod_tend;dd;ff;t;td;u;vv;raf10;";
const REDUCED_HEADER: &str = "station_id,date,wind_dir,wind_speed,temperature,humidity,gust_ten";

fn raw_row(station: &str, date: &str, dd: &str, ff: &str) -> String {
    format!(
        "{};{};102600;10;1;{};{};275.150000;274.050000;93;20000;mq;",
        station, date, dd, ff
    )
}

fn write_gz(path: &Path, content: &str) {
    let mut encoder = GzEncoder::new(fs::File::create(path).unwrap(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

fn write_reduced(dir: &Path, name: &str, rows: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut content = format!("{}\n", REDUCED_HEADER);
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    fs::write(&path, content).unwrap();
    path
}

fn reduce_all(raw_dir: &Path, reduced_dir: &Path) -> Vec<PathBuf> {
    let catalog = SourceCatalog::scan(raw_dir, None).unwrap();
    let reducer = FieldReducer::new();
    catalog
        .files()
        .iter()
        .map(|source| {
            let output = reduced_dir.join(reduced_file_name(&source.path).unwrap());
            reducer.reduce_file(&source.path, &output).unwrap();
            output
        })
        .collect()
}

#[test]
fn test_raw_archives_to_histogram() {
    let dir = TempDir::new().unwrap();
    let raw_dir = dir.path().join("raw");
    let reduced_dir = dir.path().join("reduced");
    fs::create_dir_all(&raw_dir).unwrap();

    let january = [
        RAW_HEADER.to_string(),
        raw_row("07005", "20200101060000", "220", "9.000000"),
        raw_row("07481", "20200101060000", "10", "6.000000"),
        raw_row("07481", "20200101150000", "200", "6.000000"),
        // The monthly exports repeat their header every few thousand rows.
        RAW_HEADER.to_string(),
        raw_row("07481", "20200102060000", "350", "7.000000"),
        raw_row("07481", "20200102150000", "355", "8.500000"),
    ]
    .join("\n");
    let february = [
        RAW_HEADER.to_string(),
        raw_row("07481", "20200201060000", "90", "4.000000"),
        raw_row("07481", "20200201150000", "90", "12.000000"),
        raw_row("07481", "20200202060000", "mq", "6.000000"),
        raw_row("07481", "20200202150000", "180", "6.000000"),
    ]
    .join("\n");
    write_gz(&raw_dir.join("synop.202001.csv.gz"), &january);
    fs::write(raw_dir.join("synop.202002.csv"), february).unwrap();

    let reduced = reduce_all(&raw_dir, &reduced_dir);
    assert_eq!(
        reduced,
        vec![
            reduced_dir.join("synop.202001.csv"),
            reduced_dir.join("synop.202002.csv"),
        ]
    );
    let reduced_text = fs::read_to_string(&reduced[0]).unwrap();
    assert!(reduced_text.starts_with(REDUCED_HEADER));
    assert!(reduced_text.contains("numer_sta,date,dd,ff,t,u,raf10"));

    let output = WindPipeline::new(PipelineConfig::for_station(7481))
        .with_max_workers(2)
        .run(&reduced, None)
        .unwrap();

    assert!(output.report.is_clean());
    assert_eq!(output.report.files_scanned, 2);
    assert_eq!(output.report.skipped_rows.len(), 1);
    assert_eq!(output.table.len(), 4);

    let histogram = output.histogram;
    assert_eq!(histogram.bins(), 18);
    assert_eq!(histogram.total, 2);
    assert_eq!(histogram.count(0, 10), 1);
    assert_eq!(histogram.count(17, 17), 1);
    // 2020-02-02 clears 5 m/s at both hours but has no direction at 06h.
    assert_eq!(histogram.missing_direction, 1);

    let counted: u64 = histogram.counts.iter().flatten().sum();
    assert_eq!(counted, histogram.total);
}

#[test]
fn test_threshold_and_missing_values() {
    let dir = TempDir::new().unwrap();
    let path = write_reduced(
        dir.path(),
        "synop.202003.csv",
        &[
            "07481,20200301060000,10,4.9,mq,mq,mq",
            "07481,20200301150000,200,6.0,mq,mq,mq",
            "07481,20200302060000,10,5.0,mq,mq,mq",
            "07481,20200302150000,200,5.0,mq,mq,mq",
            "07481,20200303060000,10,mq,mq,mq,mq",
            "07481,20200303150000,200,6.0,mq,mq,mq",
        ],
    );

    let output = WindPipeline::new(PipelineConfig::for_station(7481))
        .run(&[path], None)
        .unwrap();

    assert_eq!(output.table.len(), 3);
    assert_eq!(output.histogram.total, 1);
    assert_eq!(output.histogram.count(0, 10), 1);

    let third = &output.table.rows[2];
    assert_eq!(third.get(WeatherField::WindSpeed, 6), None);
    assert_eq!(third.get(WeatherField::WindDir, 6), Some(10.0));
    assert_eq!(third.get(WeatherField::Temperature, 6), None);
}

#[test]
fn test_duplicate_hours_keep_last_value() {
    let dir = TempDir::new().unwrap();
    let first = write_reduced(
        dir.path(),
        "synop.202004.csv",
        &["07481,20200401060000,100,6.0,mq,mq,mq"],
    );
    let second = write_reduced(
        dir.path(),
        "synop.202004.bis.csv",
        &[
            "07481,20200401060000,10,6.0,mq,mq,mq",
            "07481,20200401150000,200,6.0,mq,mq,mq",
        ],
    );

    let output = WindPipeline::new(PipelineConfig::for_station(7481))
        .run(&[first, second], None)
        .unwrap();

    assert_eq!(output.table.len(), 1);
    assert_eq!(output.table.overwritten_cells, 5);
    assert_eq!(output.table.rows[0].get(WeatherField::WindDir, 6), Some(10.0));
    assert_eq!(output.histogram.count(0, 10), 1);
}

#[test]
fn test_corrupt_file_is_dropped_unless_strict() {
    let dir = TempDir::new().unwrap();
    let good = write_reduced(
        dir.path(),
        "synop.202005.csv",
        &[
            "07481,20200501060000,10,6.0,mq,mq,mq",
            "07481,20200501150000,200,6.0,mq,mq,mq",
        ],
    );
    let bad = write_reduced(
        dir.path(),
        "synop.202006.csv",
        &[
            "07481,20200601060000,10,6.0,mq,mq,mq",
            "07481,not-a-date,200,6.0,mq,mq,mq",
        ],
    );
    let paths = vec![good, bad.clone()];

    let output = WindPipeline::new(PipelineConfig::for_station(7481))
        .run(&paths, None)
        .unwrap();
    assert_eq!(output.report.failed_files.len(), 1);
    assert_eq!(output.report.failed_files[0].path, bad);
    assert!(matches!(
        output.report.failed_files[0].error,
        ProcessingError::MalformedTimestamp { line: 3, .. }
    ));
    assert_eq!(output.table.len(), 1);
    assert_eq!(output.histogram.total, 1);

    let err = WindPipeline::new(PipelineConfig::for_station(7481))
        .with_strict(true)
        .run(&paths, None)
        .unwrap_err();
    assert!(err.is_row_error());
}

#[test]
fn test_other_station_rows_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write_reduced(
        dir.path(),
        "synop.202007.csv",
        &[
            "07005,garbage,xx,yy,zz,ww,vv",
            "07481,20200701060000,45,6.0,290.15,60,9.0",
            "07481,20200701150000,45,6.0,295.15,55,9.5",
        ],
    );

    let output = WindPipeline::new(PipelineConfig {
        bin_width: 90.0,
        ..PipelineConfig::for_station(7481)
    })
    .run(&[path], None)
    .unwrap();

    assert!(output.report.is_clean());
    assert_eq!(output.histogram.bins(), 4);
    assert_eq!(output.histogram.count(0, 0), 1);
}

#[test]
fn test_outputs_are_written_and_read_back() {
    let dir = TempDir::new().unwrap();
    let path = write_reduced(
        dir.path(),
        "synop.202008.csv",
        &[
            "07481,20200801060000,270,8.0,288.15,70,11.0",
            "07481,20200801150000,280,9.0,293.15,50,12.0",
        ],
    );

    let output = WindPipeline::new(PipelineConfig::for_station(7481))
        .run(&[path], None)
        .unwrap();

    let table_path = dir.path().join("out").join("days.parquet");
    let parquet = ParquetWriter::new();
    parquet.write_day_table(&output.table, &table_path).unwrap();
    let table = parquet.read_day_table(&table_path, 0).unwrap();
    assert_eq!(table.station_id, 7481);
    assert_eq!(table.rows, output.table.rows);
    assert_eq!(table.rows[0].column("gust_ten_15"), Some(12.0));

    let histogram_path = dir.path().join("out").join("wind.json");
    let json = HistogramWriter::new();
    json.write(&output.histogram, &histogram_path).unwrap();
    assert_eq!(json.read(&histogram_path).unwrap(), output.histogram);
}

#[test]
fn test_gzipped_reduced_files_are_read() {
    let dir = TempDir::new().unwrap();
    let content = format!(
        "{}\n07481,20200901060000,10,6.0,mq,mq,mq\n07481,20200901150000,200,6.0,mq,mq,mq\n",
        REDUCED_HEADER
    );
    write_gz(&dir.path().join("synop.202009.csv.gz"), &content);
    write_reduced(
        dir.path(),
        "synop.202010.csv",
        &[
            "07481,20201001060000,10,6.0,mq,mq,mq",
            "07481,20201001150000,200,6.0,mq,mq,mq",
        ],
    );

    let catalog = SourceCatalog::scan(dir.path(), None).unwrap();
    assert_eq!(catalog.len(), 2);

    for use_mmap in [false, true] {
        let output = WindPipeline::new(PipelineConfig::for_station(7481))
            .with_max_workers(2)
            .with_mmap(use_mmap)
            .run(&catalog.paths(), None)
            .unwrap();

        assert!(output.report.is_clean());
        assert_eq!(output.report.observations, 4);
        assert_eq!(output.table.len(), 2);
        assert_eq!(output.histogram.count(0, 10), 2);
    }
}
