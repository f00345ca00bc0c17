use crate::archive::open_source;
use crate::error::{ProcessingError, Result};
use crate::models::{Observation, REDUCED_HEADER};
use crate::utils::constants::{GZIP_EXTENSION, MISSING_VALUE, REDUCED_DELIMITER, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use csv::{ByteRecord, ReaderBuilder};
use memmap2::Mmap;
use std::borrow::Cow;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Why a row contributed nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Field 0 is not an integer: a repeated header, a junk line or undecodable bytes.
    InvalidStationId { raw: String },
    OtherStation(u32),
}

/// Result of looking at one reduced row for a target station.
#[derive(Debug)]
pub enum RowOutcome {
    Observation(Observation),
    Skip(SkipReason),
    /// The row belongs to the target station but cannot be read.
    Fatal(ProcessingError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub path: PathBuf,
    pub line: u64,
    pub raw: String,
}

/// Everything one reduced file yielded for a station.
#[derive(Debug)]
pub struct FileExtraction {
    pub path: PathBuf,
    pub rows_read: usize,
    pub observations: Vec<Observation>,
    pub skipped: Vec<SkippedRow>,
    /// First fatal row error; reading stopped there.
    pub failure: Option<ProcessingError>,
}

pub struct StationReader {
    use_mmap: bool,
}

impl StationReader {
    pub fn new() -> Self {
        Self { use_mmap: false }
    }

    pub fn with_mmap(use_mmap: bool) -> Self {
        Self { use_mmap }
    }

    /// Read the rows of `station_id` from one reduced file.
    ///
    /// Only I/O problems are returned as `Err`; corrupt rows of the station end the scan
    /// and land in `FileExtraction::failure`. Gzipped files are always streamed.
    pub fn read_file(&self, path: &Path, station_id: u32) -> Result<FileExtraction> {
        let compressed = path.extension().is_some_and(|ext| ext == GZIP_EXTENSION);
        if self.use_mmap && !compressed {
            self.read_file_mmap(path, station_id)
        } else {
            self.read_from(open_source(path)?, path, station_id)
        }
    }

    fn read_file_mmap(&self, path: &Path, station_id: u32) -> Result<FileExtraction> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return self.read_from(std::io::empty(), path, station_id);
        }
        let mmap = unsafe { Mmap::map(&file)? };
        self.read_from(&mmap[..], path, station_id)
    }

    pub fn read_from<R: Read>(
        &self,
        input: R,
        path: &Path,
        station_id: u32,
    ) -> Result<FileExtraction> {
        let mut reader = ReaderBuilder::new()
            .delimiter(REDUCED_DELIMITER)
            .has_headers(true)
            .flexible(true)
            .from_reader(input);

        let header = reader.byte_headers()?;
        if !header.is_empty() && header.iter().ne(REDUCED_HEADER.iter().map(|h| h.as_bytes())) {
            warn!("Unexpected header in {}: {}", path.display(), lossy_row(header));
        }

        let mut extraction = FileExtraction {
            path: path.to_path_buf(),
            rows_read: 0,
            observations: Vec::new(),
            skipped: Vec::new(),
            failure: None,
        };

        let mut record = ByteRecord::new();
        while reader.read_byte_record(&mut record)? {
            extraction.rows_read += 1;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(extraction.rows_read as u64 + 1);

            match classify_row(&record, station_id, path, line) {
                RowOutcome::Observation(observation) => extraction.observations.push(observation),
                RowOutcome::Skip(SkipReason::InvalidStationId { raw }) => {
                    warn!("Skipping row {} of {}: '{}'", line, path.display(), raw);
                    extraction.skipped.push(SkippedRow {
                        path: path.to_path_buf(),
                        line,
                        raw,
                    });
                }
                RowOutcome::Skip(SkipReason::OtherStation(_)) => {}
                RowOutcome::Fatal(error) => {
                    extraction.failure = Some(error);
                    break;
                }
            }
        }

        debug!(
            "{}: {} rows, {} observations for station {}",
            path.display(),
            extraction.rows_read,
            extraction.observations.len(),
            station_id
        );

        Ok(extraction)
    }
}

impl Default for StationReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide what a reduced row means for `station_id`.
///
/// Only field 0 is decoded for rows of other stations, so stray bytes elsewhere in the
/// file never stop the scan.
pub fn classify_row(record: &ByteRecord, station_id: u32, path: &Path, line: u64) -> RowOutcome {
    let row_station = std::str::from_utf8(record.get(0).unwrap_or_default())
        .ok()
        .and_then(|raw_id| raw_id.trim().parse::<u32>().ok());
    let row_station = match row_station {
        Some(id) => id,
        None => {
            return RowOutcome::Skip(SkipReason::InvalidStationId {
                raw: lossy_row(record),
            })
        }
    };

    if row_station != station_id {
        return RowOutcome::Skip(SkipReason::OtherStation(row_station));
    }

    let raw_date = field_text(record, 1);
    let raw_date = raw_date.trim();
    let timestamp = match NaiveDateTime::parse_from_str(raw_date, TIMESTAMP_FORMAT) {
        Ok(naive) => naive.and_utc(),
        Err(_) => {
            return RowOutcome::Fatal(ProcessingError::MalformedTimestamp {
                path: path.to_path_buf(),
                line,
                raw: raw_date.to_string(),
            })
        }
    };

    let mut values = [None; 5];
    for (offset, slot) in values.iter_mut().enumerate() {
        let column = offset + 2;
        let raw = field_text(record, column);
        match parse_value(&raw) {
            Some(value) => *slot = value,
            None => {
                return RowOutcome::Fatal(ProcessingError::MalformedValue {
                    path: path.to_path_buf(),
                    line,
                    field: REDUCED_HEADER[column].to_string(),
                    raw: raw.to_string(),
                })
            }
        }
    }

    RowOutcome::Observation(Observation::new(timestamp, values))
}

fn field_text(record: &ByteRecord, index: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(record.get(index).unwrap_or_default())
}

fn lossy_row(record: &ByteRecord) -> String {
    record
        .iter()
        .map(String::from_utf8_lossy)
        .collect::<Vec<_>>()
        .join(",")
}

/// `mq` and empty cells are missing; anything else must be a finite number.
/// Returns `None` when the cell is neither.
pub fn parse_value(raw: &str) -> Option<Option<f64>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == MISSING_VALUE {
        return Some(None);
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
}
