use crate::error::{ProcessingError, Result};
use crate::models::Observation;
use crate::readers::station_reader::{FileExtraction, SkippedRow, StationReader};
use crate::utils::progress::ProgressReporter;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A file whose scan was abandoned, with the error that stopped it.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: ProcessingError,
}

#[derive(Debug, Default)]
pub struct ExtractionReport {
    pub files_scanned: usize,
    pub rows_read: usize,
    pub observations: usize,
    pub skipped_rows: Vec<SkippedRow>,
    pub failed_files: Vec<FileFailure>,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.failed_files.is_empty()
    }

    pub fn generate_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("Extraction Report\n");
        summary.push_str("=================\n");
        summary.push_str(&format!("Files scanned: {}\n", self.files_scanned));
        summary.push_str(&format!("Rows read: {}\n", self.rows_read));
        summary.push_str(&format!("Observations kept: {}\n", self.observations));
        summary.push_str(&format!("Rows skipped: {}\n", self.skipped_rows.len()));
        summary.push_str(&format!("Files failed: {}\n", self.failed_files.len()));

        if !self.failed_files.is_empty() {
            summary.push_str("\nFailed files:\n");
            for failure in self.failed_files.iter().take(10) {
                summary.push_str(&format!(
                    "  - {}: {}\n",
                    failure.path.display(),
                    failure.error
                ));
            }
            if self.failed_files.len() > 10 {
                summary.push_str(&format!(
                    "  ... and {} more\n",
                    self.failed_files.len() - 10
                ));
            }
        }

        summary
    }
}

/// Observations of one station across a set of reduced files.
#[derive(Debug)]
pub struct StationSeries {
    pub station_id: u32,
    pub observations: Vec<Observation>,
    pub report: ExtractionReport,
}

/// Collects one station's observations from many reduced files.
///
/// Files may be scanned on several threads; results are always merged in input order.
/// A corrupt row of the station drops its whole file, unless `strict` is set, in which
/// case it fails the extraction.
pub struct StationExtractor {
    max_workers: usize,
    strict: bool,
    use_mmap: bool,
}

impl StationExtractor {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            strict: false,
            use_mmap: false,
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn extract(
        &self,
        station_id: u32,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<StationSeries> {
        let scans = self.scan_files(station_id, paths, progress)?;

        let mut observations = Vec::new();
        let mut report = ExtractionReport::default();

        for (path, scan) in paths.iter().zip(scans) {
            report.files_scanned += 1;

            let extraction = match scan {
                Ok(extraction) => extraction,
                Err(error) => {
                    self.record_failure(&mut report, path, error)?;
                    continue;
                }
            };

            report.rows_read += extraction.rows_read;
            report.skipped_rows.extend(extraction.skipped);

            match extraction.failure {
                Some(error) => self.record_failure(&mut report, path, error)?,
                None => observations.extend(extraction.observations),
            }
        }

        report.observations = observations.len();
        info!(
            "Station {}: {} observations from {} files ({} rows skipped, {} files failed)",
            station_id,
            observations.len(),
            report.files_scanned,
            report.skipped_rows.len(),
            report.failed_files.len()
        );

        Ok(StationSeries {
            station_id,
            observations,
            report,
        })
    }

    fn scan_files(
        &self,
        station_id: u32,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<Vec<Result<FileExtraction>>> {
        let scan = |path: &PathBuf| {
            let result = StationReader::with_mmap(self.use_mmap).read_file(path, station_id);
            if let Some(p) = progress {
                p.increment(1);
            }
            result
        };

        if self.max_workers == 1 || paths.len() < 2 {
            return Ok(paths.iter().map(scan).collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .build()
            .map_err(|e| ProcessingError::Config(e.to_string()))?;

        Ok(pool.install(|| paths.par_iter().map(scan).collect()))
    }

    fn record_failure(
        &self,
        report: &mut ExtractionReport,
        path: &Path,
        error: ProcessingError,
    ) -> Result<()> {
        if self.strict {
            return Err(error);
        }

        warn!("Dropping {}: {}", path.display(), error);
        report.failed_files.push(FileFailure {
            path: path.to_path_buf(),
            error,
        });
        Ok(())
    }
}

impl Default for StationExtractor {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}
