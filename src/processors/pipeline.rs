use crate::analyzers::WindCorrelation;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::models::{DayTable, WindHistogram};
use crate::processors::DayPivoter;
use crate::readers::{ExtractionReport, StationExtractor};
use crate::utils::progress::ProgressReporter;
use std::path::PathBuf;

/// Everything one pipeline pass produces for a station.
#[derive(Debug)]
pub struct PipelineOutput {
    pub report: ExtractionReport,
    pub table: DayTable,
    pub histogram: WindHistogram,
}

/// Extract, pivot and correlate one station, stage after stage.
pub struct WindPipeline {
    config: PipelineConfig,
    max_workers: usize,
    strict: bool,
    use_mmap: bool,
}

impl WindPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            max_workers: 1,
            strict: false,
            use_mmap: false,
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_mmap(mut self, use_mmap: bool) -> Self {
        self.use_mmap = use_mmap;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn extractor(&self) -> StationExtractor {
        StationExtractor::new(self.max_workers)
            .with_strict(self.strict)
            .with_mmap(self.use_mmap)
    }

    /// Extract and pivot only.
    pub fn build_day_table(
        &self,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<(DayTable, ExtractionReport)> {
        if let Some(p) = progress {
            p.set_message(&format!("Extracting station {}...", self.config.station_id));
        }
        let series = self
            .extractor()
            .extract(self.config.station_id, paths, progress)?;

        if let Some(p) = progress {
            p.set_message("Pivoting observations per day...");
        }
        let table = DayPivoter::new().pivot(series.station_id, &series.observations);

        Ok((table, series.report))
    }

    /// Run every stage. Configuration problems fail before any file is read.
    pub fn run(
        &self,
        paths: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<PipelineOutput> {
        self.config.check()?;
        let correlation = WindCorrelation::from_config(&self.config)?;

        let (table, report) = self.build_day_table(paths, progress)?;

        if let Some(p) = progress {
            p.set_message("Correlating wind directions...");
        }
        let histogram = correlation.compute(&table);

        if let Some(p) = progress {
            p.finish_with_message(&format!("Counted {} days", histogram.total));
        }

        Ok(PipelineOutput {
            report,
            table,
            histogram,
        })
    }
}
