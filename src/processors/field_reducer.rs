use crate::archive::open_source;
use crate::error::{ProcessingError, Result};
use crate::models::{SchemaMap, REDUCED_HEADER, SYNOP_FIELDS};
use crate::utils::constants::{RAW_DELIMITER, REDUCED_DELIMITER};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReductionSummary {
    pub source: PathBuf,
    pub rows: usize,
}

/// Prunes raw SYNOP exports down to the seven kept columns.
pub struct FieldReducer {
    delimiter: u8,
}

impl FieldReducer {
    pub fn new() -> Self {
        Self {
            delimiter: RAW_DELIMITER,
        }
    }

    /// Reduce a raw stream. The first row is the header; every later row is projected as is.
    ///
    /// `source` only labels errors.
    pub fn reduce<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
        source: &Path,
    ) -> Result<ReductionSummary> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(input);

        let mut records = reader.records();
        let header = match records.next() {
            Some(header) => header?,
            None => StringRecord::new(),
        };
        let schema = SchemaMap::resolve(&header, source)?;
        debug!(
            "Resolved {} columns in {}: {:?}",
            SYNOP_FIELDS.len(),
            source.display(),
            schema.positions()
        );

        let mut writer = WriterBuilder::new()
            .delimiter(REDUCED_DELIMITER)
            .from_writer(output);
        writer.write_record(REDUCED_HEADER)?;

        let mut rows = 0;
        for record in records {
            let record = record?;
            writer.write_record(schema.project(&record).as_fields())?;
            rows += 1;
        }
        writer.flush()?;

        Ok(ReductionSummary {
            source: source.to_path_buf(),
            rows,
        })
    }

    /// Resolve the header of `input` without reducing anything.
    pub fn check_schema(&self, input: &Path) -> Result<SchemaMap> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(open_source(input)?);

        let header = match reader.records().next() {
            Some(header) => header?,
            None => StringRecord::new(),
        };
        SchemaMap::resolve(&header, input)
    }

    /// Reduce `input` (plain or gzip) into `output`.
    ///
    /// The output only appears once the whole file has been reduced.
    pub fn reduce_file(&self, input: &Path, output: &Path) -> Result<ReductionSummary> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }

        let partial = partial_path(output)?;
        let result = File::create(&partial)
            .map_err(ProcessingError::from)
            .and_then(|file| self.reduce(open_source(input)?, BufWriter::new(file), input));

        match result {
            Ok(summary) => {
                fs::rename(&partial, output)?;
                info!(
                    "Reduced {} rows from {} into {}",
                    summary.rows,
                    input.display(),
                    output.display()
                );
                Ok(summary)
            }
            Err(e) => {
                let _ = fs::remove_file(&partial);
                Err(e)
            }
        }
    }
}

impl Default for FieldReducer {
    fn default() -> Self {
        Self::new()
    }
}

fn partial_path(output: &Path) -> Result<PathBuf> {
    let name = output
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ProcessingError::InvalidFormat("Invalid output path".to_string()))?;
    Ok(output.with_file_name(format!("{}.partial", name)))
}
