use crate::error::{ProcessingError, Result};
use crate::models::{column_names, DayRow, DayTable, WeatherField};
use crate::utils::constants::{DEFAULT_ROW_GROUP_SIZE, HOURS_PER_DAY};
use arrow::array::{Array, ArrayRef, Date32Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression, GzipLevel, ZstdLevel};
use parquet::file::properties::WriterProperties;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

const STATION_ID_KEY: &str = "station_id";

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Writes per-day tables as Parquet: a `date` column followed by the 120 hour columns.
pub struct ParquetWriter {
    compression: Compression,
    row_group_size: usize,
}

impl ParquetWriter {
    pub fn new() -> Self {
        Self {
            compression: Compression::SNAPPY,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
        }
    }

    pub fn with_compression(mut self, compression: &str) -> Result<Self> {
        self.compression = match compression.to_lowercase().as_str() {
            "snappy" => Compression::SNAPPY,
            "gzip" => Compression::GZIP(GzipLevel::default()),
            "lz4" => Compression::LZ4,
            "zstd" => Compression::ZSTD(ZstdLevel::default()),
            "none" => Compression::UNCOMPRESSED,
            _ => {
                return Err(ProcessingError::Config(format!(
                    "Unsupported compression: {}",
                    compression
                )))
            }
        };
        Ok(self)
    }

    pub fn write_day_table(&self, table: &DayTable, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let schema = self.create_schema(table.station_id);
        let file = File::create(path)?;
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        for chunk in table.rows.chunks(self.row_group_size.max(1)) {
            let batch = self.rows_to_batch(chunk, schema.clone())?;
            writer.write(&batch)?;
        }
        writer.close()?;

        Ok(())
    }

    fn create_schema(&self, station_id: u32) -> Arc<Schema> {
        let mut fields = vec![Field::new("date", DataType::Date32, false)];
        fields.extend(
            column_names()
                .into_iter()
                .map(|name| Field::new(name, DataType::Float64, true)),
        );

        let metadata = HashMap::from([(STATION_ID_KEY.to_string(), station_id.to_string())]);
        Arc::new(Schema::new_with_metadata(fields, metadata))
    }

    fn rows_to_batch(&self, rows: &[DayRow], schema: Arc<Schema>) -> Result<RecordBatch> {
        let dates: Vec<i32> = rows
            .iter()
            .map(|r| (r.date - epoch()).num_days() as i32)
            .collect();

        let mut columns: Vec<ArrayRef> = Vec::with_capacity(1 + 5 * HOURS_PER_DAY);
        columns.push(Arc::new(Date32Array::from(dates)));

        for field in WeatherField::ALL {
            for hour in 0..HOURS_PER_DAY {
                let values: Vec<Option<f64>> = rows
                    .iter()
                    .map(|r| r.field_values(field)[hour])
                    .collect();
                columns.push(Arc::new(Float64Array::from(values)));
            }
        }

        Ok(RecordBatch::try_new(schema, columns)?)
    }

    /// Read a day table back, up to `limit` rows (0 = all).
    pub fn read_day_table(&self, path: &Path, limit: usize) -> Result<DayTable> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let station_id = builder
            .schema()
            .metadata()
            .get(STATION_ID_KEY)
            .and_then(|v| v.parse::<u32>().ok())
            .ok_or_else(|| {
                ProcessingError::MissingData(format!(
                    "No station id in {}",
                    path.display()
                ))
            })?;

        let mut rows = Vec::new();
        for batch in builder.build()? {
            let batch = batch?;
            self.batch_to_rows(&batch, &mut rows)?;
            if limit > 0 && rows.len() >= limit {
                rows.truncate(limit);
                break;
            }
        }

        Ok(DayTable {
            station_id,
            rows,
            overwritten_cells: 0,
        })
    }

    fn batch_to_rows(&self, batch: &RecordBatch, rows: &mut Vec<DayRow>) -> Result<()> {
        let dates = batch
            .column_by_name("date")
            .and_then(|c| c.as_any().downcast_ref::<Date32Array>())
            .ok_or_else(|| ProcessingError::InvalidFormat("Invalid date column".to_string()))?;

        let start = rows.len();
        for i in 0..batch.num_rows() {
            let date = epoch() + chrono::Duration::days(dates.value(i) as i64);
            rows.push(DayRow::new(date));
        }

        for field in WeatherField::ALL {
            for hour in 0..HOURS_PER_DAY as u32 {
                let name = field.column_name(hour);
                let values = batch
                    .column_by_name(&name)
                    .and_then(|c| c.as_any().downcast_ref::<Float64Array>())
                    .ok_or_else(|| {
                        ProcessingError::InvalidFormat(format!("Invalid {} column", name))
                    })?;

                for (i, row) in rows[start..].iter_mut().enumerate() {
                    if values.is_valid(i) {
                        row.set(field, hour, Some(values.value(i)));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn get_file_info(&self, path: &Path) -> Result<ParquetFileInfo> {
        use parquet::file::reader::{FileReader, SerializedFileReader};

        let file = File::open(path)?;
        let reader = SerializedFileReader::new(file)?;
        let metadata = reader.metadata();

        let row_groups = metadata.num_row_groups();
        let total_rows = metadata.file_metadata().num_rows();
        let file_size = std::fs::metadata(path)?.len();

        Ok(ParquetFileInfo {
            total_rows,
            row_groups: row_groups as i32,
            columns: metadata.file_metadata().schema_descr().num_columns(),
            file_size,
            compression: self.compression,
        })
    }
}

impl Default for ParquetWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct ParquetFileInfo {
    pub total_rows: i64,
    pub row_groups: i32,
    pub columns: usize,
    pub file_size: u64,
    pub compression: Compression,
}

impl ParquetFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "Parquet File Summary:\n\
            - Days: {}\n\
            - Columns: {}\n\
            - Row groups: {}\n\
            - File size: {:.2} MB\n\
            - Compression: {:?}",
            self.total_rows,
            self.columns,
            self.row_groups,
            self.file_size as f64 / 1_048_576.0,
            self.compression,
        )
    }
}
