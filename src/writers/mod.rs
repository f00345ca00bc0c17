pub mod histogram_writer;
pub mod parquet_writer;

pub use histogram_writer::HistogramWriter;
pub use parquet_writer::{ParquetFileInfo, ParquetWriter};
