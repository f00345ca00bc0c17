pub mod station_extractor;
pub mod station_reader;

pub use station_extractor::{ExtractionReport, FileFailure, StationExtractor, StationSeries};
pub use station_reader::{
    classify_row, parse_value, FileExtraction, RowOutcome, SkipReason, SkippedRow, StationReader,
};
