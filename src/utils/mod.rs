pub mod constants;
pub mod filename;
pub mod progress;

pub use constants::*;
pub use filename::{
    generate_default_day_table_filename, generate_default_histogram_filename,
    parse_source_month, reduced_file_name,
};
pub use progress::ProgressReporter;
