pub mod day_row;
pub mod histogram;
pub mod observation;
pub mod reduced;

pub use day_row::{column_names, parse_column_name, DayRow, DayTable};
pub use histogram::WindHistogram;
pub use observation::{Observation, WeatherField};
pub use reduced::{FieldMapping, ReducedRecord, SchemaMap, REDUCED_HEADER, SYNOP_FIELDS};
