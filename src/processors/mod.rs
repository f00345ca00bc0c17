pub mod day_pivoter;
pub mod field_reducer;
pub mod pipeline;

pub use day_pivoter::DayPivoter;
pub use field_reducer::{FieldReducer, ReductionSummary};
pub use pipeline::{PipelineOutput, WindPipeline};
