pub mod catalog;
pub mod source;

pub use catalog::{SourceCatalog, SourceFile};
pub use source::{extract_gzip, open_source};
