//! Query engine: the search grammar and the filter pipeline that runs it.

pub mod filter;
pub mod parser;

pub use filter::{apply, FilterPipeline};
pub use parser::{parse, Query};
