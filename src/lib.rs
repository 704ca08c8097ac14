//! Per-key min/max/mean aggregation over large `key:value` line files.
//!
//! Lines are grouped into fixed-size chunks, aggregated in parallel by a
//! bounded worker pool and folded into one map by a single merger thread while
//! a reporter thread renders progress.

pub mod aggregate;
pub mod chunk;
pub mod config;
pub mod error;
pub mod generate;
pub mod merger;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod source;
pub mod worker;

pub use aggregate::{Aggregate, AggregateMap};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::run;
pub use report::Report;
