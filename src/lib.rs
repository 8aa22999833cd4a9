pub mod config;
pub mod coverage;
pub mod error;
pub mod query;
pub mod report;
pub mod target;
pub mod types;

pub use crate::error::{CoverageError, CoverageResult};
