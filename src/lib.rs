//! CV match scorer library
//!
//! Scores a CV against a job description with six independent similarity
//! analyzers and fuses them into one weighted report.

pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{CvMatchError, Result};
pub use output::report::AggregateReport;
pub use processing::analyzer::AnalysisEngine;
