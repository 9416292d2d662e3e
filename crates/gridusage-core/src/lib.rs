//! Core types for gridusage.
//!
//! This crate provides the data structures shared by ingestion and analysis:
//! file records decoded from storage listings, report configuration, and the
//! error and warning types of the pipeline.

mod config;
mod error;
mod record;

pub use config::{
    FailurePolicy, PathGrammar, RawYearPrefix, ReportConfig, ReportConfigBuilder, ScanConfig,
    ScanConfigBuilder,
};
pub use error::{IngestError, IngestWarning, ParseError, WarningKind};
pub use record::{FileRecord, basename, dirname, segments};
