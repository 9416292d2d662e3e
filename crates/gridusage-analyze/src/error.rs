//! Error types for grouping and tree building.

use thiserror::Error;

use crate::classify::Classification;

/// Errors that stop the grouping pass.
#[derive(Debug, Error)]
pub enum GroupingError {
    /// A record could not be classified and the policy is to abort.
    #[error(
        "Could not classify {path} ({}): period={:?} pass={:?} aod_pass={:?} run={} user={:?}",
        .classification.status,
        .classification.period,
        .classification.pass,
        .classification.aod_pass,
        .classification.run_label(),
        .classification.user
    )]
    ClassificationFailed {
        path: String,
        classification: Box<Classification>,
    },
}

/// Errors that stop treemap construction.
#[derive(Debug, Error)]
pub enum TreeError {
    /// No record lies under the configured treemap root.
    #[error("No file found under treemap root {root}")]
    MissingRoot { root: String },

    /// The configured treemap root is not usable.
    #[error("Invalid treemap root {root:?}")]
    InvalidRoot { root: String },
}
