// Error types for loading, assembling and running the preprocessing pipeline.
use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// A failure local to one stage. The orchestrator decides whether the run
/// continues without that stage's effect or aborts.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("required column `{0}` is not present")]
    MissingColumn(String),

    #[error(transparent)]
    Frame(#[from] PolarsError),
}

/// Fatal errors: nothing is transformed (or nothing more is written) after one of these.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot open the {table} table at {}: {source}", path.display())]
    Open {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse the {table} table at {}: {source}", path.display())]
    Load {
        table: &'static str,
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("the {table} table at {} has no `{column}` column", path.display())]
    MissingIndex {
        table: &'static str,
        path: PathBuf,
        column: &'static str,
    },

    #[error("column `{column}` has no counterpart `{expected}` for the other corner")]
    UnpairedColumn { column: String, expected: String },

    #[error("stage `{stage}` requires column `{column}`, which no earlier stage leaves available")]
    BrokenStageOrder { stage: &'static str, column: String },

    #[error("cannot write {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("cannot write the run report to {}: {source}", path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("stage `{stage}` failed: {source}")]
    StageAborted {
        stage: &'static str,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// True when the failure is an input file that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PipelineError::Open { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
