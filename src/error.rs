// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

/// Outcome of a pipeline stage that did not complete.
#[derive(Error, Debug)]
pub enum StageError {
    /// A required input file is not on disk; the stage is skipped.
    #[error("{stage}: input file {} not found", path.display())]
    MissingInput { stage: &'static str, path: PathBuf },

    /// Anything else; this ends the run.
    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

pub type StageResult<T> = std::result::Result<T, StageError>;

impl StageError {
    pub fn missing(stage: &'static str, path: impl Into<PathBuf>) -> Self {
        StageError::MissingInput {
            stage,
            path: path.into(),
        }
    }

    pub fn is_missing_input(&self) -> bool {
        matches!(self, StageError::MissingInput { .. })
    }
}

/// Fail with `MissingInput` if `path` does not exist.
pub fn require_input(stage: &'static str, path: &std::path::Path) -> StageResult<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(StageError::missing(stage, path))
    }
}
