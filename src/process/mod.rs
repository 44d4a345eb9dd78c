// src/process/mod.rs

use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::error::{require_input, StageResult};

pub mod date_parser;
pub mod join;
pub mod table;

pub use join::{join_requests_violations, JoinSummary};
pub use table::CsvTable;

const STAGE: &str = "join";

/// Read resolved requests and violations, join them, and write `dest`.
#[instrument(level = "info", skip_all, fields(dest = %dest.display()))]
pub fn join_files(requests: &Path, violations: &Path, dest: &Path) -> StageResult<PathBuf> {
    require_input(STAGE, requests)?;
    require_input(STAGE, violations)?;

    let left = CsvTable::read(requests)?;
    let right = CsvTable::read(violations)?;
    info!(
        requests = left.len(),
        violations = right.len(),
        "loaded join inputs"
    );

    let (joined, summary) = join_requests_violations(&left, &right)?;
    joined.write(dest)?;
    info!(
        matched = summary.matched,
        dropped_late = summary.dropped_late,
        kept = summary.kept,
        "wrote joined rows"
    );
    Ok(dest.to_path_buf())
}
