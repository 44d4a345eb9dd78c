use anyhow::Result;
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use super::date_parser::parse_timestamp;
use super::table::CsvTable;

pub const JOIN_KEY: &str = "opa_account_num";
pub const REQUESTED_AT: &str = "requested_datetime";
pub const VIOLATION_AT: &str = "violationdate";

/// Counters describing one join run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Pairs sharing a non-empty key.
    pub matched: usize,
    /// Pairs dropped because the request came after the violation.
    pub dropped_late: usize,
    /// Pairs dropped because a timestamp was missing or unreadable.
    pub dropped_unparsed: usize,
    pub kept: usize,
}

/// Output header: every request column, then every violation column except
/// the key. Names present on both sides get `_x` (request) and `_y` (violation).
fn joined_headers(left: &StringRecord, right: &StringRecord, right_key: usize) -> StringRecord {
    let left_names: HashSet<&str> = left.iter().collect();
    let right_names: HashSet<&str> = right
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != right_key)
        .map(|(_, h)| h)
        .collect();

    let mut out = StringRecord::new();
    for name in left.iter() {
        if name != JOIN_KEY && right_names.contains(name) {
            out.push_field(&format!("{name}_x"));
        } else {
            out.push_field(name);
        }
    }
    for (i, name) in right.iter().enumerate() {
        if i == right_key {
            continue;
        }
        if left_names.contains(name) {
            out.push_field(&format!("{name}_y"));
        } else {
            out.push_field(name);
        }
    }
    out
}

/// Inner-join requests with violations on the OPA account number and keep
/// only pairs where the request was opened no later than the violation.
///
/// Rows come out in request order, then violation order within a key.
/// An empty key on either side never matches.
pub fn join_requests_violations(
    requests: &CsvTable,
    violations: &CsvTable,
) -> Result<(CsvTable, JoinSummary)> {
    let left_key = requests.column(JOIN_KEY)?;
    let left_time = requests.column(REQUESTED_AT)?;
    let right_key = violations.column(JOIN_KEY)?;
    let right_time = violations.column(VIOLATION_AT)?;

    let mut by_key: HashMap<&str, Vec<&StringRecord>> = HashMap::new();
    for row in &violations.rows {
        let key = row.get(right_key).unwrap_or("").trim();
        if !key.is_empty() {
            by_key.entry(key).or_default().push(row);
        }
    }
    debug!(keys = by_key.len(), "indexed violations");

    let mut out = CsvTable::new(joined_headers(
        &requests.headers,
        &violations.headers,
        right_key,
    ));
    let mut summary = JoinSummary::default();

    for left in &requests.rows {
        let key = left.get(left_key).unwrap_or("").trim();
        if key.is_empty() {
            continue;
        }
        let Some(matches) = by_key.get(key) else {
            continue;
        };
        let requested = left.get(left_time).and_then(parse_timestamp);

        for right in matches {
            summary.matched += 1;
            let violated = right.get(right_time).and_then(parse_timestamp);
            match (requested, violated) {
                (Some(req), Some(vio)) if req <= vio => {}
                (Some(_), Some(_)) => {
                    summary.dropped_late += 1;
                    continue;
                }
                _ => {
                    summary.dropped_unparsed += 1;
                    continue;
                }
            }

            let mut row = left.clone();
            for (i, field) in right.iter().enumerate() {
                if i != right_key {
                    row.push_field(field);
                }
            }
            out.rows.push(row);
            summary.kept += 1;
        }
    }

    if summary.dropped_unparsed > 0 {
        warn!(
            dropped = summary.dropped_unparsed,
            "joined rows with missing or unreadable timestamps"
        );
    }
    Ok((out, summary))
}
