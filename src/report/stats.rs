use anyhow::Result;
use std::{collections::HashSet, path::Path};

use crate::records::{read_records, JoinedRecord, ServiceRequestRecord};

/// The three numbers the report is built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Findings {
    pub total: usize,
    pub open: usize,
    /// Distinct request ids that appear in the joined file.
    pub with_violation: usize,
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl Findings {
    pub fn from_records(requests: &[ServiceRequestRecord], joined: &[JoinedRecord]) -> Self {
        let linked: HashSet<&str> = joined
            .iter()
            .map(|r| r.service_request_id.as_str())
            .collect();
        Self {
            total: requests.len(),
            open: requests.iter().filter(|r| r.is_open()).count(),
            with_violation: linked.len(),
        }
    }

    pub fn load(requests: &Path, joined: &Path) -> Result<Self> {
        let requests: Vec<ServiceRequestRecord> = read_records(requests)?;
        let joined: Vec<JoinedRecord> = read_records(joined)?;
        Ok(Self::from_records(&requests, &joined))
    }

    pub fn closed(&self) -> usize {
        self.total - self.open
    }

    pub fn without_violation(&self) -> usize {
        self.total.saturating_sub(self.with_violation)
    }

    pub fn open_pct(&self) -> f64 {
        percent(self.open, self.total)
    }

    pub fn closed_pct(&self) -> f64 {
        percent(self.closed(), self.total)
    }

    pub fn violation_pct(&self) -> f64 {
        percent(self.with_violation, self.total)
    }

    /// Plain-text findings, one sentence per line.
    pub fn render(&self) -> String {
        format!(
            "There were {} service requests in total.\n\
             {} service requests ({:.2}%) are still open.\n\
             {} service requests ({:.2}%) resulted in a code violation.\n",
            self.total,
            self.open,
            self.open_pct(),
            self.with_violation,
            self.violation_pct(),
        )
    }
}
