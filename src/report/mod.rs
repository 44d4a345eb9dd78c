// src/report/mod.rs

use anyhow::Context;
use std::{fs, path::Path};
use tracing::{info, instrument};

use crate::config::Paths;
use crate::error::{require_input, StageResult};

pub mod charts;
pub mod stats;

pub use charts::{render_pie, PALETTE};
pub use stats::Findings;

const STAGE: &str = "report";

/// Where the report stage writes its three artifacts.
#[derive(Debug, Clone)]
pub struct ReportTargets<'a> {
    pub findings: &'a Path,
    pub status_chart: &'a Path,
    pub violation_chart: &'a Path,
}

impl<'a> From<&'a Paths> for ReportTargets<'a> {
    fn from(paths: &'a Paths) -> Self {
        Self {
            findings: &paths.findings,
            status_chart: &paths.status_chart,
            violation_chart: &paths.violation_chart,
        }
    }
}

/// Compute findings from the raw requests and the joined file, then write
/// the text report and both pie charts. Nothing is written if an input is missing.
#[instrument(level = "info", skip_all, fields(requests = %requests.display(), joined = %joined.display()))]
pub fn analyze(
    requests: &Path,
    joined: &Path,
    targets: &ReportTargets<'_>,
) -> StageResult<Findings> {
    require_input(STAGE, requests)?;
    require_input(STAGE, joined)?;

    let findings = Findings::load(requests, joined)?;
    info!(
        total = findings.total,
        open = findings.open,
        open_pct = %format!("{:.2}", findings.open_pct()),
        closed_pct = %format!("{:.2}", findings.closed_pct()),
        with_violation = findings.with_violation,
        "computed findings"
    );

    for target in [targets.findings, targets.status_chart, targets.violation_chart] {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    fs::write(targets.findings, findings.render())
        .with_context(|| format!("writing {}", targets.findings.display()))?;

    render_pie(
        targets.status_chart,
        "Service Request Status",
        ["Open", "Closed"],
        [findings.open as f64, findings.closed() as f64],
    )?;
    render_pie(
        targets.violation_chart,
        "Service Requests Followed by a Violation",
        ["Violation", "No Violation"],
        [
            findings.with_violation as f64,
            findings.without_violation() as f64,
        ],
    )?;

    info!(report = %targets.findings.display(), "wrote report");
    Ok(findings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_joined_file_writes_nothing() {
        let tmp = tempdir().unwrap();
        let paths = Paths::new(tmp.path());
        paths.create_dirs().unwrap();
        fs::write(&paths.requests, "service_request_id,status\n1,Open\n").unwrap();

        let err = analyze(&paths.requests, &paths.joined, &ReportTargets::from(&paths)).unwrap_err();
        assert!(err.is_missing_input());
        assert!(!paths.findings.exists());
        assert!(!paths.status_chart.exists());
    }

    #[test]
    fn test_missing_requests_file() {
        let tmp = tempdir().unwrap();
        let paths = Paths::new(tmp.path());
        let err = analyze(&paths.requests, &paths.joined, &ReportTargets::from(&paths)).unwrap_err();
        assert!(err.is_missing_input());
    }

    fn assert_png(path: &Path) {
        let bytes = fs::read(path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"), "{}", path.display());
    }

    #[test]
    fn test_writes_report_and_both_charts() {
        let tmp = tempdir().unwrap();
        let paths = Paths::new(tmp.path());
        paths.create_dirs().unwrap();
        fs::write(
            &paths.requests,
            "service_request_id,status\n\
             SR-1,Open\n\
             SR-2,Closed\n\
             SR-3,Closed\n\
             SR-4,In Progress\n",
        )
        .unwrap();
        fs::write(
            &paths.joined,
            "service_request_id,opa_account_num\nSR-1,42\nSR-1,42\nSR-3,7\n",
        )
        .unwrap();

        let findings = analyze(&paths.requests, &paths.joined, &ReportTargets::from(&paths)).unwrap();
        assert_eq!(
            findings,
            Findings {
                total: 4,
                open: 2,
                with_violation: 2,
            }
        );
        assert_eq!(
            fs::read_to_string(&paths.findings).unwrap(),
            "There were 4 service requests in total.\n\
             2 service requests (50.00%) are still open.\n\
             2 service requests (50.00%) resulted in a code violation.\n"
        );
        assert_png(&paths.status_chart);
        assert_png(&paths.violation_chart);
    }

    #[test]
    fn test_empty_inputs_write_text_only() {
        let tmp = tempdir().unwrap();
        let paths = Paths::new(tmp.path());
        paths.create_dirs().unwrap();
        fs::write(&paths.requests, "service_request_id,status\n").unwrap();
        fs::write(&paths.joined, "service_request_id,opa_account_num\n").unwrap();

        let findings = analyze(&paths.requests, &paths.joined, &ReportTargets::from(&paths)).unwrap();
        assert_eq!(findings, Findings::default());
        let text = fs::read_to_string(&paths.findings).unwrap();
        assert_eq!(text.lines().count(), 3);
        // zero-sized pies are skipped
        assert!(!paths.status_chart.exists());
        assert!(!paths.violation_chart.exists());
    }
}
