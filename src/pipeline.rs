// src/pipeline.rs

use anyhow::{Context, Result};
use reqwest::Client;
use std::path::PathBuf;
use tracing::{error, info};

use crate::config::{Config, Paths};
use crate::error::{StageError, StageResult};
use crate::fetch;
use crate::process;
use crate::report::{self, Findings, ReportTargets};
use crate::resolve::{self, lookup_limiter, AisClient, OpaResolver};

/// Turn a stage outcome into "carry on" or "stop".
///
/// A missing input is logged and yields `None`; any other failure is returned.
pub fn settle<T>(stage: &str, result: StageResult<T>) -> Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e @ StageError::MissingInput { .. }) => {
            error!(stage, error = %e, "skipping stage");
            Ok(None)
        }
        Err(StageError::Failed(e)) => Err(e.context(format!("stage `{}` failed", stage))),
    }
}

/// The five stages, run in order. Each stage gets its inputs from the
/// previous stage's output, falling back to the expected location when the
/// previous stage was skipped.
pub struct Pipeline {
    client: Client,
    config: Config,
    paths: Paths,
}

impl Pipeline {
    pub fn new(config: Config, paths: Paths) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            config,
            paths,
        })
    }

    pub async fn run(&self) -> Result<Option<Findings>> {
        self.paths.create_dirs()?;
        let cfg = &self.config;
        let paths = &self.paths;

        // ─── 1) 311 tickets ─────────────────────────────────────────────
        let requests = settle(
            "fetch_requests",
            fetch::fetch_service_requests(&self.client, cfg, &paths.requests).await,
        )?
        .unwrap_or_else(|| paths.requests.clone());

        // ─── 2) OPA account numbers ────────────────────────────────────
        let mut resolver = OpaResolver::new(
            AisClient::new(self.client.clone(), cfg.ais_endpoint.clone()),
            lookup_limiter(cfg.lookup_max_calls, cfg.lookup_window())?,
        );
        let resolved = settle(
            "resolve",
            resolve::resolve_file(&requests, &paths.resolved_requests, &mut resolver).await,
        )?
        .unwrap_or_else(|| paths.resolved_requests.clone());

        // ─── 3) violations ─────────────────────────────────────────────
        let violations = settle(
            "fetch_violations",
            fetch::fetch_violations(&self.client, cfg, &paths.violations).await,
        )?
        .unwrap_or_else(|| paths.violations.clone());

        // ─── 4) join ───────────────────────────────────────────────────
        let joined: PathBuf = settle(
            "join",
            process::join_files(&resolved, &violations, &paths.joined),
        )?
        .unwrap_or_else(|| paths.joined.clone());

        // ─── 5) report ─────────────────────────────────────────────────
        let findings = settle(
            "report",
            report::analyze(&requests, &joined, &ReportTargets::from(paths)),
        )?;

        info!("pipeline finished");
        Ok(findings)
    }
}
