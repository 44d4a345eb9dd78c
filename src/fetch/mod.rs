// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::error::StageResult;

pub mod carto;

/// Send `request` once and stream its body into `dest`, replacing any prior file.
/// The status is not checked: an error body lands on disk like any other.
pub async fn download_to_file(request: RequestBuilder, dest: &Path) -> Result<u64> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let mut resp = request.send().await.context("sending Carto request")?;
    let status = resp.status();
    if !status.is_success() {
        warn!(%status, dest = %dest.display(), "non-success response, writing body anyway");
    }

    let mut file = fs::File::create(dest)
        .await
        .with_context(|| format!("creating {}", dest.display()))?;
    let mut written = 0u64;
    while let Some(chunk) = resp
        .chunk()
        .await
        .with_context(|| format!("reading body for {}", dest.display()))?
    {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    info!(%status, bytes = written, dest = %dest.display(), "downloaded");
    Ok(written)
}

/// Download this period's 311 tickets for the configured agency.
#[instrument(level = "info", skip(client, cfg))]
pub async fn fetch_service_requests(
    client: &Client,
    cfg: &Config,
    dest: &Path,
) -> StageResult<PathBuf> {
    let query = carto::service_requests_query(cfg);
    let request = carto::csv_request(client, cfg, &query, Some(&cfg.skip_fields));
    download_to_file(request, dest).await?;
    Ok(dest.to_path_buf())
}

/// Download this period's code violations.
#[instrument(level = "info", skip(client, cfg))]
pub async fn fetch_violations(client: &Client, cfg: &Config, dest: &Path) -> StageResult<PathBuf> {
    let query = carto::violations_query(cfg);
    let request = carto::csv_request(client, cfg, &query, None);
    download_to_file(request, dest).await?;
    Ok(dest.to_path_buf())
}
