// src/config.rs

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};
use url::Url;

/// Env var naming the install root; defaults to the current directory.
pub const ROOT_ENV: &str = "PHILLYSCRAPER_ROOT";
/// Optional overrides file, looked up directly under the root.
pub const CONFIG_FILE: &str = "phillyscraper.yaml";

/// Everything the pipeline needs to know about its upstreams.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub carto_endpoint: String,
    pub ais_endpoint: String,
    pub skip_fields: String,
    pub agency: String,
    /// Inclusive lower bound for both tables.
    pub period_start: String,
    /// Exclusive upper bound for service requests.
    pub period_end: String,
    pub violation_columns: Vec<String>,
    pub lookup_max_calls: usize,
    pub lookup_window_ms: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            carto_endpoint: "https://phl.carto.com/api/v2/sql".to_string(),
            ais_endpoint: "https://api.phila.gov/ais/v1/search".to_string(),
            skip_fields: "cartodb_id,the_geom,the_geom_webmercator".to_string(),
            agency: "License & Inspections".to_string(),
            period_start: "2025-01-01".to_string(),
            period_end: "2026-01-01".to_string(),
            violation_columns: [
                "objectid",
                "opa_account_num",
                "casenumber",
                "casecreateddate",
                "casestatus",
                "violationnumber",
                "violationdate",
                "violationstatus",
                "violationcodetitle",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            lookup_max_calls: 10,
            lookup_window_ms: 1_000,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

impl Config {
    /// Load `<root>/phillyscraper.yaml` if present, else defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
        // an empty YAML document deserializes as unit, not as a mapping
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Self =
            serde_yaml::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject endpoints that are not absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        for (name, raw) in [
            ("carto_endpoint", &self.carto_endpoint),
            ("ais_endpoint", &self.ais_endpoint),
        ] {
            let url = Url::parse(raw).with_context(|| format!("{} `{}` is not a URL", name, raw))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{} `{}` must be http or https", name, raw);
            }
        }
        Ok(())
    }

    pub fn lookup_window(&self) -> Duration {
        Duration::from_millis(self.lookup_window_ms)
    }
}

/// Resolve the install root from `PHILLYSCRAPER_ROOT` or the working directory.
pub fn resolve_root() -> Result<PathBuf> {
    match env::var_os(ROOT_ENV) {
        Some(root) => Ok(PathBuf::from(root)),
        None => env::current_dir().context("reading current directory"),
    }
}

/// Fixed file layout under the install root.
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub requests: PathBuf,
    pub resolved_requests: PathBuf,
    pub violations: PathBuf,
    pub joined: PathBuf,
    pub findings: PathBuf,
    pub status_chart: PathBuf,
    pub violation_chart: PathBuf,
}

impl Paths {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let data_dir = root.join("data");
        let output_dir = root.join("output");
        Self {
            requests: data_dir.join("public_cases_fc_2025.csv"),
            resolved_requests: data_dir.join("public_cases_fc_2025_opa.csv"),
            violations: data_dir.join("violations.csv"),
            joined: data_dir.join("joined.csv"),
            findings: output_dir.join("findings.txt"),
            status_chart: output_dir.join("status.png"),
            violation_chart: output_dir.join("violation.png"),
            data_dir,
            output_dir,
        }
    }

    pub fn create_dirs(&self) -> Result<()> {
        for d in [&self.data_dir, &self.output_dir] {
            fs::create_dir_all(d).with_context(|| format!("creating {}", d.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let tmp = tempdir().unwrap();
        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.lookup_max_calls, 10);
        assert_eq!(cfg.lookup_window(), Duration::from_secs(1));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "period_start: \"2024-01-01\"\nlookup_max_calls: 4\n",
        )
        .unwrap();

        let cfg = Config::load(tmp.path()).unwrap();
        assert_eq!(cfg.period_start, "2024-01-01");
        assert_eq!(cfg.lookup_max_calls, 4);
        assert_eq!(cfg.agency, "License & Inspections");
        assert_eq!(cfg.period_end, "2026-01-01");
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "ais_endpoint: \"ftp://example.org\"\n").unwrap();
        assert!(Config::load(tmp.path()).is_err());

        fs::write(tmp.path().join(CONFIG_FILE), "carto_endpoint: \"not a url\"\n").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }

    #[test]
    fn test_layout() {
        let paths = Paths::new("/srv/phl");
        assert_eq!(
            paths.resolved_requests,
            PathBuf::from("/srv/phl/data/public_cases_fc_2025_opa.csv")
        );
        assert_eq!(
            paths.violation_chart,
            PathBuf::from("/srv/phl/output/violation.png")
        );
    }
}
