use anyhow::Result;
use phillyscraper::{
    config::{self, Config, Paths},
    Pipeline,
};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) configure root + layout ──────────────────────────────────
    let root = config::resolve_root()?;
    let cfg = Config::load(&root)?;
    let paths = Paths::new(&root);
    info!(root = %root.display(), period = %cfg.period_start, "configured");

    // ─── 3) run every stage in order ─────────────────────────────────
    let start = Instant::now();
    let pipeline = Pipeline::new(cfg, paths)?;
    match pipeline.run().await? {
        Some(findings) => info!(
            total = findings.total,
            open_pct = %format!("{:.2}", findings.open_pct()),
            violation_pct = %format!("{:.2}", findings.violation_pct()),
            elapsed = ?start.elapsed(),
            "all done"
        ),
        None => info!(elapsed = ?start.elapsed(), "done without a report"),
    }
    Ok(())
}
