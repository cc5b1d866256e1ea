use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use enrich::{AppConfig, Enricher};
use store::{CoverageReport, RecordStore};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Enrich heritage-site records with parsed fields, quality classes and
/// visitor-facing descriptions.
#[derive(Debug, Parser)]
#[command(name = "heritage-enrich", version)]
struct Args {
    /// JSON config file; missing sections use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// SQLite database to enrich
    #[arg(long)]
    db: Option<PathBuf>,

    /// Process at most this many records
    #[arg(long)]
    limit: Option<u32>,

    /// Create the sites table if it does not exist
    #[arg(long)]
    init_schema: bool,

    /// Only process records that already have stored text
    #[arg(long)]
    no_fetch: bool,

    /// Disable the summarizer; descriptions are written as "missing"
    #[arg(long)]
    no_summarize: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = load_config(&args)?;
    info!(db = %config.store.path.display(), fetch = config.fetch_missing, summarize = config.summarizer.enabled, "starting heritage-enrich");

    let store = RecordStore::open(&config.store)
        .await
        .context("failed to open record store")?;
    if args.init_schema {
        store
            .init_schema()
            .await
            .context("failed to create record store schema")?;
    }

    let enricher =
        Enricher::from_config(&config, store.clone()).context("failed to build enricher")?;
    let stats = enricher
        .run(config.store.batch_limit)
        .await
        .context("enrichment run aborted")?;
    stats.log_summary();

    let coverage = store.coverage().await.context("failed to read coverage")?;
    log_coverage(&coverage);

    store.close().await;
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(db) = &args.db {
        config.store.path = db.clone();
    }
    if args.limit.is_some() {
        config.store.batch_limit = args.limit;
    }
    if args.no_fetch {
        config = config.offline();
    }
    if args.no_summarize {
        config.summarizer.enabled = false;
    }
    Ok(config)
}

fn log_coverage(report: &CoverageReport) {
    info!(total = report.total, "record store coverage");
    for (column, count) in &report.populated {
        info!(column = %column, populated = count, "column coverage");
    }
    if let Some(lengths) = &report.description_lengths {
        info!(
            min = lengths.min,
            max = lengths.max,
            avg = %format!("{:.1}", lengths.avg),
            "description length"
        );
    }
    for site in &report.longest {
        info!(
            record_id = %site.id,
            title = site.item_title.as_deref().unwrap_or("No title"),
            chars = site.description_length,
            "longest description"
        );
    }
}
