//! ttk-sync - Incremental procurement record synchronization
//!
//! Replays an extraction capture against the raw ledger and canonical
//! store: change detection, selective re-fetch, entity resolution and
//! newest-wins merge. Exits non-zero when the fetch stage fails entirely;
//! merge stages never run against a known-incomplete ledger.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttk_common::db::Stores;
use ttk_sync::services::pipeline::SyncPipeline;
use ttk_sync::source::{ReplaySource, SourceOptions};

/// Contracting profiles of the municipality of Jerez de la Frontera,
/// the default corpus when no endpoints are given
const DEFAULT_LINKS: [&str; 16] = [
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=xO%2BVWYM1HLcQK2TEfXGy%2BA%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=AWzudWVfdurnSoTX3z%2F7wA%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=uZeB9RW2UzkBPRBxZ4nJ%2Fg%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=isSUZ3Wb6qguf4aBO%2BvQlQ%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=mqwnEBYK3SoQK2TEfXGy%2BA%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=7OhhaoN%2FfAWXQV0WE7lYPw%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=RbpYQD4ZOZs%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=8KXIej0TvMWXQV0WE7lYPw%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=XWw4npqzY9USugstABGr5A%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=kL4JRvSx8lhvYnTkQN0%2FZA%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=rah94wmkSOY%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=Kl19yCF%2FEFOrz3GQd5r6SQ%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=6vcXcT%2BkwNerz3GQd5r6SQ%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=%2Fht1J5NkW8kuf4aBO%2BvQlQ%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=6EG3tH2QThurz3GQd5r6SQ%3D%3D",
    "https://contrataciondelestado.es/wps/poc?uri=deeplink:perfilContratante&idBp=67eFk%2FswtPUBPRBxZ4nJ%2Fg%3D%3D",
];

/// Command-line arguments for ttk-sync
#[derive(Parser, Debug)]
#[command(name = "ttk-sync")]
#[command(about = "Incremental synchronization of public-procurement records")]
#[command(version)]
struct Args {
    /// Authority profile endpoints to synchronize
    #[arg(short, long, num_args = 1..)]
    links: Vec<String>,

    /// Extraction capture file to replay
    #[arg(long)]
    replay: PathBuf,

    /// Per-element wait budget in seconds for live source drivers
    #[arg(short, long, default_value = "5")]
    patience: u64,

    /// Hide the browser window in live source drivers
    #[arg(long)]
    headless: bool,

    /// Data directory holding both stores
    #[arg(short, long, env = "TTK_DATA_DIR")]
    data_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttk_sync=info,ttk_common=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let links: Vec<String> = if args.links.is_empty() {
        let configured = ttk_common::config::configured_links();
        if configured.is_empty() {
            DEFAULT_LINKS.iter().map(|s| s.to_string()).collect()
        } else {
            configured
        }
    } else {
        args.links.clone()
    };

    let data_dir = ttk_common::config::resolve_data_dir(args.data_dir.as_deref());
    tracing::info!("Data directory: {}", data_dir.display());

    let stores = Stores::open(&data_dir)
        .await
        .context("Failed to open stores")?;

    let options = SourceOptions {
        patience: Duration::from_secs(args.patience),
        headless: args.headless,
    };
    let source = ReplaySource::load(&args.replay, options)
        .with_context(|| format!("Failed to load capture {}", args.replay.display()))?;

    let pipeline = SyncPipeline::new(stores, source);
    let summary = pipeline.run(&links).await?;

    for authority in &summary.authorities {
        tracing::info!(
            endpoint = %authority.source_url,
            new = authority.new,
            changed = authority.changed,
            unchanged = authority.unchanged,
            fetch_failed = authority.fetch_failed,
            merged = authority.merged,
            skipped_stale = authority.skipped_stale,
            "Authority synchronized"
        );
    }
    for endpoint in &summary.failed_endpoints {
        tracing::warn!(endpoint = %endpoint, "Endpoint skipped: header listing failed");
    }
    if summary.integrity_violations > 0 {
        tracing::error!(
            count = summary.integrity_violations,
            "Keys skipped due to ledger integrity violations"
        );
    }

    tracing::info!(
        run_id = %summary.run_id,
        authorities = summary.authorities.len(),
        merged = summary.total_merged(),
        "Run complete"
    );

    Ok(())
}
