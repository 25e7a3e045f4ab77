//! CLI entry point for the peraturan-dl harvester.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use peraturan_dl::{
    CATALOG_BASE_URL, Discovery, DiscoveryError, DownloadEngine, DownloadMode, DownloadWorker,
    HarvestConfig, HttpClient, RegulationKind, RegulationQuery, RetryPolicy, StatusFilter,
    parse_direct_document_url,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

mod cli;

use cli::Args;

/// Exit status when the catalog host cannot be reached at all.
const EXIT_HOST_UNREACHABLE: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");

    let mut config = HarvestConfig::from_json_file(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(output) = &args.output {
        config.output_root = output.clone();
    }
    if let Some(concurrency) = args.concurrency {
        config.max_concurrency = usize::from(concurrency);
    }
    if let Some(delay_ms) = args.delay_ms {
        config.request_delay_ms = delay_ms;
    }
    if let Some(retries) = args.retries {
        config.retry_count = u32::from(retries);
    }
    if args.demo {
        config.demo_mode = true;
    }
    debug!(?config, "effective configuration");

    let status = StatusFilter::from(args.status);
    let has_query = args.category.is_some() || args.year.is_some() || args.number.is_some();

    // Direct URLs are validated up front; a typo should not cost a run.
    let mut direct_documents = Vec::new();
    for raw in &args.urls {
        match parse_direct_document_url(raw) {
            Ok(document) => direct_documents.push(document),
            Err(e) => {
                error!(url = %raw, error = %e, "not a catalog document URL");
                anyhow::bail!("invalid document URL: {raw}");
            }
        }
    }

    let seeds = if args.all {
        let from = args.from_year.unwrap_or_default();
        let to = args.to_year.unwrap_or_default();
        peraturan_dl::discover::comprehensive_seeds(
            CATALOG_BASE_URL,
            &RegulationKind::ALL,
            from..=to,
            status,
        )
    } else if has_query {
        let query = RegulationQuery::new(args.category, args.year, args.number, status)?;
        vec![peraturan_dl::discover::seed_from_query(
            CATALOG_BASE_URL,
            &query,
        )]
    } else {
        Vec::new()
    };

    if seeds.is_empty() && direct_documents.is_empty() {
        info!("Nothing to do. Pass --category/--year/--number, --all, or document URLs.");
        info!("Example: peraturan-dl --category uu --year 2024");
        return Ok(ExitCode::SUCCESS);
    }

    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, finishing in-flight downloads");
            ctrl_c_cancel.cancel();
        }
    });

    let client = HttpClient::new();
    let discovery = Discovery::new(
        client.clone(),
        config.output_root.clone(),
        Duration::from_millis(config.request_delay_ms),
        cancel.clone(),
    );

    let mut plan = match discovery.run(seeds).await {
        Ok(plan) => plan,
        Err(e @ DiscoveryError::HostUnreachable { .. }) => {
            error!(error = %e, "discovery aborted");
            return Ok(ExitCode::from(EXIT_HOST_UNREACHABLE));
        }
    };
    for planned in discovery
        .plan_direct(direct_documents)
        .iter()
        .cloned()
        .collect::<Vec<_>>()
    {
        plan.push(planned);
    }

    if plan.is_empty() {
        info!("No documents found");
        return Ok(ExitCode::SUCCESS);
    }
    info!(documents = plan.len(), "download plan built");

    let mode = if config.demo_mode {
        DownloadMode::Demo
    } else {
        DownloadMode::Real
    };
    let worker = DownloadWorker::new(
        client,
        RetryPolicy::with_max_attempts(config.retry_count),
        mode,
    );
    let engine = DownloadEngine::new(worker, config.max_concurrency, cancel)?;
    let summary = engine.run(&plan).await;

    println!("{}", serde_json::to_string_pretty(&summary)?);

    // Per-document failures are reported in the summary, not the exit
    // status; only an unreachable host is fatal.
    Ok(ExitCode::SUCCESS)
}
