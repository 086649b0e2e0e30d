use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use inbox_tracker::config::Config;
use inbox_tracker::error::Error;
use inbox_tracker::notion::{NotionClient, RowSink};
use inbox_tracker::pipeline::processor::EmailProcessor;
use inbox_tracker::store::{BlobStore, FsBlobStore, S3BlobStore};

/// Turn application emails into database rows.
#[derive(Debug, Parser)]
#[command(name = "inbox-tracker", version, about)]
struct Args {
    /// Invocation event JSON file. Reads stdin when omitted.
    #[arg(short, long)]
    event: Option<PathBuf>,
}

fn read_event(path: Option<&PathBuf>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read event file {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read event from stdin")?;
            Ok(raw)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().map_err(Error::from).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export NOTION_API_KEY=... NOTION_DB_ID=... S3_BUCKET_NAME=...");
        std::process::exit(1);
    });

    // ── Backends ─────────────────────────────────────────────────────────
    let blobs: Arc<dyn BlobStore> = match &config.blob_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Reading emails from local directory");
            Arc::new(FsBlobStore::new(dir))
        }
        None => {
            tracing::info!(bucket = %config.bucket, "Reading emails from S3");
            Arc::new(S3BlobStore::from_env().await)
        }
    };
    let sink: Arc<dyn RowSink> = Arc::new(NotionClient::new(&config.notion));

    // ── Run ──────────────────────────────────────────────────────────────
    let raw_event = read_event(args.event.as_ref())?;
    let processor = EmailProcessor::new(&config, blobs, sink);
    let summary = processor
        .handle_event(&raw_event)
        .await
        .context("invalid invocation event")?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
