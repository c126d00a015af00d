mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use autolabel_core::LabelSource;
use autolabel_enrich::{
    CommitHook, EnrichmentContext, EnrichmentService, PollPolicy, TracingIndexer,
};
use autolabel_repo::MemoryRepository;
use autolabel_vision::{LabelThreshold, VisionClient, VisionConfig};

use config::Config;

/// Visibility lag simulated by the in-memory repository during `ingest`.
const PUBLISH_DELAY: Duration = Duration::from_millis(700);

#[derive(Parser)]
#[command(name = "autolabel")]
#[command(about = "Automatic image labeling for content repositories")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify one local image and print the labels that pass the threshold
    Annotate {
        /// Image file to classify
        file: PathBuf,
    },
    /// Upload a directory into the in-memory repository and run the full
    /// enrichment flow
    Ingest {
        /// Directory whose files are uploaded
        dir: PathBuf,
        /// Target workspace name
        #[arg(short, long, default_value = "collaboration")]
        workspace: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Annotate { file } => annotate(&config, &file).await,
        Commands::Ingest { dir, workspace } => ingest(&config, &dir, &workspace).await,
    }
}

fn vision_client(config: &Config) -> Result<VisionClient> {
    let Some(api_key) = &config.api_key else {
        bail!("GOOGLE_VISION_API_KEY is not set");
    };
    let threshold = LabelThreshold::resolve(config.label_threshold.as_deref());
    let mut vision_config = VisionConfig::new(api_key.as_str(), threshold);
    if let Some(endpoint) = &config.endpoint {
        vision_config = vision_config.with_endpoint(endpoint.as_str());
    }
    Ok(VisionClient::new(vision_config))
}

async fn annotate(config: &Config, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let client = vision_client(config)?;
    let labels = client.classify(&bytes).await?;

    if labels.is_empty() {
        println!("No label passed the threshold.");
        return Ok(());
    }
    for label in labels {
        println!("{:<24} {:.2}", label.text, label.score);
    }
    Ok(())
}

async fn ingest(config: &Config, dir: &Path, workspace: &str) -> Result<()> {
    let uploads = gather_files(dir)?;
    if uploads.is_empty() {
        bail!("no files found in {}", dir.display());
    }

    let (repo, events_rx) = MemoryRepository::new();
    let repo = repo.with_auto_publish(PUBLISH_DELAY);

    let ctx = EnrichmentContext {
        sessions: Arc::new(repo.clone()),
        labels: Arc::new(vision_client(config)?),
        indexer: Arc::new(TracingIndexer),
        poll: PollPolicy {
            interval: Duration::from_millis(config.poll_interval_ms),
            max_attempts: config.max_poll_attempts,
        },
    };
    let service = EnrichmentService::new(CommitHook::new(ctx));
    tokio::spawn(async move { service.run(events_rx).await });

    let mut paths = Vec::new();
    for upload in &uploads {
        let name = upload
            .file_name()
            .and_then(|n| n.to_str())
            .context("file name is not valid UTF-8")?;
        let bytes = tokio::fs::read(upload)
            .await
            .with_context(|| format!("failed to read {}", upload.display()))?;
        let repo_path = format!("/uploads/{name}");
        repo.store_file(workspace, &repo_path, bytes, mime_for(name))
            .await;
        paths.push(repo_path);
    }
    info!(count = paths.len(), workspace, "Files uploaded, waiting for enrichment");

    // Publish delay + poll + classification; generous for a demo run.
    tokio::time::sleep(PUBLISH_DELAY + Duration::from_secs(3)).await;

    for path in &paths {
        match repo.description(workspace, path).await {
            Some(description) => println!("{path}: {description}"),
            None => println!("{path}: (no labels)"),
        }
    }
    Ok(())
}

fn gather_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

fn mime_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    match lower.rsplit('.').next() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}
