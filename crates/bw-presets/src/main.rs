//! Preset generation CLI.

use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bw_genai::{VertexClient, VideoJobRunner};
use bw_presets::{PresetGenerator, PresetOutcome, PresetRequest};
use bw_storage::GcsClient;

/// Generate one preset card and record it in the registry
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Unique preset id
    #[arg(long)]
    id: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// City to illustrate
    #[arg(long)]
    city: String,

    /// Category name
    #[arg(long, default_value = "General")]
    category: String,

    /// Extra prompt context
    #[arg(long)]
    context: Option<String>,

    /// Regenerate media even if the preset already exists
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    for path in ["../../.env", "../.env", ".env"] {
        dotenvy::from_path(path).ok();
    }

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("rustls crypto provider already installed");
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let vertex = Arc::new(VertexClient::from_env().await?);
    let poll_interval = vertex.config().poll_interval;
    let store = Arc::new(GcsClient::from_env()?);
    let runner = VideoJobRunner::new(vertex.clone()).with_poll_interval(poll_interval);
    let generator = PresetGenerator::new(vertex, store, runner);

    let ctx = CancellationToken::new();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            signal_ctx.cancel();
        }
    });

    let request = PresetRequest {
        id: args.id,
        name: args.name,
        city: args.city,
        category: args.category,
        context: args.context.filter(|c| !c.trim().is_empty()),
    };

    info!(id = %request.id, force = args.force, "Processing preset");
    match generator.generate(&ctx, &request, args.force).await? {
        PresetOutcome::MetadataPatched(p) => info!(id = %p.id, "Metadata updated"),
        PresetOutcome::Generated(p) => {
            info!(id = %p.id, image = %p.image_url, video = %p.video_url, "Preset generated")
        }
    }

    Ok(())
}
