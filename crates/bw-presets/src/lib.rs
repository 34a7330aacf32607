//! Preset generation.
//!
//! A preset is a pre-rendered city card: an image, its animation and the
//! display metadata the landing page lists. Generating one runs the same
//! image and video stages as a live request, then merges the result into
//! the registry.

use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use bw_genai::{ImageSynthesizer, VideoJobRunner, VIDEO_PROMPT};
use bw_models::Preset;
use bw_storage::{load_presets, update_presets, ObjectStore};

/// One preset to produce.
#[derive(Debug, Clone)]
pub struct PresetRequest {
    pub id: String,
    pub name: String,
    pub city: String,
    pub category: String,
    pub context: Option<String>,
}

impl PresetRequest {
    fn image_key(&self, unix_secs: i64) -> String {
        format!("preset_{}_image_{}.png", self.id, unix_secs)
    }
}

/// What happened to a requested preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetOutcome {
    /// Existing entry kept; only name and category changed.
    MetadataPatched(Preset),
    /// Image and video generated.
    Generated(Preset),
}

impl PresetOutcome {
    pub fn preset(&self) -> &Preset {
        match self {
            PresetOutcome::MetadataPatched(p) | PresetOutcome::Generated(p) => p,
        }
    }
}

/// Produces presets and records them in the registry.
pub struct PresetGenerator {
    images: Arc<dyn ImageSynthesizer>,
    store: Arc<dyn ObjectStore>,
    runner: VideoJobRunner,
}

impl PresetGenerator {
    pub fn new(
        images: Arc<dyn ImageSynthesizer>,
        store: Arc<dyn ObjectStore>,
        runner: VideoJobRunner,
    ) -> Self {
        Self {
            images,
            store,
            runner,
        }
    }

    /// Generate `request` unless it already exists, then merge it into the
    /// registry. With `force` the media is always regenerated.
    pub async fn generate(
        &self,
        ctx: &CancellationToken,
        request: &PresetRequest,
        force: bool,
    ) -> anyhow::Result<PresetOutcome> {
        let existing = match load_presets(self.store.as_ref()).await {
            Ok(presets) => presets,
            Err(e) => {
                if !e.is_not_found() {
                    warn!("Preset registry unreadable, treating it as empty: {}", e);
                }
                Vec::new()
            }
        };

        let outcome = match existing.iter().find(|p| p.id == request.id) {
            Some(current) if !force => {
                info!(id = %request.id, "Preset exists, updating metadata only");
                PresetOutcome::MetadataPatched(
                    current.with_metadata(&request.name, &request.category),
                )
            }
            _ => PresetOutcome::Generated(self.render(ctx, request).await?),
        };

        update_presets(self.store.as_ref(), vec![outcome.preset().clone()])
            .await
            .context("failed to write preset registry")?;

        Ok(outcome)
    }

    async fn render(&self, ctx: &CancellationToken, request: &PresetRequest) -> anyhow::Result<Preset> {
        info!(id = %request.id, city = %request.city, "Generating image");
        let image = self
            .images
            .synthesize(&request.city, request.context.as_deref())
            .await
            .with_context(|| format!("image generation failed for {}", request.city))?;

        let key = request.image_key(chrono::Utc::now().timestamp());
        let stored = self
            .store
            .upload(image, &key, "image/png")
            .await
            .context("image upload failed")?;
        info!(uri = %stored.uri, "Image uploaded");

        info!("Generating video, this may take a few minutes");
        let video_uri = self
            .runner
            .run(ctx, &stored.uri, VIDEO_PROMPT)
            .await
            .context("video generation failed")?;

        let video_url = self
            .store
            .public_url(&video_uri)
            .context("video URI is not publishable")?;

        Ok(Preset {
            id: request.id.clone(),
            name: request.name.clone(),
            category: request.category.clone(),
            image_url: stored.public_url,
            video_url,
        })
    }
}
