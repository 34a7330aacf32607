//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use bw_genai::{VertexClient, VideoJobRunner};
use bw_maps::GeocodingClient;
use bw_storage::{GcsClient, ObjectStore};

use crate::config::ApiConfig;
use crate::workflow::{VideoPipeline, WeatherWorkflow};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub workflow: Arc<WeatherWorkflow>,
    /// Absent when storage failed to initialize (image-only mode).
    pub store: Option<Arc<dyn ObjectStore>>,
}

impl AppState {
    pub fn new(
        config: ApiConfig,
        workflow: WeatherWorkflow,
        store: Option<Arc<dyn ObjectStore>>,
    ) -> Self {
        Self {
            config,
            workflow: Arc::new(workflow),
            store,
        }
    }

    /// Build every collaborator from the environment.
    ///
    /// Maps and GenAI are required. Storage is optional: without it the
    /// server still produces images but never animates them.
    pub async fn from_env(config: ApiConfig) -> anyhow::Result<Self> {
        let maps = GeocodingClient::from_env()
            .map_err(|e| anyhow::anyhow!("Maps service failed to initialize. Check GOOGLE_MAPS_API_KEY. Error: {}", e))?;

        let vertex = VertexClient::from_env()
            .await
            .map_err(|e| anyhow::anyhow!("GenAI service failed to initialize. Check PROJECT_ID/GOOGLE_CLOUD_PROJECT. Error: {}", e))?;
        let poll_interval = vertex.config().poll_interval;
        let vertex = Arc::new(vertex);

        let mut workflow = WeatherWorkflow::new(Arc::new(maps), vertex.clone());

        let store: Option<Arc<dyn ObjectStore>> = match GcsClient::from_env() {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("Storage service failed to initialize (Check GENMEDIA_BUCKET): {}", e);
                None
            }
        };

        if let Some(store) = &store {
            let runner = VideoJobRunner::new(vertex).with_poll_interval(poll_interval);
            workflow = workflow.with_video(VideoPipeline {
                store: store.clone(),
                runner: Arc::new(runner),
            });
            info!("Video generation enabled");
        } else {
            info!("Running in image-only mode");
        }

        Ok(Self::new(config, workflow, store))
    }
}
