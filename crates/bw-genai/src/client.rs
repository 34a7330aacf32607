//! Vertex AI REST client.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::auth::Credentials;
use crate::config::GenAiConfig;
use crate::error::{GenAiError, GenAiResult};

/// Long-lived Vertex AI client shared by every request.
#[derive(Clone)]
pub struct VertexClient {
    http: Client,
    config: GenAiConfig,
    credentials: Arc<Credentials>,
}

impl VertexClient {
    /// Create a client authenticated with application default credentials.
    pub async fn new(config: GenAiConfig) -> GenAiResult<Self> {
        let provider = gcp_auth::provider()
            .await
            .map_err(|e| GenAiError::auth_error(format!("Failed to load credentials: {}", e)))?;

        info!(
            "Initializing GenAI client. Project: {}, Location: {}, Bucket: {}",
            config.project_id, config.location, config.bucket_name
        );

        Self::build(config, Credentials::Provider(provider))
    }

    /// Create a client that sends a fixed bearer token.
    pub fn with_static_token(config: GenAiConfig, token: impl Into<String>) -> GenAiResult<Self> {
        Self::build(config, Credentials::Static(token.into()))
    }

    /// Create from environment variables.
    pub async fn from_env() -> GenAiResult<Self> {
        Self::new(GenAiConfig::from_env()?).await
    }

    fn build(config: GenAiConfig, credentials: Credentials) -> GenAiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bw-genai/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenAiError::config_error(e.to_string()))?;

        Ok(Self {
            http,
            config,
            credentials: Arc::new(credentials),
        })
    }

    pub fn config(&self) -> &GenAiConfig {
        &self.config
    }

    /// POST a JSON body to `{model_url}:{method}` and decode the JSON reply.
    ///
    /// A 401 is retried once if the credentials yield a different token.
    pub(crate) async fn call_model<B, R>(&self, model: &str, method: &str, body: &B) -> GenAiResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}:{}", self.config.model_url(model), method);
        debug!(url = %url, "Calling Vertex AI");

        let token = self.credentials.bearer().await?;
        let mut response = self.http.post(&url).bearer_auth(&token).json(body).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(fresh) = self.credentials.replacement_for(&token).await? {
                response = self.http.post(&url).bearer_auth(&fresh).json(body).send().await?;
            }
        }

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| GenAiError::InvalidResponse(e.to_string()))
    }
}
