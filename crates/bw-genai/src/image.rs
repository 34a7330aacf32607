//! Weather illustration synthesis.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::client::VertexClient;
use crate::error::{GenAiError, GenAiResult};
use crate::metrics;

const BASE_PROMPT: &str = r#"Present a clear, 45° top-down view of a vertical (9:16) isometric miniature 3D cartoon scene, highlighting iconic landmarks centered in the composition to showcase precise and delicate modeling.

The scene features soft, refined textures with realistic PBR materials and gentle, lifelike lighting and shadow effects. Weather elements are creatively integrated into the urban architecture, establishing a dynamic interaction between the city's landscape and atmospheric conditions, creating an immersive weather ambiance.

Use a clean, unified composition with minimalistic aesthetics and a soft, solid-colored background that highlights the main content. The overall visual style is fresh and soothing.

Display a prominent weather icon at the top-center, with the date (x-small text) and temperature range (medium text) beneath it. The city name (large text) is positioned directly above the weather icon. The weather information has no background and can subtly overlap with the buildings.

The text should match the input city's native language.
Please retrieve current weather conditions for the specified city before rendering."#;

/// Produces a weather image for a resolved location.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Returns raw image bytes.
    async fn synthesize(&self, city: &str, extra_context: Option<&str>) -> GenAiResult<Vec<u8>>;
}

/// Build the full image prompt for a city.
pub fn build_image_prompt(city: &str, extra_context: Option<&str>) -> String {
    match extra_context.map(str::trim).filter(|c| !c.is_empty()) {
        Some(context) => format!(
            "{}\n\nContext/Setting: {}\n\nCity name: {}",
            BASE_PROMPT, context, city
        ),
        None => format!("{}\n\nCity name: {}", BASE_PROMPT, city),
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    response_modalities: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Tool {
    #[serde(rename = "googleSearch")]
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(rename = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

#[async_trait]
impl ImageSynthesizer for VertexClient {
    async fn synthesize(&self, city: &str, extra_context: Option<&str>) -> GenAiResult<Vec<u8>> {
        let result = self.generate_image(city, extra_context).await;
        metrics::record_image(result.is_ok());
        result
    }
}

impl VertexClient {
    async fn generate_image(&self, city: &str, extra_context: Option<&str>) -> GenAiResult<Vec<u8>> {
        let model = self.config().image_model.clone();
        info!(city = %city, model = %model, "Generating image");

        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![TextPart {
                    text: build_image_prompt(city, extra_context),
                }],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        let response: GenerateContentResponse = self
            .call_model(&model, "generateContent", &request)
            .await
            .map_err(|e| {
                warn!("GenerateContent failed: {}", e);
                e
            })?;

        let parts = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| GenAiError::synthesis("no content generated"))?;

        let encoded = parts
            .into_iter()
            .find_map(|p| p.inline_data)
            .ok_or_else(|| GenAiError::synthesis("no image data found in response"))?;

        let bytes = STANDARD
            .decode(encoded.data.as_bytes())
            .map_err(|e| GenAiError::InvalidResponse(format!("invalid image data: {}", e)))?;

        if bytes.is_empty() {
            return Err(GenAiError::synthesis("no image data found in response"));
        }

        info!(city = %city, bytes = bytes.len(), "Image generated");
        Ok(bytes)
    }
}
