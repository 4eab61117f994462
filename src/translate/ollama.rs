use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TranslatorBackend;

/// Model choices offered when the endpoint cannot be listed.
pub const FALLBACK_OLLAMA_MODELS: &[&str] = &["qwen2.5:7b", "llama3.1:8b", "gemma2:9b"];

/// Listing an endpoint's installed models must not stall the host UI.
const LIST_MODELS_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Serialize)]
struct GenerationRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerationOptions,
}

#[derive(Debug, Clone, Serialize)]
struct GenerationOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
struct TagEntry {
    name: String,
}

/// Translation back-end for a local generation endpoint.
pub struct OllamaTranslator {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    prompt_template: String,
}

impl OllamaTranslator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        prompt_template: impl Into<String>,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self {
            client,
            endpoint: endpoint.into(),
            model: model.into(),
            temperature,
            prompt_template: prompt_template.into(),
        }
    }

    fn build_prompt(&self, text: &str, target_language: &str) -> String {
        let instruction = self
            .prompt_template
            .replace("{target_language}", target_language);
        format!("{instruction}\n\n{text}")
    }
}

#[async_trait]
impl TranslatorBackend for OllamaTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> String {
        let request = GenerationRequest {
            model: self.model.clone(),
            prompt: self.build_prompt(text, target_language),
            stream: false,
            options: GenerationOptions {
                temperature: self.temperature,
            },
        };

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Sending translation request to: {}", url);

        let response = match self.client.post(&url).json(&request).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Translation request failed: {}, keeping original", e);
                return text.to_string();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Translation endpoint returned {}, keeping original",
                response.status()
            );
            return text.to_string();
        }

        match response.json::<GenerationResponse>().await {
            Ok(body) => {
                let translated = body.response.trim();
                if translated.is_empty() {
                    warn!("Empty translation received, keeping original");
                    text.to_string()
                } else {
                    translated.to_string()
                }
            }
            Err(e) => {
                warn!("Failed to parse translation response: {}, keeping original", e);
                text.to_string()
            }
        }
    }
}

/// List the models installed behind an endpoint. Falls back to a fixed
/// selection when the endpoint does not answer in time.
pub async fn list_installed_models(endpoint: &str) -> Vec<String> {
    let client = Client::new();
    let url = format!("{}/api/tags", endpoint);

    let response = client.get(&url).timeout(LIST_MODELS_TIMEOUT).send().await;
    if let Ok(response) = response {
        if response.status().is_success() {
            if let Ok(tags) = response.json::<TagsResponse>().await {
                let names: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
                if !names.is_empty() {
                    return names;
                }
            }
        }
    }

    debug!("Model listing unavailable at {}, using fallback choices", endpoint);
    FALLBACK_OLLAMA_MODELS.iter().map(|m| m.to_string()).collect()
}
