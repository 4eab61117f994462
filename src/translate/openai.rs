use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::TranslatorBackend;

#[derive(Debug, Clone, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Translation back-end for OpenAI-compatible chat-completions endpoints.
/// The endpoint is the full URL including the completions path.
pub struct OpenAiTranslator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    prompt_template: String,
}

impl OpenAiTranslator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
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
            api_key: api_key.into(),
            temperature,
            max_tokens,
            prompt_template: prompt_template.into(),
        }
    }

    fn build_request(&self, text: &str, target_language: &str) -> ChatCompletionRequest {
        let system = self
            .prompt_template
            .replace("{target_language}", target_language);

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        }
    }
}

#[async_trait]
impl TranslatorBackend for OpenAiTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> String {
        let request = self.build_request(text, target_language);
        debug!("Sending translation request to: {}", self.endpoint);

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if !self.api_key.is_empty() {
            builder = builder.bearer_auth(&self.api_key);
        }

        let response = match builder.send().await {
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

        match response.json::<ChatCompletionResponse>().await {
            Ok(body) => match body.choices.first() {
                Some(choice) => {
                    let translated = choice.message.content.trim();
                    if translated.is_empty() {
                        warn!("Empty translation received, keeping original");
                        text.to_string()
                    } else {
                        translated.to_string()
                    }
                }
                None => {
                    warn!("Translation response carried no choices, keeping original");
                    text.to_string()
                }
            },
            Err(e) => {
                warn!("Failed to parse translation response: {}, keeping original", e);
                text.to_string()
            }
        }
    }
}
