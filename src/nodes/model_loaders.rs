// Translator loader nodes. Both produce a [`TranslatorSpec`] consumed by
// the recognition node; neither talks to a back-end at load time, so a
// bad endpoint only surfaces when translation actually runs.

use serde::Deserialize;
use tracing::info;

use crate::error::{PackError, Result};
use crate::translate::TranslatorSpec;
use crate::workspace::Workspace;

use super::{InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

pub const CLOUD_PROVIDERS: &[&str] = &["openai", "openai_compatible", "custom"];

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model_name() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalOllamaParams {
    pub ollama_model: String,
    /// Service URL; blank falls back to the configured endpoint
    #[serde(default)]
    pub ollama_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Blank keeps the configured prompt template
    #[serde(default)]
    pub system_prompt: String,
}

/// Points translation at a model served by a local Ollama instance.
pub struct LocalOllamaLoaderNode;

impl LocalOllamaLoaderNode {
    pub fn run(&self, workspace: &Workspace, params: LocalOllamaParams) -> Result<TranslatorSpec> {
        let model = params.ollama_model.trim();
        if model.is_empty() {
            return Err(PackError::Input("No translation model selected".to_string()));
        }

        let trimmed = params.ollama_url.trim().trim_end_matches('/');
        let endpoint = if trimmed.is_empty() {
            workspace.config().translate.endpoint.clone()
        } else {
            trimmed.to_string()
        };

        info!("Configured local translator: {} at {}", model, endpoint);
        Ok(TranslatorSpec::Ollama {
            endpoint,
            model: model.to_string(),
            temperature: params.temperature.clamp(0.0, 2.0),
            system_prompt: params.system_prompt,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CloudApiParams {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    /// Explicit chat completions URL; overrides the provider preset
    #[serde(default)]
    pub api_url: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub system_prompt: String,
}

/// Points translation at an OpenAI-style chat completions API.
pub struct CloudApiLoaderNode;

impl CloudApiLoaderNode {
    pub fn run(&self, params: CloudApiParams) -> Result<TranslatorSpec> {
        let model = params.model_name.trim();
        if model.is_empty() {
            return Err(PackError::Input("No model name given".to_string()));
        }

        let explicit = params.api_url.trim();
        let endpoint = if explicit.is_empty() {
            match params.provider.as_str() {
                "openai" | "openai_compatible" => OPENAI_CHAT_URL.to_string(),
                "custom" => String::new(),
                other => {
                    return Err(PackError::Input(format!("Unknown API provider: {other}")));
                }
            }
        } else {
            explicit.to_string()
        };
        if endpoint.is_empty() {
            return Err(PackError::Input(
                "An API URL is required for the custom provider".to_string(),
            ));
        }

        info!("Configured cloud translator: {} at {}", model, endpoint);
        Ok(TranslatorSpec::OpenAiCompatible {
            endpoint,
            model: model.to_string(),
            api_key: params.api_key,
            temperature: params.temperature.clamp(0.0, 2.0),
            max_tokens: params.max_tokens,
            system_prompt: params.system_prompt,
        })
    }
}

pub fn local_ollama_descriptor(models: &[String]) -> NodeDescriptor {
    let default = models.first().cloned().unwrap_or_default();
    NodeDescriptor {
        type_name: "LocalOllamaLoader".to_string(),
        display_name: "Local Ollama Model".to_string(),
        category: "jimaku/api".to_string(),
        output_node: false,
        inputs: vec![
            InputSpec::widget(
                "ollama_model",
                Widget::Choice {
                    choices: models.to_vec(),
                    default,
                },
                true,
                "Installed Ollama model",
            ),
            InputSpec::widget(
                "ollama_url",
                Widget::Text {
                    default: "http://localhost:11434".to_string(),
                    multiline: false,
                },
                true,
                "Ollama service URL",
            ),
            InputSpec::widget(
                "temperature",
                Widget::Float {
                    default: 0.3,
                    min: 0.0,
                    max: 2.0,
                    step: 0.1,
                },
                false,
                "Sampling temperature",
            ),
            InputSpec::widget(
                "system_prompt",
                Widget::Text {
                    default: String::new(),
                    multiline: true,
                },
                false,
                "Custom translation prompt, blank for the default",
            ),
        ],
        outputs: vec![OutputSpec::new("translator", PortType::Translator)],
    }
}

pub fn cloud_api_descriptor() -> NodeDescriptor {
    NodeDescriptor {
        type_name: "CloudApiLoader".to_string(),
        display_name: "Cloud API Model".to_string(),
        category: "jimaku/api".to_string(),
        output_node: false,
        inputs: vec![
            InputSpec::widget(
                "provider",
                Widget::Choice {
                    choices: CLOUD_PROVIDERS.iter().map(|p| p.to_string()).collect(),
                    default: default_provider(),
                },
                true,
                "API provider preset",
            ),
            InputSpec::widget(
                "api_key",
                Widget::Text {
                    default: String::new(),
                    multiline: false,
                },
                true,
                "API key, blank for keyless endpoints",
            ),
            InputSpec::widget(
                "model_name",
                Widget::Text {
                    default: default_model_name(),
                    multiline: false,
                },
                true,
                "Model name at the provider",
            ),
            InputSpec::widget(
                "api_url",
                Widget::Text {
                    default: String::new(),
                    multiline: false,
                },
                false,
                "Chat completions URL, overrides the provider preset",
            ),
            InputSpec::widget(
                "temperature",
                Widget::Float {
                    default: 0.3,
                    min: 0.0,
                    max: 2.0,
                    step: 0.1,
                },
                false,
                "Sampling temperature",
            ),
            InputSpec::widget(
                "max_tokens",
                Widget::Integer {
                    default: 1024,
                    min: 64,
                    max: 8192,
                    step: 64,
                },
                false,
                "Response token budget",
            ),
            InputSpec::widget(
                "system_prompt",
                Widget::Text {
                    default: String::new(),
                    multiline: true,
                },
                false,
                "Custom translation prompt, blank for the default",
            ),
        ],
        outputs: vec![OutputSpec::new("translator", PortType::Translator)],
    }
}
