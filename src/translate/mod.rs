// Modular translation architecture
//
// This module provides translation back-ends behind a single trait:
// - Ollama: local generation endpoint (/api/generate)
// - OpenAiCompatible: hosted chat-completions endpoints with bearer auth
//
// Back-ends never fail a cue: any transport or parse problem logs a
// warning and hands the source text back, so a dead endpoint degrades a
// run instead of aborting it.

pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::TranslateConfig;

pub use ollama::{list_installed_models, OllamaTranslator, FALLBACK_OLLAMA_MODELS};
pub use openai::OpenAiTranslator;

/// Translation target languages offered to the host.
pub const TRANSLATION_TARGETS: &[&str] = &[
    "zh-CN", "zh-TW", "en", "ja", "ko", "fr", "de", "es", "ru", "it", "pt", "ar", "th", "vi",
];

/// Main trait for translation operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranslatorBackend: Send + Sync {
    /// Translate one piece of text into the named target language.
    /// Returns the source text unchanged when the back-end cannot answer.
    async fn translate(&self, text: &str, target_language: &str) -> String;
}

/// Serializable back-end selection produced by the loader nodes and
/// consumed wherever translation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum TranslatorSpec {
    Ollama {
        endpoint: String,
        model: String,
        temperature: f32,
        /// Empty string means the configured default prompt
        system_prompt: String,
    },
    OpenAiCompatible {
        endpoint: String,
        model: String,
        api_key: String,
        temperature: f32,
        max_tokens: u32,
        /// Empty string means the configured default prompt
        system_prompt: String,
    },
}

/// Factory for creating translator instances
pub struct TranslatorFactory;

impl TranslatorFactory {
    pub fn create(spec: &TranslatorSpec, config: &TranslateConfig) -> Box<dyn TranslatorBackend> {
        match spec {
            TranslatorSpec::Ollama {
                endpoint,
                model,
                temperature,
                system_prompt,
            } => {
                let prompt = if system_prompt.trim().is_empty() {
                    config.system_prompt.clone()
                } else {
                    system_prompt.clone()
                };
                Box::new(OllamaTranslator::new(
                    endpoint,
                    model,
                    *temperature,
                    prompt,
                    config.timeout_secs,
                ))
            }
            TranslatorSpec::OpenAiCompatible {
                endpoint,
                model,
                api_key,
                temperature,
                max_tokens,
                system_prompt,
            } => {
                let prompt = if system_prompt.trim().is_empty() {
                    config.system_prompt.clone()
                } else {
                    system_prompt.clone()
                };
                Box::new(OpenAiTranslator::new(
                    endpoint,
                    model,
                    api_key,
                    *temperature,
                    *max_tokens,
                    prompt,
                    config.timeout_secs,
                ))
            }
        }
    }

    /// Spec pointing at the configured local endpoint and model.
    pub fn default_spec(config: &TranslateConfig) -> TranslatorSpec {
        TranslatorSpec::Ollama {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: String::new(),
        }
    }
}

/// Convert a target language code to a full language name for prompts
pub fn language_name(code: &str) -> String {
    match code {
        "zh-CN" => "Simplified Chinese".to_string(),
        "zh-TW" => "Traditional Chinese".to_string(),
        "en" => "English".to_string(),
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "fr" => "French".to_string(),
        "de" => "German".to_string(),
        "es" => "Spanish".to_string(),
        "ru" => "Russian".to_string(),
        "it" => "Italian".to_string(),
        "pt" => "Portuguese".to_string(),
        "ar" => "Arabic".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        _ => code.to_string(), // Fallback to the code itself if not found
    }
}
