use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{PackError, Result};

// Default values for translation configuration
fn default_translate_timeout_secs() -> u64 {
    60
}

fn default_system_prompt() -> String {
    "You are a professional subtitle translator. Translate the following text into {target_language}. Output only the translation, with no explanations and no extra punctuation.".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackConfig {
    pub workspace: WorkspaceConfig,
    pub media: MediaConfig,
    pub transcriber: TranscriberConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Directory holding host-managed input media
    pub media_dir: PathBuf,
    /// Directory where saved results land
    pub output_dir: PathBuf,
    /// Scratch directory for extracted audio, generated scripts, burned videos
    pub scratch_dir: PathBuf,
    /// Directory holding transcription models
    pub models_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary
    pub probe_binary_path: String,
    /// Encoding preset for burn-in (ultrafast, fast, medium, slow, veryslow)
    pub encode_preset: String,
    /// Constant rate factor for burn-in (0-51, lower = better quality)
    pub encode_crf: u32,
    /// Wall-clock limit for one encode invocation
    pub encode_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriberConfig {
    /// Path to transcriber binary (e.g., whisper-ctranslate2)
    pub binary_path: String,
    /// Model used when the node does not choose one
    pub default_model: String,
    /// Compute precision used when the node does not choose one
    pub default_compute: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateConfig {
    /// Ollama endpoint URL
    pub endpoint: String,
    /// LLM model to use for translation
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Token budget for chat-style back-ends
    pub max_tokens: u32,
    /// Per-request timeout
    #[serde(default = "default_translate_timeout_secs")]
    pub timeout_secs: u64,
    /// Prompt template; `{target_language}` is substituted per request
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            workspace: WorkspaceConfig {
                media_dir: PathBuf::from("input"),
                output_dir: PathBuf::from("output"),
                scratch_dir: PathBuf::from("temp"),
                models_dir: PathBuf::from("models"),
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_binary_path: "ffprobe".to_string(),
                encode_preset: "medium".to_string(),
                encode_crf: 23,
                encode_timeout_secs: 3600,
            },
            transcriber: TranscriberConfig {
                binary_path: "whisper-ctranslate2".to_string(),
                default_model: "base".to_string(),
                default_compute: "float16".to_string(),
            },
            translate: TranslateConfig {
                endpoint: "http://localhost:11434".to_string(),
                model: "qwen2.5:7b".to_string(),
                temperature: 0.3,
                max_tokens: 1024,
                timeout_secs: default_translate_timeout_secs(),
                system_prompt: default_system_prompt(),
            },
        }
    }
}

impl WorkspaceConfig {
    /// Creates the workspace directories if they are missing.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.media_dir, &self.output_dir, &self.scratch_dir, &self.models_dir] {
            std::fs::create_dir_all(dir)
                .map_err(|e| PackError::Config(format!("Failed to create {}: {}", dir.display(), e)))?;
        }
        Ok(())
    }
}

impl PackConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PackError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| PackError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| PackError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| PackError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}
