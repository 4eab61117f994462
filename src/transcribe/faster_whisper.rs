use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::fs;
use tokio::process::Command;
use tracing::info;

use crate::error::{PackError, Result};
use crate::media::extract::file_stem;
use super::{ModelSpec, Segment, TranscribeOutput, TranscribeRequest, Transcriber};

/// Silence gap below this length is kept when the VAD filter runs.
const VAD_MIN_SILENCE_MS: u32 = 500;

/// JSON document the recognition binary writes next to the audio stem.
/// Segment entries carry more fields than these; the rest are ignored.
#[derive(Debug, Deserialize)]
struct WhisperJsonOutput {
    text: String,
    #[serde(default)]
    segments: Vec<WhisperJsonSegment>,
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WhisperJsonSegment {
    start: f64,
    end: f64,
    text: String,
}

/// CLI transcriber shelling out to whisper-ctranslate2.
pub struct FasterWhisperTranscriber {
    binary_path: String,
    models_dir: PathBuf,
    spec: ModelSpec,
}

impl FasterWhisperTranscriber {
    pub fn new(binary_path: impl Into<String>, models_dir: impl Into<PathBuf>, spec: ModelSpec) -> Self {
        Self {
            binary_path: binary_path.into(),
            models_dir: models_dir.into(),
            spec,
        }
    }

    /// Assemble the CLI invocation. A model directory under the configured
    /// models root takes precedence; otherwise the bare model name lets
    /// the binary resolve (and download) it.
    fn build_args(&self, request: &TranscribeRequest, output_dir: &Path) -> Vec<String> {
        let mut args = vec![request.audio_path.to_string_lossy().to_string()];

        let local_model = self.models_dir.join(&self.spec.model);
        if local_model.is_dir() {
            args.push("--model_directory".to_string());
            args.push(local_model.to_string_lossy().to_string());
        } else {
            args.push("--model".to_string());
            args.push(self.spec.model.clone());
        }

        args.push("--compute_type".to_string());
        args.push(self.spec.compute.clone());
        args.push("--output_format".to_string());
        args.push("json".to_string());
        args.push("--output_dir".to_string());
        args.push(output_dir.to_string_lossy().to_string());

        if let Some(language) = &request.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }

        args.push("--beam_size".to_string());
        args.push(request.beam_size.to_string());
        args.push("--vad_filter".to_string());
        args.push(if request.vad_filter { "True" } else { "False" }.to_string());
        if request.vad_filter {
            args.push("--vad_min_silence_duration_ms".to_string());
            args.push(VAD_MIN_SILENCE_MS.to_string());
        }

        args
    }
}

#[async_trait]
impl Transcriber for FasterWhisperTranscriber {
    async fn transcribe(&self, request: &TranscribeRequest) -> Result<TranscribeOutput> {
        if !request.audio_path.exists() {
            return Err(PackError::FileNotFound(
                request.audio_path.display().to_string(),
            ));
        }

        let temp_dir = tempfile::tempdir()?;
        let args = self.build_args(request, temp_dir.path());

        info!(
            "Transcribing {} with model {} ({})",
            request.audio_path.display(),
            self.spec.model,
            self.spec.compute
        );

        let output = Command::new(&self.binary_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PackError::Transcription(format!(
                    "Recognition binary not found: {}",
                    self.binary_path
                )),
                _ => PackError::Transcription(format!(
                    "Failed to run {}: {}",
                    self.binary_path, e
                )),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PackError::Transcription(format!(
                "Recognition failed: {}",
                stderr.trim()
            )));
        }

        let stem = file_stem(&request.audio_path)?;
        let json_path = temp_dir.path().join(format!("{stem}.json"));
        let json_content = fs::read_to_string(&json_path).await.map_err(|e| {
            PackError::Transcription(format!(
                "Recognition produced no readable output at {}: {}",
                json_path.display(),
                e
            ))
        })?;

        let result = parse_output(&json_content)?;
        info!(
            "Recognition complete: {} segment(s), language {}",
            result.segments.len(),
            result.language.as_deref().unwrap_or("unknown")
        );
        Ok(result)
    }
}

fn parse_output(json: &str) -> Result<TranscribeOutput> {
    let raw: WhisperJsonOutput = serde_json::from_str(json)
        .map_err(|e| PackError::Transcription(format!("Failed to parse recognition JSON: {e}")))?;

    let segments = raw
        .segments
        .into_iter()
        .map(|segment| Segment {
            start: segment.start,
            end: segment.end,
            text: segment.text.trim().to_string(),
        })
        .collect();

    Ok(TranscribeOutput {
        text: raw.text,
        segments,
        language: raw.language,
    })
}
