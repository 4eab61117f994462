// Speech recognition architecture
//
// This module turns extracted audio into cue tracks through a trait-based
// transcriber:
// - Transcriber: the single seam for transcription backends
// - FasterWhisperTranscriber: CLI implementation shelling out to
//   whisper-ctranslate2 with JSON output
// - ModelCache: keeps the last constructed transcriber keyed by
//   (model, compute) so repeated runs skip model reloads

pub mod faster_whisper;

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::info;

use crate::config::PackConfig;
use crate::error::{PackError, Result};
use crate::subtitle::{Cue, CueTrack};

pub use faster_whisper::FasterWhisperTranscriber;

/// Recognition models the transcriber accepts.
pub const WHISPER_MODELS: &[&str] = &[
    "tiny",
    "tiny.en",
    "base",
    "base.en",
    "small",
    "small.en",
    "medium",
    "medium.en",
    "large-v1",
    "large-v2",
    "large-v3",
    "large-v3-turbo",
    "distil-large-v2",
    "distil-large-v3",
    "distil-medium.en",
    "distil-small.en",
];

/// Inference precisions the transcriber accepts.
pub const COMPUTE_TYPES: &[&str] = &[
    "float32",
    "float16",
    "int8",
    "int8_float16",
    "int8_float32",
    "int8_bfloat16",
    "bfloat16",
];

/// Model identity for cache invalidation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub model: String,
    pub compute: String,
}

impl ModelSpec {
    /// Build a spec from widget strings, rejecting anything outside the
    /// published catalogs.
    pub fn new(model: impl Into<String>, compute: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let compute = compute.into();
        if !WHISPER_MODELS.contains(&model.as_str()) {
            return Err(PackError::Input(format!("Unknown recognition model: {model}")));
        }
        if !COMPUTE_TYPES.contains(&compute.as_str()) {
            return Err(PackError::Input(format!("Unknown compute type: {compute}")));
        }
        Ok(Self { model, compute })
    }
}

/// One transcription run.
#[derive(Debug, Clone)]
pub struct TranscribeRequest {
    pub audio_path: PathBuf,
    /// Recognition language code, `None` for auto-detection
    pub language: Option<String>,
    pub beam_size: u32,
    pub vad_filter: bool,
}

/// One recognized speech span.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Full transcription result.
#[derive(Debug, Clone)]
pub struct TranscribeOutput {
    pub text: String,
    pub segments: Vec<Segment>,
    /// Detected (or forced) language code
    pub language: Option<String>,
}

/// Main trait for transcription operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file into timed segments
    async fn transcribe(&self, request: &TranscribeRequest) -> Result<TranscribeOutput>;
}

/// Convert recognized segments into a cue track, numbering from 1.
pub fn segments_to_track(segments: &[Segment]) -> CueTrack {
    let cues = segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            Cue::new(
                Some(i as u32 + 1),
                segment.start,
                segment.end,
                segment.text.trim(),
            )
        })
        .collect();
    CueTrack::new(cues)
}

/// Factory for creating transcriber instances
pub struct TranscriberFactory;

impl TranscriberFactory {
    pub fn create(spec: &ModelSpec, config: &PackConfig) -> Box<dyn Transcriber> {
        Box::new(FasterWhisperTranscriber::new(
            &config.transcriber.binary_path,
            &config.workspace.models_dir,
            spec.clone(),
        ))
    }
}

/// Holds the transcriber for the most recently requested model. Asking
/// for a different (model, compute) pair drops the held one first.
#[derive(Default)]
pub struct ModelCache {
    loaded: Option<(ModelSpec, Box<dyn Transcriber>)>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The model spec currently held, if any.
    pub fn current(&self) -> Option<&ModelSpec> {
        self.loaded.as_ref().map(|(spec, _)| spec)
    }

    pub fn get_or_load(&mut self, spec: &ModelSpec, config: &PackConfig) -> &dyn Transcriber {
        if self
            .loaded
            .as_ref()
            .is_some_and(|(held, _)| held != spec)
        {
            self.loaded = None;
        }

        let (_, transcriber) = self.loaded.get_or_insert_with(|| {
            info!(
                "Loading recognition model: {} ({})",
                spec.model, spec.compute
            );
            (spec.clone(), TranscriberFactory::create(spec, config))
        });
        (*transcriber).as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_spec_validation() {
        assert!(ModelSpec::new("large-v3", "float16").is_ok());
        assert!(ModelSpec::new("distil-small.en", "int8_bfloat16").is_ok());

        let err = ModelSpec::new("huge-v9", "float16").unwrap_err();
        assert!(matches!(err, PackError::Input(_)));
        let err = ModelSpec::new("base", "float8").unwrap_err();
        assert!(matches!(err, PackError::Input(_)));
    }

    #[test]
    fn test_segments_to_track_numbers_and_trims() {
        let segments = vec![
            Segment {
                start: 0.0,
                end: 1.5,
                text: " hello there ".to_string(),
            },
            Segment {
                start: 1.5,
                end: 3.0,
                text: "second".to_string(),
            },
        ];

        let track = segments_to_track(&segments);
        assert_eq!(track.len(), 2);
        assert_eq!(track.cues[0].index, Some(1));
        assert_eq!(track.cues[0].text, "hello there");
        assert_eq!(track.cues[1].index, Some(2));
        assert_eq!(track.cues[1].start, 1.5);
    }

    #[test]
    fn test_model_cache_swaps_on_spec_change() {
        let config = PackConfig::default();
        let mut cache = ModelCache::new();
        assert!(cache.current().is_none());

        let base = ModelSpec::new("base", "float16").unwrap();
        cache.get_or_load(&base, &config);
        assert_eq!(cache.current(), Some(&base));

        // Same spec keeps the held transcriber.
        cache.get_or_load(&base, &config);
        assert_eq!(cache.current(), Some(&base));

        let large = ModelSpec::new("large-v3", "int8").unwrap();
        cache.get_or_load(&large, &config);
        assert_eq!(cache.current(), Some(&large));
    }
}
