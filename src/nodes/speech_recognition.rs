use std::path::PathBuf;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{PackError, Result};
use crate::subtitle::{srt, Cue, CueTrack};
use crate::transcribe::{segments_to_track, ModelCache, ModelSpec, TranscribeRequest, COMPUTE_TYPES, WHISPER_MODELS};
use crate::translate::{language_name, TranslatorBackend, TranslatorFactory, TranslatorSpec, TRANSLATION_TARGETS};
use crate::workspace::Workspace;

use super::{InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

/// Recognition language codes offered by the node. `auto` delegates
/// detection to the recognition engine.
pub const RECOGNITION_LANGUAGES: &[&str] = &[
    "auto", "zh", "en", "ja", "ko", "fr", "de", "es", "ru", "it", "pt", "nl", "pl", "tr", "ar",
    "th", "vi", "id", "hi",
];

fn default_model() -> String {
    "large-v3".to_string()
}

fn default_compute() -> String {
    "float16".to_string()
}

fn default_language() -> String {
    "auto".to_string()
}

fn default_target() -> String {
    "none".to_string()
}

fn default_beam_size() -> u32 {
    5
}

fn default_vad_filter() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechRecognitionParams {
    pub audio_path: PathBuf,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_compute")]
    pub compute_type: String,
    /// Recognition language choice; `auto` or a code, labels tolerated
    #[serde(default = "default_language")]
    pub language: String,
    /// Translation target choice; `none` disables translation
    #[serde(default = "default_target")]
    pub translation_language: String,
    #[serde(default = "default_beam_size")]
    pub beam_size: u32,
    #[serde(default = "default_vad_filter")]
    pub vad_filter: bool,
    /// Connected translator; when absent the configured default is used
    #[serde(default)]
    pub translator: Option<TranslatorSpec>,
}

#[derive(Debug, Clone)]
pub struct RecognitionOutput {
    pub srt_text: String,
    /// Empty when no translation target was chosen
    pub translated_srt_text: String,
    pub detected_language: Option<String>,
}

/// Transcribes an audio track into SRT text, optionally translating every
/// cue. The node keeps the most recently used recognition model loaded so
/// repeated runs with unchanged settings skip the model swap.
pub struct SpeechRecognitionNode {
    cache: ModelCache,
}

impl SpeechRecognitionNode {
    pub fn new() -> Self {
        Self {
            cache: ModelCache::new(),
        }
    }

    pub async fn run(
        &mut self,
        workspace: &Workspace,
        params: SpeechRecognitionParams,
    ) -> Result<RecognitionOutput> {
        let config = workspace.config();
        if !params.audio_path.exists() {
            return Err(PackError::FileNotFound(params.audio_path.display().to_string()));
        }
        let spec = ModelSpec::new(&params.model, &params.compute_type)?;

        let request = TranscribeRequest {
            audio_path: params.audio_path.clone(),
            language: parse_language_choice(&params.language),
            beam_size: params.beam_size.clamp(1, 10),
            vad_filter: params.vad_filter,
        };
        let transcriber = self.cache.get_or_load(&spec, config);
        let output = transcriber.transcribe(&request).await?;

        let track = segments_to_track(&output.segments);
        info!(
            "Recognized {} cues from {}",
            track.len(),
            params.audio_path.display()
        );
        let srt_text = srt::to_srt(&track);

        let translated_srt_text = match parse_target_choice(&params.translation_language) {
            None => String::new(),
            Some(code) => {
                let translator_spec = params.translator.clone().unwrap_or_else(|| {
                    debug!("No translator connected, using the configured default");
                    TranslatorFactory::default_spec(&config.translate)
                });
                let backend = TranslatorFactory::create(&translator_spec, &config.translate);
                let target = language_name(&code);
                info!("Translating {} cues into {}", track.len(), target);
                let translated = translate_track(backend.as_ref(), &track, &target).await;
                srt::to_srt(&translated)
            }
        };

        Ok(RecognitionOutput {
            srt_text,
            translated_srt_text,
            detected_language: output.language,
        })
    }
}

impl Default for SpeechRecognitionNode {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a track cue by cue, keeping indices and timing. A cue whose
/// translation fails keeps its original text, so the result always lines
/// up with the source track.
pub async fn translate_track(
    backend: &dyn TranslatorBackend,
    track: &CueTrack,
    target_language: &str,
) -> CueTrack {
    let mut cues = Vec::with_capacity(track.len());
    for cue in &track.cues {
        let text = backend.translate(&cue.text, target_language).await;
        cues.push(Cue::new(cue.index, cue.start, cue.end, text));
    }
    CueTrack::new(cues)
}

/// Widget choices may carry a label after the code ("ja (Japanese)");
/// only the leading token matters.
fn parse_language_choice(choice: &str) -> Option<String> {
    let token = choice.split_whitespace().next().unwrap_or("");
    if token.is_empty() || token.eq_ignore_ascii_case("auto") {
        None
    } else {
        Some(token.to_string())
    }
}

fn parse_target_choice(choice: &str) -> Option<String> {
    let token = choice.split_whitespace().next().unwrap_or("");
    if token.is_empty() || token.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(token.to_string())
    }
}

pub fn descriptor() -> NodeDescriptor {
    let to_choices = |codes: &[&str]| codes.iter().map(|c| c.to_string()).collect::<Vec<_>>();
    let mut targets = vec!["none".to_string()];
    targets.extend(TRANSLATION_TARGETS.iter().map(|c| c.to_string()));

    NodeDescriptor {
        type_name: "SpeechRecognition".to_string(),
        display_name: "Speech Recognition".to_string(),
        category: "jimaku/recognition".to_string(),
        output_node: false,
        inputs: vec![
            InputSpec::port("audio_path", PortType::AudioPath, true, "Audio to transcribe"),
            InputSpec::port(
                "translator",
                PortType::Translator,
                false,
                "Translator from a model loader; configured default when unset",
            ),
            InputSpec::widget(
                "model",
                Widget::Choice {
                    choices: to_choices(WHISPER_MODELS),
                    default: default_model(),
                },
                true,
                "Recognition model",
            ),
            InputSpec::widget(
                "compute_type",
                Widget::Choice {
                    choices: to_choices(COMPUTE_TYPES),
                    default: default_compute(),
                },
                true,
                "Compute precision",
            ),
            InputSpec::widget(
                "language",
                Widget::Choice {
                    choices: to_choices(RECOGNITION_LANGUAGES),
                    default: default_language(),
                },
                true,
                "Spoken language, auto to detect",
            ),
            InputSpec::widget(
                "translation_language",
                Widget::Choice {
                    choices: targets,
                    default: default_target(),
                },
                true,
                "Translate cues into this language, none to skip",
            ),
            InputSpec::widget(
                "beam_size",
                Widget::Integer {
                    default: 5,
                    min: 1,
                    max: 10,
                    step: 1,
                },
                false,
                "Beam search width, higher is slower and more accurate",
            ),
            InputSpec::widget(
                "vad_filter",
                Widget::Boolean { default: true },
                false,
                "Drop silent stretches before recognition",
            ),
        ],
        outputs: vec![
            OutputSpec::new("srt_text", PortType::SrtText),
            OutputSpec::new("translated_srt_text", PortType::SrtText),
            OutputSpec::new("detected_language", PortType::Text),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::MockTranslatorBackend;
    use serde_json::json;

    #[test]
    fn test_language_choice_parsing() {
        assert_eq!(parse_language_choice("auto"), None);
        assert_eq!(parse_language_choice("auto (detect)"), None);
        assert_eq!(parse_language_choice("ja"), Some("ja".to_string()));
        assert_eq!(parse_language_choice("zh (Chinese)"), Some("zh".to_string()));
        assert_eq!(parse_language_choice(""), None);
    }

    #[test]
    fn test_target_choice_parsing() {
        assert_eq!(parse_target_choice("none"), None);
        assert_eq!(parse_target_choice("zh-CN (Simplified Chinese)"), Some("zh-CN".to_string()));
        assert_eq!(parse_target_choice("ja"), Some("ja".to_string()));
    }

    #[test]
    fn test_params_defaults() {
        let params: SpeechRecognitionParams =
            serde_json::from_value(json!({ "audio_path": "/tmp/a.wav" })).unwrap();
        assert_eq!(params.model, "large-v3");
        assert_eq!(params.compute_type, "float16");
        assert_eq!(params.language, "auto");
        assert_eq!(params.translation_language, "none");
        assert_eq!(params.beam_size, 5);
        assert!(params.vad_filter);
        assert!(params.translator.is_none());
    }

    #[tokio::test]
    async fn test_translate_track_preserves_timing() {
        let mut backend = MockTranslatorBackend::new();
        backend
            .expect_translate()
            .times(2)
            .returning(|text, _| format!("<{text}>"));

        let track = CueTrack::new(vec![
            Cue::new(Some(1), 0.0, 1.5, "Hello"),
            Cue::new(Some(2), 1.5, 3.0, "World"),
        ]);
        let translated = translate_track(&backend, &track, "Japanese").await;

        assert_eq!(translated.len(), 2);
        assert_eq!(translated.cues[0].index, Some(1));
        assert_eq!(translated.cues[0].start, 0.0);
        assert_eq!(translated.cues[0].end, 1.5);
        assert_eq!(translated.cues[0].text, "<Hello>");
        assert_eq!(translated.cues[1].text, "<World>");
    }

    #[tokio::test]
    async fn test_run_rejects_missing_audio() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = crate::config::PackConfig::default();
        config.workspace.media_dir = dir.path().join("input");
        config.workspace.output_dir = dir.path().join("output");
        config.workspace.scratch_dir = dir.path().join("temp");
        config.workspace.models_dir = dir.path().join("models");
        let workspace = Workspace::new(config).unwrap();

        let params: SpeechRecognitionParams =
            serde_json::from_value(json!({ "audio_path": dir.path().join("gone.wav") })).unwrap();
        let err = SpeechRecognitionNode::new().run(&workspace, params).await.unwrap_err();
        assert!(matches!(err, PackError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_run_rejects_unknown_model() {
        let dir = tempfile::tempdir().unwrap();
        let audio = dir.path().join("talk.wav");
        std::fs::write(&audio, b"riff").unwrap();

        let mut config = crate::config::PackConfig::default();
        config.workspace.media_dir = dir.path().join("input");
        config.workspace.output_dir = dir.path().join("output");
        config.workspace.scratch_dir = dir.path().join("temp");
        config.workspace.models_dir = dir.path().join("models");
        let workspace = Workspace::new(config).unwrap();

        let params: SpeechRecognitionParams =
            serde_json::from_value(json!({ "audio_path": audio, "model": "huge-v9" })).unwrap();
        let err = SpeechRecognitionNode::new().run(&workspace, params).await.unwrap_err();
        assert!(matches!(err, PackError::Input(_)));
    }
}
