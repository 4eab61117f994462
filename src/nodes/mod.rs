// Node surface for pipeline hosts
//
// Each file implements one node: a serde-typed parameter struct, a run
// entry point, and a descriptor the host renders as widgets and ports.
// The registry assembles every descriptor, resolving dynamic choice
// lists (media library contents, installed translation models) at call
// time.

pub mod media_loader;
pub mod model_loaders;
pub mod save_video;
pub mod speech_recognition;
pub mod text_display;
pub mod video_burn;

use serde::Serialize;

use crate::config::PackConfig;
use crate::media;
use crate::translate;

pub use media_loader::MediaLoaderNode;
pub use model_loaders::{CloudApiLoaderNode, LocalOllamaLoaderNode};
pub use save_video::SaveVideoNode;
pub use speech_recognition::SpeechRecognitionNode;
pub use text_display::TextDisplayNode;
pub use video_burn::VideoBurnNode;

/// Connection types moving between nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortType {
    AudioPath,
    VideoPath,
    BurnedVideoPath,
    SrtText,
    Translator,
    Text,
}

/// Host-rendered parameter widget.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Widget {
    Choice {
        choices: Vec<String>,
        default: String,
    },
    Text {
        default: String,
        multiline: bool,
    },
    Integer {
        default: i64,
        min: i64,
        max: i64,
        step: i64,
    },
    Float {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Boolean {
        default: bool,
    },
}

/// One node input: either a typed connection port or a widget.
#[derive(Debug, Clone, Serialize)]
pub struct InputSpec {
    pub name: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<PortType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget: Option<Widget>,
    pub tooltip: String,
}

impl InputSpec {
    pub fn port(name: &str, port: PortType, required: bool, tooltip: &str) -> Self {
        Self {
            name: name.to_string(),
            required,
            port: Some(port),
            widget: None,
            tooltip: tooltip.to_string(),
        }
    }

    pub fn widget(name: &str, widget: Widget, required: bool, tooltip: &str) -> Self {
        Self {
            name: name.to_string(),
            required,
            port: None,
            widget: Some(widget),
            tooltip: tooltip.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputSpec {
    pub name: String,
    pub port: PortType,
}

impl OutputSpec {
    pub fn new(name: &str, port: PortType) -> Self {
        Self {
            name: name.to_string(),
            port,
        }
    }
}

/// Everything the host needs to render and wire one node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDescriptor {
    pub type_name: String,
    pub display_name: String,
    pub category: String,
    /// Output nodes are executed even without downstream consumers
    pub output_node: bool,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
}

/// Collision tag for saved file names: empty for the first file,
/// `_0002` style for later ones.
pub(crate) fn counter_tag(counter: u32) -> String {
    if counter <= 1 {
        String::new()
    } else {
        format!("_{counter:04}")
    }
}

/// Assemble descriptors for every node in the pack. Dynamic choice
/// lists are resolved here so a stale editor picks up new media files
/// and models on refresh.
pub async fn registry(config: &PackConfig) -> Vec<NodeDescriptor> {
    let media_files = media::list_media_files(&config.workspace.media_dir)
        .map(|files| files.into_iter().map(|f| f.name).collect::<Vec<_>>())
        .unwrap_or_default();
    let ollama_models = translate::list_installed_models(&config.translate.endpoint).await;

    vec![
        media_loader::descriptor(&media_files),
        speech_recognition::descriptor(),
        model_loaders::local_ollama_descriptor(&ollama_models),
        model_loaders::cloud_api_descriptor(),
        video_burn::descriptor(),
        save_video::descriptor(),
        text_display::descriptor(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_covers_all_nodes() {
        let mut config = PackConfig::default();
        let dir = tempfile::tempdir().unwrap();
        config.workspace.media_dir = dir.path().to_path_buf();
        // Unroutable endpoint; listing falls back to fixed choices.
        config.translate.endpoint = "http://127.0.0.1:9".to_string();

        let descriptors = registry(&config).await;
        let names: Vec<&str> = descriptors.iter().map(|d| d.type_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "MediaLoader",
                "SpeechRecognition",
                "LocalOllamaLoader",
                "CloudApiLoader",
                "VideoBurn",
                "SaveVideo",
                "TextDisplay",
            ]
        );

        // Exactly the save and display nodes run as sinks.
        let sinks: Vec<&str> = descriptors
            .iter()
            .filter(|d| d.output_node)
            .map(|d| d.type_name.as_str())
            .collect();
        assert_eq!(sinks, vec!["SaveVideo", "TextDisplay"]);
    }

    #[test]
    fn test_descriptor_serialization_shape() {
        let spec = InputSpec::widget(
            "beam_size",
            Widget::Integer {
                default: 5,
                min: 1,
                max: 10,
                step: 1,
            },
            false,
            "Search width",
        );

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(value["name"], "beam_size");
        assert_eq!(value["widget"]["kind"], "integer");
        assert_eq!(value["widget"]["default"], 5);
        assert!(value.get("port").is_none());
    }
}
