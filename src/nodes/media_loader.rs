use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use crate::error::{PackError, Result};
use crate::media::{self, MediaKind};
use crate::workspace::Workspace;

use super::{InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

#[derive(Debug, Clone, Deserialize)]
pub struct MediaLoaderParams {
    /// File name inside the media library, as listed by the host
    pub media_file: String,
}

/// Resolved media ready for downstream nodes. Audio inputs pass through
/// unchanged; video inputs additionally carry the source path for burn-in.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaOutput {
    pub audio_path: PathBuf,
    pub video_path: Option<PathBuf>,
}

/// Resolves a library file and guarantees an audio track for recognition.
pub struct MediaLoaderNode;

impl MediaLoaderNode {
    pub async fn run(&self, workspace: &Workspace, params: MediaLoaderParams) -> Result<MediaOutput> {
        let name = params.media_file.trim();
        if name.is_empty() {
            return Err(PackError::Input("No media file selected".to_string()));
        }
        if name.contains('/') || name.contains('\\') || name.contains("..") {
            return Err(PackError::Input(format!("Invalid media file name: {name}")));
        }

        let path = workspace.media_dir().join(name);
        if !path.exists() {
            return Err(PackError::FileNotFound(path.display().to_string()));
        }

        match media::classify(&path) {
            Some(MediaKind::Audio) => {
                info!("Loaded audio file: {}", path.display());
                Ok(MediaOutput {
                    audio_path: path,
                    video_path: None,
                })
            }
            Some(MediaKind::Video) => {
                let audio_path = media::extract_audio_cached(
                    workspace.runner(),
                    &workspace.config().media.binary_path,
                    &path,
                    workspace.scratch_dir(),
                )
                .await?;
                info!("Loaded video file: {}", path.display());
                Ok(MediaOutput {
                    audio_path,
                    video_path: Some(path),
                })
            }
            None => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string();
                Err(PackError::UnsupportedFormat(ext))
            }
        }
    }
}

pub fn descriptor(media_files: &[String]) -> NodeDescriptor {
    let default = media_files.first().cloned().unwrap_or_default();
    NodeDescriptor {
        type_name: "MediaLoader".to_string(),
        display_name: "Load Media".to_string(),
        category: "jimaku/media".to_string(),
        output_node: false,
        inputs: vec![InputSpec::widget(
            "media_file",
            Widget::Choice {
                choices: media_files.to_vec(),
                default,
            },
            true,
            "Audio or video file from the media library",
        )],
        outputs: vec![
            OutputSpec::new("audio_path", PortType::AudioPath),
            OutputSpec::new("video_path", PortType::VideoPath),
        ],
    }
}
