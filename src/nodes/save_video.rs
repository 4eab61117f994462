use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::error::{PackError, Result};
use crate::workspace::Workspace;

use super::{counter_tag, InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

const VIDEO_SUBFOLDER: &str = "videos";

fn default_prefix() -> String {
    "output".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveVideoParams {
    pub video_path: PathBuf,
    #[serde(default = "default_prefix")]
    pub filename_prefix: String,
    /// Replace an existing file instead of picking a numbered name
    #[serde(default)]
    pub overwrite: bool,
}

/// Host preview payload for a saved file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavedPreview {
    pub filename: String,
    pub subfolder: String,
    #[serde(rename = "type")]
    pub location: String,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedVideo {
    pub path: PathBuf,
    pub preview: SavedPreview,
}

/// Copies a finished video into the output directory under a stable name.
pub struct SaveVideoNode;

impl SaveVideoNode {
    pub async fn run(&self, workspace: &Workspace, params: SaveVideoParams) -> Result<SavedVideo> {
        let source = &params.video_path;
        if !source.exists() {
            return Err(PackError::FileNotFound(source.display().to_string()));
        }

        let prefix = match params.filename_prefix.trim() {
            "" => default_prefix(),
            trimmed => trimmed.to_string(),
        };
        let extension = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_string();

        let target_dir = workspace.output_dir().join(VIDEO_SUBFOLDER);
        fs::create_dir_all(&target_dir).await?;

        let file_name = if params.overwrite {
            format!("{prefix}.{extension}")
        } else {
            let mut counter = 1u32;
            loop {
                let candidate = format!("{prefix}{}.{extension}", counter_tag(counter));
                if !target_dir.join(&candidate).exists() {
                    break candidate;
                }
                counter += 1;
            }
        };

        let path = target_dir.join(&file_name);
        fs::copy(source, &path).await?;
        info!("Saved video to {}", path.display());

        let subfolder = path
            .parent()
            .and_then(|parent| parent.strip_prefix(workspace.output_dir()).ok())
            .map(|rel| rel.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(SavedVideo {
            preview: SavedPreview {
                filename: file_name,
                subfolder,
                location: "output".to_string(),
                format: "video/mp4".to_string(),
            },
            path,
        })
    }
}

pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        type_name: "SaveVideo".to_string(),
        display_name: "Save Video".to_string(),
        category: "jimaku/video".to_string(),
        output_node: true,
        inputs: vec![
            InputSpec::port("video_path", PortType::BurnedVideoPath, true, "Video to save"),
            InputSpec::widget(
                "filename_prefix",
                Widget::Text {
                    default: default_prefix(),
                    multiline: false,
                },
                true,
                "Saved file name without extension",
            ),
            InputSpec::widget(
                "overwrite",
                Widget::Boolean { default: false },
                false,
                "Replace an existing file of the same name",
            ),
        ],
        outputs: vec![OutputSpec::new("saved_path", PortType::Text)],
    }
}
