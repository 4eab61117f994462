use std::path::PathBuf;

use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::workspace::Workspace;

use super::{counter_tag, InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

const SRT_SUBFOLDER: &str = "srt";
const EMPTY_PLACEHOLDER: &str = "(no subtitle content)";

fn default_filename() -> String {
    "subtitles".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextDisplayParams {
    #[serde(default)]
    pub srt_text: String,
    #[serde(default)]
    pub translated_srt_text: String,
    #[serde(default)]
    pub save_to_file: bool,
    #[serde(default = "default_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextDisplayOutput {
    pub text: String,
    pub translated_text: String,
    pub saved_path: Option<PathBuf>,
    pub saved_translated_path: Option<PathBuf>,
}

/// Shows subtitle text in the editor and optionally writes it out as SRT.
/// Both files of a run share one collision counter, so a pair never splits
/// across numbers.
pub struct TextDisplayNode;

impl TextDisplayNode {
    pub async fn run(&self, workspace: &Workspace, params: TextDisplayParams) -> Result<TextDisplayOutput> {
        let has_content = !params.srt_text.trim().is_empty();
        let text = if has_content {
            params.srt_text.clone()
        } else {
            EMPTY_PLACEHOLDER.to_string()
        };

        let mut output = TextDisplayOutput {
            text,
            translated_text: params.translated_srt_text.clone(),
            saved_path: None,
            saved_translated_path: None,
        };
        if !params.save_to_file || !has_content {
            return Ok(output);
        }

        let name = match params.filename.trim() {
            "" => default_filename(),
            trimmed => trimmed.to_string(),
        };
        let target_dir = workspace.output_dir().join(SRT_SUBFOLDER);
        fs::create_dir_all(&target_dir).await?;

        // The primary name decides the counter for both files.
        let mut counter = 1u32;
        let tag = loop {
            let tag = counter_tag(counter);
            if !target_dir.join(format!("{name}{tag}.srt")).exists() {
                break tag;
            }
            counter += 1;
        };

        let primary_path = target_dir.join(format!("{name}{tag}.srt"));
        fs::write(&primary_path, &params.srt_text).await?;
        info!("Saved subtitles to {}", primary_path.display());
        output.saved_path = Some(primary_path);

        if !params.translated_srt_text.trim().is_empty() {
            let translated_path = target_dir.join(format!("{name}{tag}_translated.srt"));
            fs::write(&translated_path, &params.translated_srt_text).await?;
            info!("Saved translated subtitles to {}", translated_path.display());
            output.saved_translated_path = Some(translated_path);
        }

        Ok(output)
    }
}

pub fn descriptor() -> NodeDescriptor {
    NodeDescriptor {
        type_name: "TextDisplay".to_string(),
        display_name: "Display Subtitles".to_string(),
        category: "jimaku/tools".to_string(),
        output_node: true,
        inputs: vec![
            InputSpec::port("srt_text", PortType::SrtText, true, "Subtitles to show"),
            InputSpec::port(
                "translated_srt_text",
                PortType::SrtText,
                false,
                "Translated subtitles to show alongside",
            ),
            InputSpec::widget(
                "save_to_file",
                Widget::Boolean { default: false },
                false,
                "Also write the text as SRT files",
            ),
            InputSpec::widget(
                "filename",
                Widget::Text {
                    default: default_filename(),
                    multiline: false,
                },
                false,
                "Saved file name without extension",
            ),
        ],
        outputs: vec![
            OutputSpec::new("text", PortType::Text),
            OutputSpec::new("translated_text", PortType::Text),
        ],
    }
}
