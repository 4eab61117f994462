use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;
use crate::media::{BurnOrchestrator, BurnRequest};
use crate::subtitle::layout::{HorizontalPlacement, LayoutSpec, NamedColor, VerticalMargin};
use crate::subtitle::script::ScriptLayout;
use crate::subtitle::srt;
use crate::workspace::Workspace;

use super::{InputSpec, NodeDescriptor, OutputSpec, PortType, Widget};

fn default_primary_size() -> u32 {
    24
}

fn default_secondary_size() -> u32 {
    20
}

fn default_primary_color() -> NamedColor {
    NamedColor::White
}

fn default_secondary_color() -> NamedColor {
    NamedColor::Yellow
}

fn default_outline_color() -> NamedColor {
    NamedColor::Black
}

fn default_outline_width() -> u32 {
    2
}

fn default_centered() -> i64 {
    -1
}

fn default_bottom_margin() -> i64 {
    -1
}

fn default_stacked() -> i64 {
    -2
}

fn default_font_name() -> String {
    "Arial".to_string()
}

/// Style widgets mirror the two tracks: `text_*` for the recognized
/// track, `trans_*` for the translated one. Positions use the widget
/// sentinels (-1 centered/default margin, -2 right-aligned/auto-stack).
#[derive(Debug, Clone, Deserialize)]
pub struct VideoBurnParams {
    pub video_path: PathBuf,
    #[serde(default)]
    pub srt_text: String,
    #[serde(default)]
    pub translated_srt_text: String,

    #[serde(default = "default_primary_size")]
    pub text_size: u32,
    #[serde(default = "default_primary_color")]
    pub text_color: NamedColor,
    #[serde(default = "default_centered")]
    pub text_position_x: i64,
    #[serde(default = "default_bottom_margin")]
    pub text_position_y: i64,
    #[serde(default = "default_outline_color")]
    pub text_outline_color: NamedColor,
    #[serde(default = "default_outline_width")]
    pub text_outline_width: u32,

    #[serde(default = "default_secondary_size")]
    pub trans_text_size: u32,
    #[serde(default = "default_secondary_color")]
    pub trans_text_color: NamedColor,
    #[serde(default = "default_centered")]
    pub trans_position_x: i64,
    #[serde(default = "default_stacked")]
    pub trans_position_y: i64,
    #[serde(default = "default_outline_color")]
    pub trans_outline_color: NamedColor,
    #[serde(default = "default_outline_width")]
    pub trans_outline_width: u32,

    #[serde(default = "default_font_name")]
    pub font_name: String,
}

impl VideoBurnParams {
    fn primary_layout(&self) -> LayoutSpec {
        LayoutSpec {
            font_size: self.text_size,
            fill: self.text_color,
            outline: self.text_outline_color,
            outline_width: self.text_outline_width,
            horizontal: HorizontalPlacement::from_widget(self.text_position_x),
            vertical: VerticalMargin::from_widget(self.text_position_y),
        }
    }

    fn secondary_layout(&self) -> LayoutSpec {
        LayoutSpec {
            font_size: self.trans_text_size,
            fill: self.trans_text_color,
            outline: self.trans_outline_color,
            outline_width: self.trans_outline_width,
            horizontal: HorizontalPlacement::from_widget(self.trans_position_x),
            vertical: VerticalMargin::from_widget(self.trans_position_y),
        }
    }
}

/// Burns one or two subtitle tracks into a video.
pub struct VideoBurnNode;

impl VideoBurnNode {
    pub async fn run(&self, workspace: &Workspace, params: VideoBurnParams) -> Result<PathBuf> {
        let layout = ScriptLayout::new(
            params.font_name.clone(),
            params.primary_layout(),
            params.secondary_layout(),
        );
        let request = BurnRequest {
            video_path: params.video_path.clone(),
            primary: srt::parse(&params.srt_text),
            secondary: srt::parse(&params.translated_srt_text),
            layout,
        };

        let orchestrator = BurnOrchestrator::new(
            workspace.runner(),
            &workspace.config().media,
            workspace.scratch_dir(),
            workspace.media_dir(),
        );
        orchestrator.burn(&request).await
    }
}

pub fn descriptor() -> NodeDescriptor {
    let colors = || NamedColor::ALL.iter().map(|c| c.name().to_string()).collect::<Vec<_>>();
    NodeDescriptor {
        type_name: "VideoBurn".to_string(),
        display_name: "Burn Subtitles".to_string(),
        category: "jimaku/video".to_string(),
        output_node: false,
        inputs: vec![
            InputSpec::port("video_path", PortType::VideoPath, true, "Source video"),
            InputSpec::port("srt_text", PortType::SrtText, true, "Recognized subtitles"),
            InputSpec::port(
                "translated_srt_text",
                PortType::SrtText,
                false,
                "Translated subtitles, rendered as a second track",
            ),
            InputSpec::widget(
                "text_size",
                Widget::Integer { default: 24, min: 8, max: 72, step: 1 },
                false,
                "Primary font size",
            ),
            InputSpec::widget(
                "text_color",
                Widget::Choice { choices: colors(), default: "white".to_string() },
                false,
                "Primary fill color",
            ),
            InputSpec::widget(
                "text_position_x",
                Widget::Integer { default: -1, min: -2, max: 3840, step: 1 },
                false,
                "-1 centered, -2 right, otherwise left offset in pixels",
            ),
            InputSpec::widget(
                "text_position_y",
                Widget::Integer { default: 50, min: -1, max: 2160, step: 1 },
                false,
                "Bottom margin in pixels, -1 for the default",
            ),
            InputSpec::widget(
                "text_outline_color",
                Widget::Choice { choices: colors(), default: "black".to_string() },
                false,
                "Primary outline color",
            ),
            InputSpec::widget(
                "text_outline_width",
                Widget::Integer { default: 2, min: 0, max: 10, step: 1 },
                false,
                "Primary outline width",
            ),
            InputSpec::widget(
                "trans_text_size",
                Widget::Integer { default: 20, min: 8, max: 72, step: 1 },
                false,
                "Translated font size",
            ),
            InputSpec::widget(
                "trans_text_color",
                Widget::Choice { choices: colors(), default: "yellow".to_string() },
                false,
                "Translated fill color",
            ),
            InputSpec::widget(
                "trans_position_x",
                Widget::Integer { default: -1, min: -2, max: 3840, step: 1 },
                false,
                "-1 centered, -2 right, otherwise left offset in pixels",
            ),
            InputSpec::widget(
                "trans_position_y",
                Widget::Integer { default: -2, min: -2, max: 2160, step: 1 },
                false,
                "Bottom margin in pixels, -2 to stack above the primary track",
            ),
            InputSpec::widget(
                "trans_outline_color",
                Widget::Choice { choices: colors(), default: "black".to_string() },
                false,
                "Translated outline color",
            ),
            InputSpec::widget(
                "trans_outline_width",
                Widget::Integer { default: 2, min: 0, max: 10, step: 1 },
                false,
                "Translated outline width",
            ),
            InputSpec::widget(
                "font_name",
                Widget::Text { default: "Arial".to_string(), multiline: false },
                false,
                "Font family for both tracks",
            ),
        ],
        outputs: vec![OutputSpec::new("video_path", PortType::BurnedVideoPath)],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PackConfig;
    use crate::media::runner::{MockCommandRunner, ProcessOutput};
    use serde_json::json;
    use std::path::Path;

    const SAMPLE_SRT: &str = "1\n00:00:00,000 --> 00:00:02,000\nHello\n";

    fn workspace_at(root: &Path, runner: MockCommandRunner) -> Workspace {
        let mut config = PackConfig::default();
        config.workspace.media_dir = root.join("input");
        config.workspace.output_dir = root.join("output");
        config.workspace.scratch_dir = root.join("temp");
        config.workspace.models_dir = root.join("models");
        Workspace::with_runner(config, Box::new(runner)).unwrap()
    }

    #[test]
    fn test_default_widgets_match_builtin_layouts() {
        let params: VideoBurnParams =
            serde_json::from_value(json!({ "video_path": "/videos/in.mp4" })).unwrap();
        assert_eq!(params.primary_layout(), LayoutSpec::primary_default());
        assert_eq!(params.secondary_layout(), LayoutSpec::secondary_default());
        assert_eq!(params.font_name, "Arial");
    }

    #[test]
    fn test_color_names_deserialize() {
        let params: VideoBurnParams = serde_json::from_value(json!({
            "video_path": "/videos/in.mp4",
            "text_color": "light_gray",
            "trans_text_color": "purple",
        }))
        .unwrap();
        assert_eq!(params.text_color, NamedColor::LightGray);
        assert_eq!(params.trans_text_color, NamedColor::Purple);
    }

    #[test]
    fn test_position_widgets_map_to_placements() {
        let params: VideoBurnParams = serde_json::from_value(json!({
            "video_path": "/videos/in.mp4",
            "text_position_x": 120,
            "text_position_y": 30,
            "trans_position_x": -2,
        }))
        .unwrap();

        let primary = params.primary_layout();
        assert_eq!(primary.horizontal, HorizontalPlacement::LeftAt(120));
        assert_eq!(primary.vertical, VerticalMargin::Pixels(30));

        let secondary = params.secondary_layout();
        assert_eq!(secondary.horizontal, HorizontalPlacement::RightAligned);
        assert_eq!(secondary.vertical, VerticalMargin::AutoStack);
    }

    #[tokio::test]
    async fn test_run_burns_to_scratch_output() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mp4");
        std::fs::write(&video, b"ftyp").unwrap();

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.description == "Frame probe")
            .returning(|_, _| {
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    stdout: r#"{"streams":[{"width":1920,"height":1080}]}"#.to_string(),
                    stderr: String::new(),
                })
            });
        runner
            .expect_run()
            .withf(|cmd, _| cmd.description == "Script-based subtitle burn")
            .times(1)
            .returning(|_, _| {
                Ok(ProcessOutput {
                    exit_code: Some(0),
                    stdout: String::new(),
                    stderr: String::new(),
                })
            });
        let workspace = workspace_at(dir.path(), runner);

        let params: VideoBurnParams = serde_json::from_value(json!({
            "video_path": video,
            "srt_text": SAMPLE_SRT,
        }))
        .unwrap();
        let output = VideoBurnNode.run(&workspace, params).await.unwrap();
        assert_eq!(
            output,
            workspace.scratch_dir().join("burned_videos").join("talk_burned.mp4")
        );
    }

    #[tokio::test]
    async fn test_run_without_subtitles_returns_source() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mp4");
        std::fs::write(&video, b"ftyp").unwrap();
        let workspace = workspace_at(dir.path(), MockCommandRunner::new());

        let params: VideoBurnParams =
            serde_json::from_value(json!({ "video_path": video })).unwrap();
        let output = VideoBurnNode.run(&workspace, params).await.unwrap();
        assert_eq!(output, video);
    }
}
