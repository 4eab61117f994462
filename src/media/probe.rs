use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{PackError, Result};
use super::commands::EncoderCommand;
use super::runner::CommandRunner;

pub const DEFAULT_FRAME_WIDTH: u32 = 1920;
pub const DEFAULT_FRAME_HEIGHT: u32 = 1080;

const PROBE_TIME_LIMIT: Duration = Duration::from_secs(30);

/// ffprobe JSON output reduced to the fields the layout needs.
#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Frame-dimension probe for the layout stage.
///
/// Candidates run in order: the probe tool, then the hardcoded
/// 1920x1080 default. Probing is never fatal; the generated script merely
/// lays out against the default canvas when the tool fails.
pub struct FrameProber {
    binary_path: String,
}

impl FrameProber {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub async fn probe(&self, runner: &dyn CommandRunner, video_path: &Path) -> (u32, u32) {
        match self.try_probe(runner, video_path).await {
            Ok((width, height)) => {
                debug!("Probed {} at {}x{}", video_path.display(), width, height);
                (width, height)
            }
            Err(e) => {
                warn!(
                    "Probe failed for {} ({}); using {}x{}",
                    video_path.display(),
                    e,
                    DEFAULT_FRAME_WIDTH,
                    DEFAULT_FRAME_HEIGHT
                );
                (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT)
            }
        }
    }

    async fn try_probe(&self, runner: &dyn CommandRunner, video_path: &Path) -> Result<(u32, u32)> {
        let command = EncoderCommand::new(&self.binary_path, "Frame probe")
            .arg("-v")
            .arg("quiet")
            .arg("-print_format")
            .arg("json")
            .arg("-show_streams")
            .arg("-select_streams")
            .arg("v:0")
            .arg(video_path.to_string_lossy().to_string());

        let output = runner.run(&command, PROBE_TIME_LIMIT).await?;
        if !output.success() {
            return Err(PackError::Media(format!(
                "Probe exited with {:?}",
                output.exit_code
            )));
        }

        let parsed: ProbeOutput = serde_json::from_str(&output.stdout)?;
        let stream = parsed
            .streams
            .first()
            .ok_or_else(|| PackError::Media("No video stream in probe output".to_string()))?;

        match (stream.width, stream.height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => Ok((width, height)),
            _ => Err(PackError::Media(
                "Probe output missing frame dimensions".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::runner::{MockCommandRunner, ProcessOutput};

    fn output(exit_code: i32, stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(exit_code),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    #[tokio::test]
    async fn test_probe_parses_stream_dimensions() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Ok(output(
                0,
                r#"{"streams":[{"width":1280,"height":720,"codec_type":"video"}]}"#,
            ))
        });

        let prober = FrameProber::new("ffprobe");
        let dims = prober.probe(&runner, Path::new("clip.mp4")).await;
        assert_eq!(dims, (1280, 720));
    }

    #[tokio::test]
    async fn test_probe_failure_returns_default() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(output(1, "")));

        let prober = FrameProber::new("ffprobe");
        let dims = prober.probe(&runner, Path::new("unreadable.mp4")).await;
        assert_eq!(dims, (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT));
    }

    #[tokio::test]
    async fn test_probe_bad_json_returns_default() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .times(1)
            .returning(|_, _| Ok(output(0, "not json")));

        let prober = FrameProber::new("ffprobe");
        let dims = prober.probe(&runner, Path::new("clip.mp4")).await;
        assert_eq!(dims, (DEFAULT_FRAME_WIDTH, DEFAULT_FRAME_HEIGHT));
    }
}
