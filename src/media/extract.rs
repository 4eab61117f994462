use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::info;

use crate::error::{PackError, Result};
use super::commands::EncoderCommandBuilder;
use super::runner::CommandRunner;

const EXTRACT_TIME_LIMIT: Duration = Duration::from_secs(600);

/// Extract the audio track of a video as 16kHz mono PCM, caching the result
/// under the scratch area. A previous extraction for the same video stem is
/// reused as-is.
pub async fn extract_audio_cached(
    runner: &dyn CommandRunner,
    binary_path: &str,
    video_path: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf> {
    let stem = file_stem(video_path)?;
    let audio_dir = scratch_dir.join("extracted_audio");
    fs::create_dir_all(&audio_dir).await?;
    let audio_path = audio_dir.join(format!("{stem}_audio.wav"));

    if fs::try_exists(&audio_path).await? {
        info!("Reusing cached audio: {}", audio_path.display());
        return Ok(audio_path);
    }

    info!(
        "Extracting audio from {} to {}",
        video_path.display(),
        audio_path.display()
    );
    let command = EncoderCommandBuilder::new(binary_path).extract_audio(video_path, &audio_path);
    let output = runner.run(&command, EXTRACT_TIME_LIMIT).await?;
    if !output.success() {
        return Err(PackError::Media(format!(
            "Audio extraction failed: {}",
            output.stderr.trim()
        )));
    }

    Ok(audio_path)
}

pub(crate) fn file_stem(path: &Path) -> Result<&str> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| PackError::Input(format!("Invalid file name: {}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::runner::{MockCommandRunner, ProcessOutput};

    #[tokio::test]
    async fn test_cached_audio_skips_extraction() {
        let scratch = tempfile::tempdir().unwrap();
        let audio_dir = scratch.path().join("extracted_audio");
        std::fs::create_dir_all(&audio_dir).unwrap();
        std::fs::write(audio_dir.join("clip_audio.wav"), b"riff").unwrap();

        let runner = MockCommandRunner::new();
        let path = extract_audio_cached(&runner, "ffmpeg", Path::new("/videos/clip.mp4"), scratch.path())
            .await
            .unwrap();
        assert_eq!(path, audio_dir.join("clip_audio.wav"));
    }

    #[tokio::test]
    async fn test_extraction_failure_is_media_error() {
        let scratch = tempfile::tempdir().unwrap();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|_, _| {
            Ok(ProcessOutput {
                exit_code: Some(1),
                stdout: String::new(),
                stderr: "no audio stream".to_string(),
            })
        });

        let err = extract_audio_cached(&runner, "ffmpeg", Path::new("/videos/clip.mp4"), scratch.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PackError::Media(_)));
        assert!(err.to_string().contains("no audio stream"));
    }
}
