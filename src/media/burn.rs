use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tracing::{debug, error, info};

use crate::config::MediaConfig;
use crate::error::{PackError, Result};
use crate::subtitle::fonts;
use crate::subtitle::merge;
use crate::subtitle::script::{self, ScriptLayout};
use crate::subtitle::{srt, CueTrack};
use super::commands::{escape_filter_path, fallback_subtitles_filter, EncoderCommandBuilder};
use super::extract::file_stem;
use super::probe::FrameProber;
use super::runner::CommandRunner;

/// Fixed bottom margin keeping the secondary track off the primary row in
/// the fallback chain, which knows nothing about stacking.
const FALLBACK_SECONDARY_MARGIN: u32 = 80;

const SCRIPT_BURN_DESC: &str = "Script-based subtitle burn";
const FALLBACK_BURN_DESC: &str = "Fallback subtitle burn";

/// One burn operation: source video, both cue tracks, chosen layout.
#[derive(Debug, Clone)]
pub struct BurnRequest {
    pub video_path: PathBuf,
    pub primary: CueTrack,
    pub secondary: CueTrack,
    pub layout: ScriptLayout,
}

/// Drives the external encoder through the rendering pipeline: one
/// script-based attempt, then at most one fallback attempt with plain
/// per-track filters.
///
/// Spawn failures (missing binary) and timeouts abort immediately without
/// touching the fallback; only a non-zero exit from the script attempt
/// reaches it.
pub struct BurnOrchestrator<'a> {
    runner: &'a dyn CommandRunner,
    media: &'a MediaConfig,
    scratch_dir: &'a Path,
    media_dir: &'a Path,
}

impl<'a> BurnOrchestrator<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        media: &'a MediaConfig,
        scratch_dir: &'a Path,
        media_dir: &'a Path,
    ) -> Self {
        Self {
            runner,
            media,
            scratch_dir,
            media_dir,
        }
    }

    /// Burn the request's cue tracks into its video. Returns the output
    /// path, or the untouched source path when there is nothing to burn.
    pub async fn burn(&self, request: &BurnRequest) -> Result<PathBuf> {
        if !request.video_path.exists() {
            return Err(PackError::FileNotFound(
                request.video_path.display().to_string(),
            ));
        }
        if request.primary.is_empty() && request.secondary.is_empty() {
            info!("No cues to burn; returning source video untouched");
            return Ok(request.video_path.clone());
        }

        let stem = file_stem(&request.video_path)?;
        let prober = FrameProber::new(&self.media.probe_binary_path);
        let (width, height) = prober.probe(self.runner, &request.video_path).await;

        let outcome = merge::merge(&request.primary, &request.secondary);
        let script_text = script::generate(&outcome, &request.layout, width, height);

        let script_dir = self.scratch_dir.join("ass_scripts");
        fs::create_dir_all(&script_dir).await?;
        let script_path = script_dir.join(format!("{stem}.ass"));
        fs::write(&script_path, script_text).await?;
        debug!("Wrote subtitle script: {}", script_path.display());

        let output_dir = self.scratch_dir.join("burned_videos");
        fs::create_dir_all(&output_dir).await?;
        let output_path = output_dir.join(format!("{stem}_burned.mp4"));

        let time_limit = Duration::from_secs(self.media.encode_timeout_secs);
        let builder = EncoderCommandBuilder::new(&self.media.binary_path);

        info!(
            "Burning subtitles into {} ({} primary / {} secondary cue(s))",
            request.video_path.display(),
            request.primary.len(),
            request.secondary.len()
        );
        let command = builder.burn(
            &request.video_path,
            &self.script_filter(&script_path),
            &output_path,
            &self.media.encode_preset,
            self.media.encode_crf,
            SCRIPT_BURN_DESC,
        );
        let attempt = self.runner.run(&command, time_limit).await?;
        if attempt.success() {
            info!("Burn completed: {}", output_path.display());
            return Ok(output_path);
        }

        error!(
            "Script-based burn exited with {:?}: {}",
            attempt.exit_code,
            stderr_tail(&attempt.stderr)
        );
        info!("Retrying with fallback per-track filters");

        let filtergraph = self.write_fallback_inputs(stem, request).await?;
        let command = builder.burn(
            &request.video_path,
            &filtergraph,
            &output_path,
            &self.media.encode_preset,
            self.media.encode_crf,
            FALLBACK_BURN_DESC,
        );
        let fallback = self.runner.run(&command, time_limit).await?;
        if fallback.success() {
            info!("Fallback burn completed: {}", output_path.display());
            return Ok(output_path);
        }

        Err(PackError::Render(format!(
            "Fallback rendering exited with {:?}: {}",
            fallback.exit_code,
            stderr_tail(&fallback.stderr)
        )))
    }

    fn script_filter(&self, script_path: &Path) -> String {
        let mut filter = format!("ass='{}'", escape_filter_path(script_path));
        if let Some(dir) = fonts::resolve_fonts_dir(self.media_dir) {
            filter.push_str(&format!(":fontsdir='{}'", escape_filter_path(&dir)));
        }
        filter
    }

    /// Write each non-empty track as a plain SRT file and chain one
    /// `subtitles=` filter per track. Cue pairing and stacking are lost
    /// here; overlap is the accepted degradation of this path.
    async fn write_fallback_inputs(&self, stem: &str, request: &BurnRequest) -> Result<String> {
        let srt_dir = self.scratch_dir.join("fallback_srt");
        fs::create_dir_all(&srt_dir).await?;

        let mut filters = Vec::new();
        if !request.primary.is_empty() {
            let path = srt_dir.join(format!("{stem}_primary.srt"));
            fs::write(&path, srt::to_srt(&request.primary)).await?;
            filters.push(fallback_subtitles_filter(&path, &request.layout.primary, None));
        }
        if !request.secondary.is_empty() {
            let path = srt_dir.join(format!("{stem}_secondary.srt"));
            fs::write(&path, srt::to_srt(&request.secondary)).await?;
            filters.push(fallback_subtitles_filter(
                &path,
                &request.layout.secondary,
                Some(FALLBACK_SECONDARY_MARGIN),
            ));
        }

        Ok(filters.join(","))
    }
}

fn stderr_tail(stderr: &str) -> String {
    let tail: Vec<&str> = stderr.lines().rev().take(8).collect();
    tail.into_iter().rev().collect::<Vec<_>>().join("\n")
}
