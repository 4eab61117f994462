use std::path::Path;

use crate::subtitle::layout::LayoutSpec;

/// Abstract encoder command: binary plus ordered arguments. Execution goes
/// through a [`CommandRunner`](super::runner::CommandRunner) so rendering
/// paths stay testable without a real encoder.
#[derive(Debug, Clone)]
pub struct EncoderCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl EncoderCommand {
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Set video codec
    pub fn video_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:v").arg(codec)
    }

    /// Set audio codec
    pub fn audio_codec<S: Into<String>>(self, codec: S) -> Self {
        self.arg("-c:a").arg(codec)
    }

    /// Copy audio stream
    pub fn copy_audio(self) -> Self {
        self.audio_codec("copy")
    }

    /// Disable video
    pub fn no_video(self) -> Self {
        self.arg("-vn")
    }

    /// Set audio sample rate
    pub fn audio_sample_rate(self, rate: u32) -> Self {
        self.arg("-ar").arg(rate.to_string())
    }

    /// Set audio channels
    pub fn audio_channels(self, channels: u32) -> Self {
        self.arg("-ac").arg(channels.to_string())
    }

    /// Add video filter
    pub fn video_filter<S: Into<String>>(self, filter: S) -> Self {
        self.arg("-vf").arg(filter)
    }
}

/// Builder for the encoder operations this pack performs.
pub struct EncoderCommandBuilder {
    binary_path: String,
}

impl EncoderCommandBuilder {
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Burn a filtergraph into the video: copy audio, re-encode video with
    /// H.264 at the configured preset/quality.
    pub fn burn<P: AsRef<Path>>(
        &self,
        video_path: P,
        filtergraph: &str,
        output_path: P,
        preset: &str,
        crf: u32,
        description: &str,
    ) -> EncoderCommand {
        EncoderCommand::new(&self.binary_path, description)
            .overwrite()
            .input(&video_path)
            .video_filter(filtergraph)
            .copy_audio()
            .video_codec("libx264")
            .arg("-preset")
            .arg(preset)
            .arg("-crf")
            .arg(crf.to_string())
            .output(&output_path)
    }

    /// Extract a 16kHz mono PCM track for transcription.
    pub fn extract_audio<P: AsRef<Path>>(&self, video_path: P, audio_path: P) -> EncoderCommand {
        EncoderCommand::new(&self.binary_path, "Audio extraction")
            .input(video_path)
            .no_video()
            .audio_codec("pcm_s16le")
            .audio_sample_rate(16000)
            .audio_channels(1)
            .overwrite()
            .output(audio_path)
    }
}

/// Escape a path for use inside an encoder filtergraph: backslashes become
/// forward slashes and colons are escaped so drive letters survive.
pub fn escape_filter_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(':', "\\:")
}

/// `subtitles=` filter entry for the fallback chain: plain SRT input with
/// per-track size/color overrides, the secondary track raised by a fixed
/// margin so the two tracks do not anchor at the same row.
pub fn fallback_subtitles_filter(srt_path: &Path, spec: &LayoutSpec, raise: Option<u32>) -> String {
    let mut force_style = format!(
        "FontSize={},PrimaryColour={}",
        spec.font_size,
        spec.fill.force_style_color()
    );
    if let Some(margin) = raise {
        force_style.push_str(&format!(",MarginV={}", margin));
    }

    format!(
        "subtitles='{}':force_style='{}'",
        escape_filter_path(srt_path),
        force_style
    )
}
