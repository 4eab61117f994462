// Encoder subprocess layer and media library
//
// This module wraps every interaction with the external encoder binaries:
// - runner: subprocess execution behind a trait (spawn, capture, timeout)
// - commands: argument builders for encode and probe invocations
// - probe: frame dimension probing with safe defaults
// - extract: cached audio extraction feeding the transcriber
// - burn: subtitle burn orchestration (script attempt plus fallback)
//
// The free functions below implement the media library: listing and
// removing files the loader node can pick from.

pub mod burn;
pub mod commands;
pub mod extract;
pub mod probe;
pub mod runner;

pub use burn::{BurnOrchestrator, BurnRequest};
pub use commands::{EncoderCommand, EncoderCommandBuilder};
pub use extract::extract_audio_cached;
pub use probe::FrameProber;
pub use runner::{CommandRunner, ProcessOutput, RunnerFactory, SystemRunner};

use std::path::Path;

use serde::Serialize;
use tokio::fs;
use walkdir::WalkDir;

use crate::error::{PackError, Result};

/// Video container extensions the media library accepts.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Audio extensions the media library accepts.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "flac", "m4a", "aac", "ogg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Classify a path by its extension, case-insensitively. Returns `None`
/// for anything the pack cannot process.
pub fn classify(path: &Path) -> Option<MediaKind> {
    let extension = path.extension()?.to_str()?.to_lowercase();
    if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Video)
    } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        Some(MediaKind::Audio)
    } else {
        None
    }
}

/// One entry in the media library listing.
#[derive(Debug, Clone, Serialize)]
pub struct MediaFile {
    pub name: String,
    pub size: u64,
    pub extension: String,
    pub kind: MediaKind,
}

/// List processable files at the top level of the media directory,
/// sorted by name. Unknown extensions and subdirectories are skipped.
pub fn list_media_files(media_dir: &Path) -> Result<Vec<MediaFile>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(media_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if let Some(kind) = classify(path) {
            let metadata = std::fs::metadata(path)?;
            files.push(MediaFile {
                name: entry.file_name().to_string_lossy().to_string(),
                size: metadata.len(),
                extension: path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or_default()
                    .to_lowercase(),
                kind,
            });
        }
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

/// Delete one file from the media directory by bare name. Names carrying
/// path separators or parent components are rejected before touching the
/// filesystem.
pub async fn remove_media_file(media_dir: &Path, name: &str) -> Result<()> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(PackError::Input(format!("Invalid file name: {name}")));
    }

    let path = media_dir.join(name);
    if !path.exists() {
        return Err(PackError::FileNotFound(name.to_string()));
    }

    fs::remove_file(&path).await?;
    Ok(())
}
