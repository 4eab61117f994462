//! Jimaku - Subtitle Pipeline Node Pack
//!
//! Node implementations for a graph-based media editor: load media, run
//! speech recognition, translate the cues through a local or cloud LLM,
//! and burn the result back into the video with ffmpeg.

pub mod config;
pub mod error;
pub mod media;
pub mod nodes;
pub mod subtitle;
pub mod transcribe;
pub mod translate;
pub mod workspace;

pub use config::PackConfig;
pub use error::{PackError, Result};
pub use workspace::Workspace;
