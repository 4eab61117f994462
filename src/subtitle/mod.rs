// Subtitle layout and burn-in engine
//
// Pipeline, in dependency order:
// - srt: raw SRT text -> ordered cue tracks
// - merge: primary + optional secondary track -> combined render pairs
// - layout: user-facing style parameters -> concrete margins/alignment
// - script: merged cues + resolved layout -> ASS script for the encoder
// - fonts: candidate chain for the fonts directory handed to the filter
//
// The burn orchestrator living in crate::media drives these stages and owns
// the encoder subprocess handling.

pub mod fonts;
pub mod layout;
pub mod merge;
pub mod script;
pub mod srt;

/// One timed subtitle entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    /// Sequence number from the source block, when it parsed as an integer
    pub index: Option<u32>,
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds, strictly greater than start
    pub end: f64,
    /// Cue text, may contain internal line breaks
    pub text: String,
}

impl Cue {
    pub fn new(index: Option<u32>, start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
        }
    }
}

/// Ordered sequence of cues from one language/source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueTrack {
    pub cues: Vec<Cue>,
}

impl CueTrack {
    pub fn new(cues: Vec<Cue>) -> Self {
        Self { cues }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }
}
