use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::{Cue, CueTrack};

/// Timestamp line pattern, anchored at the line start. Trailing content
/// (position hints some tools append) is tolerated.
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2}),(\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2}),(\d{3})")
        .unwrap()
});

/// Parse SRT text into a cue track.
///
/// Malformed blocks (too few lines, bad timestamp, non-increasing range) are
/// skipped and logged; parsing always continues. Empty or fully-malformed
/// input yields an empty track.
pub fn parse(text: &str) -> CueTrack {
    let normalized = text.replace("\r\n", "\n");
    let mut cues = Vec::new();

    for block in normalized.split("\n\n") {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() < 3 {
            if !lines.is_empty() {
                warn!("Skipping subtitle block with {} line(s)", lines.len());
            }
            continue;
        }

        let Some(caps) = TIMESTAMP_REGEX.captures(lines[1]) else {
            warn!("Skipping subtitle block with bad timestamp line: {}", lines[1]);
            continue;
        };
        let start = captured_seconds(&caps, 1);
        let end = captured_seconds(&caps, 5);
        if end <= start {
            warn!(
                "Skipping subtitle block with non-increasing range: {} --> {}",
                start, end
            );
            continue;
        }

        // A non-numeric index line is kept as an absent index; the merger
        // falls back to time-key matching for such cues.
        let index = lines[0].parse::<u32>().ok();
        let text = lines[2..].join("\n");
        cues.push(Cue::new(index, start, end, text));
    }

    CueTrack::new(cues)
}

/// Serialize a cue track back to SRT text. Absent indices are normalized to
/// the 1-based position.
pub fn to_srt(track: &CueTrack) -> String {
    let mut content = String::new();

    for (position, cue) in track.cues.iter().enumerate() {
        let index = cue.index.unwrap_or(position as u32 + 1);
        content.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            index,
            format_srt_time(cue.start),
            format_srt_time(cue.end),
            cue.text.trim()
        ));
    }

    content
}

/// Format time in seconds to SRT time format (HH:MM:SS,mmm)
pub fn format_srt_time(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

fn captured_seconds(caps: &regex::Captures<'_>, first_group: usize) -> f64 {
    let part = |offset: usize| caps[first_group + offset].parse::<u64>().unwrap_or(0);
    let (hours, minutes, secs, millis) = (part(0), part(1), part(2), part(3));

    hours as f64 * 3600.0 + minutes as f64 * 60.0 + secs as f64 + millis as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let track = parse("1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:00:03,000 --> 00:00:04,000\nWorld\n");
        assert_eq!(track.len(), 2);
        assert_eq!(track.cues[0].index, Some(1));
        assert_eq!(track.cues[0].start, 1.0);
        assert_eq!(track.cues[0].end, 2.5);
        assert_eq!(track.cues[0].text, "Hello");
        assert_eq!(track.cues[1].text, "World");
    }

    #[test]
    fn test_parse_multi_line_text() {
        let track = parse("1\n00:00:01,000 --> 00:00:02,000\nfirst line\nsecond line\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues[0].text, "first line\nsecond line");
    }

    #[test]
    fn test_parse_crlf_input() {
        let track = parse("1\r\n00:00:01,000 --> 00:00:02,000\r\nHello\r\n\r\n2\r\n00:00:03,000 --> 00:00:04,000\r\nWorld\r\n");
        assert_eq!(track.len(), 2);
        assert_eq!(track.cues[1].start, 3.0);
    }

    #[test]
    fn test_parse_skips_malformed_blocks() {
        let text = "1\n00:00:01,000 --> 00:00:02,000\nGood\n\nnot a block\n\n3\nbad timestamp here\nText\n\n4\n00:00:05,000 --> 00:00:06,000\nAlso good\n";
        let track = parse(text);
        assert_eq!(track.len(), 2);
        assert_eq!(track.cues[0].text, "Good");
        assert_eq!(track.cues[1].text, "Also good");
    }

    #[test]
    fn test_parse_non_numeric_index_kept_without_index() {
        let track = parse("one\n00:00:01,000 --> 00:00:02,000\nHello\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues[0].index, None);
    }

    #[test]
    fn test_parse_skips_non_increasing_range() {
        let track = parse("1\n00:00:02,000 --> 00:00:02,000\nZero length\n\n2\n00:00:05,000 --> 00:00:04,000\nBackwards\n");
        assert!(track.is_empty());
    }

    #[test]
    fn test_parse_tolerates_trailing_position_hint() {
        let track = parse("1\n00:00:01,000 --> 00:00:02,000 X1:100 X2:200\nHello\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues[0].end, 2.0);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\n\n").is_empty());
    }

    #[test]
    fn test_round_trip_preserves_cues() {
        let original = "1\n00:00:01,000 --> 00:00:02,500\nHello\n\n2\n00:01:03,250 --> 00:01:04,750\nline one\nline two\n";
        let first = parse(original);
        let rebuilt = parse(&to_srt(&first));

        assert_eq!(first.len(), rebuilt.len());
        for (a, b) in first.cues.iter().zip(rebuilt.cues.iter()) {
            assert_eq!(a.text, b.text);
            assert_eq!(a.start, b.start);
            assert_eq!(a.end, b.end);
        }
    }

    #[test]
    fn test_to_srt_normalizes_missing_index() {
        let track = CueTrack::new(vec![
            Cue::new(None, 0.0, 1.0, "a"),
            Cue::new(None, 1.0, 2.0, "b"),
        ]);
        let srt = to_srt(&track);
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:01,000\na\n"));
        assert!(srt.contains("\n2\n00:00:01,000 --> 00:00:02,000\nb\n"));
    }

    #[test]
    fn test_format_srt_time() {
        assert_eq!(format_srt_time(0.0), "00:00:00,000");
        assert_eq!(format_srt_time(65.123), "00:01:05,123");
        assert_eq!(format_srt_time(3661.500), "01:01:01,500");
    }
}
