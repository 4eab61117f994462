use super::layout::{self, LayoutSpec, ResolvedLayout, ResolvedPlacement, StyleBucket};
use super::merge::MergeOutcome;
use super::Cue;

/// Karaoke fill color, unused but required by the style row.
const SECONDARY_COLOUR: &str = "&H000000FF&";
/// Translucent backing used when the renderer draws boxed text.
const BACK_COLOUR: &str = "&H80000000&";

/// Style parameters and resolved placements for one burn operation.
#[derive(Debug, Clone)]
pub struct ScriptLayout {
    pub font_name: String,
    pub primary: LayoutSpec,
    pub secondary: LayoutSpec,
    pub resolved: ResolvedLayout,
}

impl ScriptLayout {
    pub fn new(font_name: impl Into<String>, primary: LayoutSpec, secondary: LayoutSpec) -> Self {
        let resolved = layout::resolve(&primary, &secondary);
        Self {
            font_name: font_name.into(),
            primary,
            secondary,
            resolved,
        }
    }

    fn spec(&self, bucket: StyleBucket) -> &LayoutSpec {
        match bucket {
            StyleBucket::Primary => &self.primary,
            StyleBucket::Secondary => &self.secondary,
        }
    }
}

/// Generate the complete ASS script for the merged cues.
///
/// The canvas dimensions must be the source video's pixel dimensions;
/// absolute pixel margins only line up at that resolution.
pub fn generate(outcome: &MergeOutcome, layout: &ScriptLayout, frame_width: u32, frame_height: u32) -> String {
    let mut script = String::new();

    script.push_str(&format!(
        "[Script Info]\n\
         Title: Burned subtitles\n\
         ScriptType: v4.00+\n\
         PlayResX: {frame_width}\n\
         PlayResY: {frame_height}\n\
         ScaledBorderAndShadow: yes\n\n"
    ));

    script.push_str("[V4+ Styles]\n");
    script.push_str(
        "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
    );
    script.push_str(&style_row(StyleBucket::Primary, &layout.primary, &layout.resolved.primary, &layout.font_name));
    script.push_str(&style_row(StyleBucket::Secondary, &layout.secondary, &layout.resolved.secondary, &layout.font_name));

    script.push_str("\n[Events]\n");
    script.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");

    for (primary_cue, secondary_cue) in &outcome.pairs {
        match secondary_cue {
            Some(secondary_cue) => {
                script.push_str(&combined_event(primary_cue, secondary_cue, layout))
            }
            None => script.push_str(&plain_event(primary_cue, StyleBucket::Primary, 0)),
        }
    }
    for cue in &outcome.unmatched_secondary {
        script.push_str(&plain_event(cue, StyleBucket::Secondary, 1));
    }

    script
}

fn style_row(bucket: StyleBucket, spec: &LayoutSpec, placement: &ResolvedPlacement, font_name: &str) -> String {
    format!(
        "Style: {},{},{},{},{},{},{},0,0,0,0,100,100,0,0,1,{},1,{},{},{},{},1\n",
        bucket.style_name(),
        font_name,
        spec.font_size,
        spec.fill.ass_color(),
        SECONDARY_COLOUR,
        spec.outline.ass_color(),
        BACK_COLOUR,
        spec.outline_width,
        placement.alignment.code(),
        placement.margin_l,
        placement.margin_r,
        placement.margin_v,
    )
}

/// One event for a matched pair: both texts joined by a forced line break,
/// each half carrying its own inline style tags. The event anchors at the
/// lower bucket's style; the upper track's half comes first because the
/// renderer draws the first line on top.
fn combined_event(primary_cue: &Cue, secondary_cue: &Cue, layout: &ScriptLayout) -> String {
    let lower = layout.resolved.lower_bucket();
    let (top_cue, top_bucket, bottom_cue, bottom_bucket) = match lower {
        StyleBucket::Primary => (secondary_cue, StyleBucket::Secondary, primary_cue, StyleBucket::Primary),
        StyleBucket::Secondary => (primary_cue, StyleBucket::Primary, secondary_cue, StyleBucket::Secondary),
    };

    let text = format!(
        "{}{}\\N{}{}",
        override_tags(layout.spec(top_bucket)),
        escape_text(&top_cue.text),
        override_tags(layout.spec(bottom_bucket)),
        escape_text(&bottom_cue.text),
    );

    dialogue_line(primary_cue.start, primary_cue.end, lower, 0, &text)
}

fn plain_event(cue: &Cue, bucket: StyleBucket, layer: u32) -> String {
    dialogue_line(cue.start, cue.end, bucket, layer, &escape_text(&cue.text))
}

fn dialogue_line(start: f64, end: f64, bucket: StyleBucket, layer: u32, text: &str) -> String {
    format!(
        "Dialogue: {},{},{},{},,0,0,0,,{}\n",
        layer,
        format_ass_time(start),
        format_ass_time(end),
        bucket.style_name(),
        text,
    )
}

fn override_tags(spec: &LayoutSpec) -> String {
    format!(
        "{{\\fs{}\\c{}\\3c{}\\bord{}}}",
        spec.font_size,
        spec.fill.ass_color(),
        spec.outline.ass_color(),
        spec.outline_width,
    )
}

fn escape_text(text: &str) -> String {
    text.replace('\n', "\\N")
}

/// Format time in seconds to ASS event time (H:MM:SS.CC, hours unpadded).
/// Floor-division decomposition: fractions truncate, never round.
pub fn format_ass_time(seconds: f64) -> String {
    let hours = (seconds / 3600.0) as u64;
    let minutes = ((seconds % 3600.0) / 60.0) as u64;
    let secs = (seconds % 60.0) as u64;
    let centis = ((seconds % 1.0) * 100.0) as u64;

    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitle::{merge, srt, CueTrack};

    fn default_layout() -> ScriptLayout {
        ScriptLayout::new(
            "Arial",
            LayoutSpec::primary_default(),
            LayoutSpec::secondary_default(),
        )
    }

    fn dialogue_lines(script: &str) -> Vec<&str> {
        script.lines().filter(|l| l.starts_with("Dialogue:")).collect()
    }

    #[test]
    fn test_format_ass_time() {
        assert_eq!(format_ass_time(0.0), "0:00:00.00");
        assert_eq!(format_ass_time(1.0), "0:00:01.00");
        assert_eq!(format_ass_time(2.5), "0:00:02.50");
        assert_eq!(format_ass_time(3661.5), "1:01:01.50");
        assert_eq!(format_ass_time(59.999), "0:00:59.99");
    }

    #[test]
    fn test_single_primary_cue_script() {
        let track = srt::parse("1\n00:00:01,000 --> 00:00:02,500\nHello\n");
        let outcome = merge::merge(&track, &CueTrack::default());
        let script = generate(&outcome, &default_layout(), 1920, 1080);

        assert!(script.contains("PlayResX: 1920"));
        assert!(script.contains("PlayResY: 1080"));
        assert!(script.contains("ScriptType: v4.00+"));
        assert!(script.contains("Style: Primary,Arial,24,&H00FFFFFF&,"));
        assert!(script.contains("Style: Secondary,Arial,20,&H0000FFFF&,"));

        let events = dialogue_lines(&script);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], "Dialogue: 0,0:00:01.00,0:00:02.50,Primary,,0,0,0,,Hello");
    }

    #[test]
    fn test_matched_pair_emits_one_combined_event() {
        let primary = srt::parse("1\n00:00:01,000 --> 00:00:02,500\nHi\n");
        let secondary = srt::parse("1\n00:00:01,000 --> 00:00:02,500\n你好\n");
        let outcome = merge::merge(&primary, &secondary);
        let script = generate(&outcome, &default_layout(), 1920, 1080);

        let events = dialogue_lines(&script);
        assert_eq!(events.len(), 1);
        let event = events[0];
        assert!(event.contains("Hi"));
        assert!(event.contains("你好"));
        // Secondary stacks above by default, so its half comes first and the
        // event anchors at the primary bucket.
        assert!(event.contains(",Primary,"));
        let secondary_at = event.find("你好").unwrap();
        let primary_at = event.find("Hi").unwrap();
        assert!(secondary_at < primary_at);
        assert!(event.contains("\\N"));
        assert!(event.contains("{\\fs20\\c&H0000FFFF&\\3c&H00000000&\\bord2}"));
        assert!(event.contains("{\\fs24\\c&H00FFFFFF&\\3c&H00000000&\\bord2}"));
    }

    #[test]
    fn test_inverted_margins_flip_event_order_and_bucket() {
        let mut secondary_spec = LayoutSpec::secondary_default();
        secondary_spec.vertical = crate::subtitle::layout::VerticalMargin::Pixels(10);
        let layout = ScriptLayout::new("Arial", LayoutSpec::primary_default(), secondary_spec);

        let primary = srt::parse("1\n00:00:01,000 --> 00:00:02,000\nHi\n");
        let secondary = srt::parse("1\n00:00:01,000 --> 00:00:02,000\nHallo\n");
        let outcome = merge::merge(&primary, &secondary);
        let script = generate(&outcome, &layout, 1280, 720);

        let events = dialogue_lines(&script);
        assert_eq!(events.len(), 1);
        assert!(events[0].contains(",Secondary,"));
        let primary_at = events[0].find("Hi").unwrap();
        let secondary_at = events[0].find("Hallo").unwrap();
        assert!(primary_at < secondary_at);
    }

    #[test]
    fn test_unpaired_secondary_events_follow_primary_events() {
        let primary = srt::parse("1\n00:00:01,000 --> 00:00:02,000\nonly primary\n");
        let secondary = srt::parse("9\n00:00:50,000 --> 00:00:51,000\nonly secondary\n");
        let outcome = merge::merge(&primary, &secondary);
        let script = generate(&outcome, &default_layout(), 1920, 1080);

        let events = dialogue_lines(&script);
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("Dialogue: 0,") && events[0].contains(",Primary,"));
        assert!(events[1].starts_with("Dialogue: 1,") && events[1].contains(",Secondary,"));
    }

    #[test]
    fn test_internal_line_breaks_become_forced_breaks() {
        let track = srt::parse("1\n00:00:01,000 --> 00:00:02,000\nline one\nline two\n");
        let outcome = merge::merge(&track, &CueTrack::default());
        let script = generate(&outcome, &default_layout(), 1920, 1080);

        assert!(script.contains("line one\\Nline two"));
    }

    #[test]
    fn test_style_rows_carry_resolved_margins() {
        let script = generate(
            &merge::merge(&CueTrack::default(), &CueTrack::default()),
            &default_layout(),
            1920,
            1080,
        );

        // Alignment 2 (bottom-center), margins 10/10, vertical 50 and 84.
        assert!(script.contains(",2,10,10,50,1\n"));
        assert!(script.contains(",2,10,10,84,1\n"));
    }
}
