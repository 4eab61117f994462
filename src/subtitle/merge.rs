use std::collections::HashMap;

use tracing::debug;

use super::{Cue, CueTrack};

/// Time-range key rounded to millisecond precision. Rounding guards against
/// floating-point drift between pipeline stages without matching unrelated
/// cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TimeKey(i64, i64);

impl TimeKey {
    fn of(cue: &Cue) -> Self {
        Self(
            (cue.start * 1000.0).round() as i64,
            (cue.end * 1000.0).round() as i64,
        )
    }
}

/// Result of aligning a secondary track against a primary track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// One entry per primary cue, in primary order, with the secondary cue
    /// it consumed (if any)
    pub pairs: Vec<(Cue, Option<Cue>)>,
    /// Secondary cues no primary cue consumed, in original order
    pub unmatched_secondary: Vec<Cue>,
}

/// Align `secondary` cues to `primary` cues.
///
/// Each primary cue tries an index match first, then a rounded time-key
/// match on its own start/end. A secondary cue is consumed by the first
/// primary cue that matches it and never reused. Ties on a key resolve to
/// the earliest unconsumed secondary cue in insertion order.
pub fn merge(primary: &CueTrack, secondary: &CueTrack) -> MergeOutcome {
    let mut by_index: HashMap<u32, Vec<usize>> = HashMap::new();
    let mut by_time: HashMap<TimeKey, Vec<usize>> = HashMap::new();
    for (pos, cue) in secondary.cues.iter().enumerate() {
        if let Some(index) = cue.index {
            by_index.entry(index).or_default().push(pos);
        }
        by_time.entry(TimeKey::of(cue)).or_default().push(pos);
    }

    let mut consumed = vec![false; secondary.len()];
    let mut pairs = Vec::with_capacity(primary.len());

    for cue in &primary.cues {
        let index_hit = match cue.index {
            Some(index) => take_first(by_index.get(&index), &mut consumed),
            None => None,
        };
        let hit = match index_hit {
            Some(pos) => Some(pos),
            None => take_first(by_time.get(&TimeKey::of(cue)), &mut consumed),
        };

        pairs.push((cue.clone(), hit.map(|pos| secondary.cues[pos].clone())));
    }

    let unmatched_secondary: Vec<Cue> = secondary
        .cues
        .iter()
        .zip(consumed.iter())
        .filter(|&(_, &used)| !used)
        .map(|(cue, _)| cue.clone())
        .collect();

    if !unmatched_secondary.is_empty() {
        debug!(
            "{} secondary cue(s) had no matching primary cue",
            unmatched_secondary.len()
        );
    }

    MergeOutcome {
        pairs,
        unmatched_secondary,
    }
}

/// Take the earliest registered candidate that has not been consumed yet.
fn take_first(candidates: Option<&Vec<usize>>, consumed: &mut [bool]) -> Option<usize> {
    for &pos in candidates.into_iter().flatten() {
        if !consumed[pos] {
            consumed[pos] = true;
            return Some(pos);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(index: Option<u32>, start: f64, end: f64, text: &str) -> Cue {
        Cue::new(index, start, end, text)
    }

    #[test]
    fn test_empty_secondary_leaves_primary_unpaired_in_order() {
        let primary = CueTrack::new(vec![
            cue(Some(1), 0.0, 1.0, "a"),
            cue(Some(2), 1.0, 2.0, "b"),
            cue(None, 2.0, 3.0, "c"),
        ]);

        let outcome = merge(&primary, &CueTrack::default());
        assert_eq!(outcome.pairs.len(), 3);
        assert!(outcome.pairs.iter().all(|(_, sec)| sec.is_none()));
        let texts: Vec<&str> = outcome.pairs.iter().map(|(p, _)| p.text.as_str()).collect();
        assert_eq!(texts, ["a", "b", "c"]);
        assert!(outcome.unmatched_secondary.is_empty());
    }

    #[test]
    fn test_index_match() {
        let primary = CueTrack::new(vec![cue(Some(7), 1.0, 2.0, "hello")]);
        // Different timing, same index: index lookup must still pair them.
        let secondary = CueTrack::new(vec![cue(Some(7), 5.0, 6.0, "hallo")]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()), Some("hallo"));
        assert!(outcome.unmatched_secondary.is_empty());
    }

    #[test]
    fn test_time_key_fallback_when_index_absent() {
        let primary = CueTrack::new(vec![cue(None, 1.0, 2.5, "hello")]);
        let secondary = CueTrack::new(vec![cue(Some(3), 1.0, 2.5, "hallo")]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()), Some("hallo"));
    }

    #[test]
    fn test_time_key_tolerates_sub_millisecond_drift() {
        let primary = CueTrack::new(vec![cue(None, 1.0, 2.0, "hello")]);
        let near = CueTrack::new(vec![cue(None, 1.0004, 2.0, "near")]);
        let far = CueTrack::new(vec![cue(None, 1.002, 2.0, "far")]);

        assert!(merge(&primary, &near).pairs[0].1.is_some());
        assert!(merge(&primary, &far).pairs[0].1.is_none());
    }

    #[test]
    fn test_secondary_consumed_at_most_once() {
        let primary = CueTrack::new(vec![
            cue(Some(1), 0.0, 1.0, "first"),
            cue(Some(1), 0.0, 1.0, "duplicate"),
        ]);
        let secondary = CueTrack::new(vec![cue(Some(1), 0.0, 1.0, "only")]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()), Some("only"));
        assert!(outcome.pairs[1].1.is_none());
        assert!(outcome.unmatched_secondary.is_empty());
    }

    #[test]
    fn test_index_consumption_removes_time_key_candidate() {
        // One secondary cue reachable both by index and by time-key: once
        // consumed via index it must not pair again via time.
        let primary = CueTrack::new(vec![
            cue(Some(1), 0.0, 1.0, "by index"),
            cue(None, 0.0, 1.0, "by time"),
        ]);
        let secondary = CueTrack::new(vec![cue(Some(1), 0.0, 1.0, "single")]);

        let outcome = merge(&primary, &secondary);
        assert!(outcome.pairs[0].1.is_some());
        assert!(outcome.pairs[1].1.is_none());
    }

    #[test]
    fn test_identical_time_keys_pair_in_insertion_order() {
        let primary = CueTrack::new(vec![
            cue(None, 0.0, 1.0, "p1"),
            cue(None, 0.0, 1.0, "p2"),
        ]);
        let secondary = CueTrack::new(vec![
            cue(None, 0.0, 1.0, "s1"),
            cue(None, 0.0, 1.0, "s2"),
        ]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()), Some("s1"));
        assert_eq!(outcome.pairs[1].1.as_ref().map(|c| c.text.as_str()), Some("s2"));
    }

    #[test]
    fn test_leftover_secondary_emitted_in_order() {
        let primary = CueTrack::new(vec![cue(Some(2), 1.0, 2.0, "hello")]);
        let secondary = CueTrack::new(vec![
            cue(Some(9), 8.0, 9.0, "extra one"),
            cue(Some(2), 1.0, 2.0, "match"),
            cue(None, 30.0, 31.0, "extra two"),
        ]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()), Some("match"));
        let leftovers: Vec<&str> = outcome
            .unmatched_secondary
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(leftovers, ["extra one", "extra two"]);
    }

    #[test]
    fn test_index_preferred_over_time_key() {
        let primary = CueTrack::new(vec![cue(Some(1), 0.0, 1.0, "hello")]);
        let secondary = CueTrack::new(vec![
            // Same time range but different index
            cue(Some(5), 0.0, 1.0, "time twin"),
            // Matching index with different timing
            cue(Some(1), 4.0, 5.0, "index twin"),
        ]);

        let outcome = merge(&primary, &secondary);
        assert_eq!(
            outcome.pairs[0].1.as_ref().map(|c| c.text.as_str()),
            Some("index twin")
        );
        assert_eq!(outcome.unmatched_secondary[0].text, "time twin");
    }
}
