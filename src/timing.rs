// Total time fought, from the bout's round format and where it ended.
use std::collections::HashMap;

/// A format whose first round is longer than the overtime rounds that follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentedFormat {
    pub first_round: i64,
    pub overtime_round: i64,
}

/// Round-length tables keyed by round-format label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundFormats {
    /// Every round lasts the same number of seconds.
    pub uniform: HashMap<String, i64>,
    pub segmented: HashMap<String, SegmentedFormat>,
}

impl Default for RoundFormats {
    fn default() -> Self {
        // "No Time Limit" counts each round as one second and "1 Rnd (20)" as
        // twenty seconds; downstream datasets were built with these values.
        let uniform = [
            ("3 Rnd (5-5-5)", 5 * 60),
            ("5 Rnd (5-5-5-5-5)", 5 * 60),
            ("1 Rnd + OT (12-3)", 12 * 60),
            ("No Time Limit", 1),
            ("3 Rnd + OT (5-5-5-5)", 5 * 60),
            ("1 Rnd (20)", 20),
            ("2 Rnd (5-5)", 5 * 60),
            ("1 Rnd (15)", 15 * 60),
            ("1 Rnd (10)", 10 * 60),
            ("1 Rnd (12)", 12 * 60),
            ("1 Rnd + OT (30-5)", 30 * 60),
            ("1 Rnd (18)", 18 * 60),
            ("1 Rnd + OT (15-3)", 15 * 60),
            ("1 Rnd (30)", 30 * 60),
            ("1 Rnd + OT (31-5)", 31 * 60),
            ("1 Rnd + OT (27-3)", 27 * 60),
            ("1 Rnd + OT (30-3)", 30 * 60),
        ]
        .into_iter()
        .map(|(label, secs)| (label.to_string(), secs))
        .collect();

        let segmented = [
            ("1 Rnd + 2OT (15-3-3)", 15 * 60, 3 * 60),
            ("1 Rnd + 2OT (24-3-3)", 24 * 60, 3 * 60),
        ]
        .into_iter()
        .map(|(label, first_round, overtime_round)| {
            (label.to_string(), SegmentedFormat { first_round, overtime_round })
        })
        .collect();

        Self { uniform, segmented }
    }
}

/// Computes elapsed fight time from injected round tables.
#[derive(Debug, Clone, Default)]
pub struct TimeArithmetic {
    formats: RoundFormats,
}

impl TimeArithmetic {
    pub fn new(formats: RoundFormats) -> Self {
        Self { formats }
    }

    /// Seconds fought. Unknown formats and missing inputs give 0.
    pub fn total_fight_seconds(
        &self,
        format: Option<&str>,
        last_round: Option<i64>,
        last_round_seconds: Option<i64>,
    ) -> i64 {
        let (Some(format), Some(last_round), Some(last_round_seconds)) =
            (format, last_round, last_round_seconds)
        else {
            return 0;
        };

        let total = if let Some(per_round) = self.formats.uniform.get(format) {
            last_round
                .checked_sub(1)
                .and_then(|r| r.checked_mul(*per_round))
                .and_then(|t| t.checked_add(last_round_seconds))
        } else {
            match self.formats.segmented.get(format) {
                Some(seg) if last_round >= 3 => (last_round - 2)
                    .checked_mul(seg.overtime_round)
                    .and_then(|t| t.checked_add(seg.first_round))
                    .and_then(|t| t.checked_add(last_round_seconds)),
                Some(seg) => last_round
                    .checked_sub(1)
                    .and_then(|r| r.checked_mul(seg.first_round))
                    .and_then(|t| t.checked_add(last_round_seconds)),
                None => Some(0),
            }
        };
        total.unwrap_or_else(|| {
            log::debug!("{format}: round {last_round} overflows the fight clock, using 0");
            0
        })
    }
}
