//! Hard score: a bounded 0–100 score derived from time allocation and
//! keyboard pacing.
//!
//! ```text
//! productivity  = (coding + researching) / total * 50
//! balance       = 50 | 35 | 40 | 20      by coding share of productive time
//! idle penalty  = -10 when idle > 20% of total
//! inactivity    = +5 | -3 | -10 | 0      by inactive share of total
//! final         = clamp(sum, 0, 100), truncated
//! ```
//!
//! Pure and deterministic: the same accumulator always yields the same score.

use serde::Serialize;

use crate::accumulator::ActivityAccumulator;

const PRODUCTIVITY_WEIGHT: f64 = 50.0;
const IDLE_PENALTY_RATIO: f64 = 0.2;
const IDLE_PENALTY: f64 = -10.0;

/// Each stage of the hard-score computation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub total_secs: f64,
    pub productivity_ratio: f64,
    pub productivity_score: f64,
    pub coding_ratio: f64,
    pub balance_score: f64,
    pub idle_penalty: f64,
    pub inactivity_adjustment: f64,
    pub final_score: u32,
}

impl ScoreBreakdown {
    fn empty() -> Self {
        Self {
            total_secs: 0.0,
            productivity_ratio: 0.0,
            productivity_score: 0.0,
            coding_ratio: 0.0,
            balance_score: 0.0,
            idle_penalty: 0.0,
            inactivity_adjustment: 0.0,
            final_score: 0,
        }
    }
}

pub fn hard_score(acc: &ActivityAccumulator) -> u32 {
    score_breakdown(acc).final_score
}

pub fn score_breakdown(acc: &ActivityAccumulator) -> ScoreBreakdown {
    let durations = &acc.durations;
    let total = durations.total();
    if total <= 0.0 {
        return ScoreBreakdown::empty();
    }

    let productive = durations.productive();
    let productivity_ratio = productive / total;
    let productivity_score = productivity_ratio * PRODUCTIVITY_WEIGHT;

    let coding_ratio = if productive > 0.0 {
        durations.coding / productive
    } else {
        0.0
    };
    let balance_score = balance_score(coding_ratio);

    let idle_penalty = if durations.idle / total > IDLE_PENALTY_RATIO {
        IDLE_PENALTY
    } else {
        0.0
    };

    let inactivity_adjustment = inactivity_adjustment(acc.total_inactive_secs, total);

    let raw = productivity_score + balance_score + idle_penalty + inactivity_adjustment;
    let final_score = raw.clamp(0.0, 100.0) as u32;

    ScoreBreakdown {
        total_secs: total,
        productivity_ratio,
        productivity_score,
        coding_ratio,
        balance_score,
        idle_penalty,
        inactivity_adjustment,
        final_score,
    }
}

/// Ideal mix is 60–80% coding; ranges are inclusive at their lower bound.
fn balance_score(coding_ratio: f64) -> f64 {
    if (0.6..=0.8).contains(&coding_ratio) {
        50.0
    } else if (0.4..0.6).contains(&coding_ratio) {
        35.0
    } else if coding_ratio > 0.8 && coding_ratio <= 1.0 {
        40.0
    } else {
        20.0
    }
}

fn inactivity_adjustment(total_inactive_secs: f64, total_secs: f64) -> f64 {
    if total_inactive_secs <= 0.0 || total_secs <= 0.0 {
        return 0.0;
    }

    let inactive_ratio = total_inactive_secs / total_secs;
    if (0.2..=0.4).contains(&inactive_ratio) {
        5.0
    } else if inactive_ratio < 0.1 {
        -3.0
    } else if inactive_ratio > 0.6 {
        -10.0
    } else {
        0.0
    }
}

/// Combines the time-based score with an external code-quality score.
///
/// A code score of 0 means "not assessed" and leaves the time score as is.
pub fn blend_code_score(time_score: u32, code_score: Option<u32>) -> u32 {
    match code_score {
        Some(code) if code > 0 => (time_score + code.min(100)) / 2,
        _ => time_score,
    }
}
