//! Rule-ladder pattern classification.
//!
//! Each ladder is an ordered table of `(tag, predicate)` rules evaluated
//! first-match-wins; when nothing matches the ladder answers `WatchOnly`.
//! Which ladder runs at all is decided by [`direction_gate`].
//! All thresholds are fixed policy constants.

use common::{BearishTag, BullishTag, Direction, SignalTag};

use crate::indicators::IndicatorSnapshot;

/// One entry of a rule ladder.
#[derive(Clone, Copy)]
pub struct Rule<T> {
    pub tag: T,
    pub matches: fn(&IndicatorSnapshot) -> bool,
}

impl<T: std::fmt::Debug> std::fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("tag", &self.tag).finish()
    }
}

pub const BULLISH_RULES: &[Rule<BullishTag>] = &[
    Rule { tag: BullishTag::BreakoutFailure, matches: breakout_failure },
    Rule { tag: BullishTag::HighBreakout, matches: high_breakout },
    Rule { tag: BullishTag::AcceleratingRally, matches: accelerating_rally },
    Rule { tag: BullishTag::PullbackBounce, matches: pullback_bounce },
    Rule { tag: BullishTag::TechnicalBounce, matches: technical_bounce },
];

pub const BEARISH_RULES: &[Rule<BearishTag>] = &[
    Rule { tag: BearishTag::OverboughtReversal, matches: overbought_reversal },
    Rule { tag: BearishTag::BreakdownFailure, matches: breakdown_failure },
    Rule { tag: BearishTag::SupportBreakdown, matches: support_breakdown },
    Rule { tag: BearishTag::AcceleratingSelloff, matches: accelerating_selloff },
    Rule { tag: BearishTag::TechnicalPullback, matches: technical_pullback },
];

// ─── Direction gate ───────────────────────────────────────────────────────────

/// Minimum move and volume ratio before the bullish ladder is consulted.
pub const BULLISH_GATE_PCT: f64 = 0.006;
pub const BULLISH_GATE_VOLUME: f64 = 1.4;
/// The bearish gate needs a deeper move but accepts a lighter volume surge.
pub const BEARISH_GATE_PCT: f64 = -0.007;
pub const BEARISH_GATE_VOLUME: f64 = 1.3;

/// Decide which ladder, if any, a snapshot qualifies for.
pub fn direction_gate(s: &IndicatorSnapshot) -> Option<Direction> {
    if s.pct_change > BULLISH_GATE_PCT && s.volume_ratio > BULLISH_GATE_VOLUME {
        Some(Direction::Buy)
    } else if s.pct_change < BEARISH_GATE_PCT && s.volume_ratio > BEARISH_GATE_VOLUME {
        Some(Direction::Sell)
    } else {
        None
    }
}

/// Gate then classify. `None` means the snapshot is not signal-worthy.
pub fn classify(s: &IndicatorSnapshot) -> Option<SignalTag> {
    match direction_gate(s)? {
        Direction::Buy => Some(SignalTag::Bullish(classify_bullish(s))),
        Direction::Sell => Some(SignalTag::Bearish(classify_bearish(s))),
    }
}

pub fn classify_bullish(s: &IndicatorSnapshot) -> BullishTag {
    first_match(BULLISH_RULES, s).unwrap_or(BullishTag::WatchOnly)
}

pub fn classify_bearish(s: &IndicatorSnapshot) -> BearishTag {
    first_match(BEARISH_RULES, s).unwrap_or(BearishTag::WatchOnly)
}

fn first_match<T: Copy>(rules: &[Rule<T>], s: &IndicatorSnapshot) -> Option<T> {
    rules.iter().find(|rule| (rule.matches)(s)).map(|rule| rule.tag)
}

// ─── Bullish predicates ───────────────────────────────────────────────────────

/// Up move that closed below its own open: buyers already fading.
fn breakout_failure(s: &IndicatorSnapshot) -> bool {
    s.pct_change > 0.006 && s.last_close < s.last_open && s.rsi > 60.0
}

fn high_breakout(s: &IndicatorSnapshot) -> bool {
    s.pct_change > 0.013 && s.volume_ratio > 2.1 && s.rsi > 60.0
}

fn accelerating_rally(s: &IndicatorSnapshot) -> bool {
    s.last_close > s.prev_close && s.volume_ratio > 1.7 && s.pct_change > 0.007 && s.rsi > 55.0
}

fn pullback_bounce(s: &IndicatorSnapshot) -> bool {
    s.pct_change > 0.006 && s.volume_ratio > 1.4 && s.rsi > 40.0 && s.rsi < 60.0
}

fn technical_bounce(s: &IndicatorSnapshot) -> bool {
    s.rsi < 30.0 && s.pct_change > 0.0 && s.volume_ratio > 1.2
}

// ─── Bearish predicates ───────────────────────────────────────────────────────

fn overbought_reversal(s: &IndicatorSnapshot) -> bool {
    s.rsi > 75.0 && s.pct_change < -0.002 && s.volume_ratio > 1.1
}

/// Down move that closed above its own open: sellers already fading.
fn breakdown_failure(s: &IndicatorSnapshot) -> bool {
    s.pct_change < -0.006 && s.last_close > s.last_open && s.rsi < 45.0
}

fn support_breakdown(s: &IndicatorSnapshot) -> bool {
    s.pct_change < -0.016 && s.volume_ratio > 2.0 && s.rsi < 45.0
}

fn accelerating_selloff(s: &IndicatorSnapshot) -> bool {
    s.last_close < s.prev_close && s.volume_ratio > 1.6 && s.pct_change < -0.009
}

fn technical_pullback(s: &IndicatorSnapshot) -> bool {
    s.pct_change < -0.006 && s.rsi > 50.0 && s.volume_ratio > 1.3
}
