//! Confidence scoring.
//!
//! Three independent tiers (move magnitude, volume surge, RSI extremity) are
//! summed and capped at 1.0. The cut points are fixed policy.

/// Maximum attainable confidence.
pub const MAX_CONFIDENCE: f64 = 1.0;

/// Contribution of the absolute percent change.
pub fn magnitude_tier(pct_change: f64) -> f64 {
    let magnitude = pct_change.abs();
    if magnitude > 0.02 {
        0.4
    } else if magnitude > 0.015 {
        0.3
    } else if magnitude > 0.01 {
        0.2
    } else {
        0.1
    }
}

/// Contribution of the volume ratio.
pub fn volume_tier(volume_ratio: f64) -> f64 {
    if volume_ratio > 3.0 {
        0.4
    } else if volume_ratio > 2.0 {
        0.3
    } else if volume_ratio > 1.5 {
        0.2
    } else {
        0.1
    }
}

/// Contribution of how far RSI sits from the midline.
pub fn extremity_tier(rsi: f64) -> f64 {
    if rsi > 70.0 || rsi < 30.0 {
        0.3
    } else if rsi > 60.0 || rsi < 40.0 {
        0.2
    } else {
        0.1
    }
}

/// Confidence in [0.3, 1.0] for a classified move.
pub fn score(pct_change: f64, volume_ratio: f64, rsi: f64) -> f64 {
    let total = magnitude_tier(pct_change) + volume_tier(volume_ratio) + extremity_tier(rsi);
    total.min(MAX_CONFIDENCE)
}
