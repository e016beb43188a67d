pub mod classifier;
pub mod confidence;
pub mod config;
pub mod indicators;

pub use classifier::{classify, direction_gate};
pub use config::{CandidateConfig, DetectionConfig, ScanConfig};
pub use indicators::IndicatorSnapshot;

use chrono::{DateTime, Utc};
use common::{Signal, SignalTag};

/// A qualifying move: gated, classified and scored, not yet enriched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub snapshot: IndicatorSnapshot,
    pub tag: SignalTag,
    pub confidence: f64,
}

impl Detection {
    /// Freeze into an emitted signal. The funding rate is supplied here
    /// because it is only fetched for qualifying symbols.
    pub fn into_signal(self, symbol: &str, funding_rate: f64, now: DateTime<Utc>) -> Signal {
        Signal::new(
            symbol,
            self.tag,
            self.snapshot.pct_change,
            self.snapshot.volume_ratio,
            self.snapshot.rsi,
            funding_rate,
            self.confidence,
            self.snapshot.entry_price(),
            now,
        )
    }
}

/// Score and classify a snapshot that already passed a direction gate.
/// `None` when it passes neither gate; the rule ladders are not consulted then.
pub fn detect(snapshot: &IndicatorSnapshot) -> Option<Detection> {
    let tag = classify(snapshot)?;
    Some(Detection {
        snapshot: *snapshot,
        tag,
        confidence: confidence::score(snapshot.pct_change, snapshot.volume_ratio, snapshot.rsi),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::{BullishTag, Direction};

    #[test]
    fn detection_carries_snapshot_into_signal() {
        let snapshot = IndicatorSnapshot {
            rsi: 65.0,
            pct_change: 0.014,
            volume_ratio: 2.2,
            prev_close: 100.0,
            last_open: 100.2,
            last_close: 101.4,
        };
        let detection = detect(&snapshot).unwrap();
        assert_eq!(detection.tag, SignalTag::Bullish(BullishTag::HighBreakout));
        assert!((detection.confidence - 0.7).abs() < 1e-9);

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let signal = detection.into_signal("SOLUSDT", 0.0001, now);
        assert_eq!(signal.symbol, "SOLUSDT");
        assert_eq!(signal.direction, Direction::Buy);
        assert_eq!(signal.entry_price, 101.4);
        assert_eq!(signal.funding_rate, 0.0001);
        assert_eq!(signal.timestamp, now);
    }

    #[test]
    fn quiet_snapshot_is_not_detected() {
        let snapshot = IndicatorSnapshot {
            rsi: 50.0,
            pct_change: 0.003,
            volume_ratio: 1.1,
            prev_close: 100.0,
            last_open: 100.0,
            last_close: 100.3,
        };
        assert!(detect(&snapshot).is_none());
    }
}
