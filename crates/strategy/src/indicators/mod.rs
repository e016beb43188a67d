pub mod rsi;
pub mod volume;

pub use rsi::RsiIndicator;
pub use volume::{is_volume_spike, pct_change, volume_ratio};

use common::Candle;

use crate::config::DetectionConfig;

/// Indicators derived from one symbol's detection window at scan time.
///
/// Besides the three indicators it carries the candle fields the rule
/// ladders look at. Recomputed every scan, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub pct_change: f64,
    pub volume_ratio: f64,
    pub prev_close: f64,
    pub last_open: f64,
    pub last_close: f64,
}

impl IndicatorSnapshot {
    /// Build a snapshot from candles ordered oldest first.
    ///
    /// Returns `None` when fewer than `cfg.limit` candles are available, or
    /// when the window is too short for the RSI or volume lookback.
    pub fn from_candles(candles: &[Candle], cfg: &DetectionConfig) -> Option<Self> {
        if candles.len() < cfg.limit.max(2) {
            return None;
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let rsi = RsiIndicator::new(cfg.rsi_length).compute(&closes)?;
        let volume_ratio = volume_ratio(candles, cfg.volume_lookback)?;

        let last = candles[candles.len() - 1];
        let prev = candles[candles.len() - 2];

        Some(Self {
            rsi,
            pct_change: pct_change(prev.close, last.close),
            volume_ratio,
            prev_close: prev.close,
            last_open: last.open,
            last_close: last.close,
        })
    }

    /// Entry price reported with a signal: the latest close.
    pub fn entry_price(&self) -> f64 {
        self.last_close
    }
}
