use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle as returned by the exchange, oldest first in any sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Side of an emitted alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Buy => write!(f, "BUY"),
            Direction::Sell => write!(f, "SELL"),
        }
    }
}

/// Patterns recognised by the bullish rule ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BullishTag {
    BreakoutFailure,
    HighBreakout,
    AcceleratingRally,
    PullbackBounce,
    TechnicalBounce,
    WatchOnly,
}

impl BullishTag {
    pub fn code(&self) -> &'static str {
        match self {
            BullishTag::BreakoutFailure => "breakout-failure",
            BullishTag::HighBreakout => "high-breakout",
            BullishTag::AcceleratingRally => "accelerating-rally",
            BullishTag::PullbackBounce => "pullback-bounce",
            BullishTag::TechnicalBounce => "technical-bounce",
            BullishTag::WatchOnly => "watch-only",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BullishTag::BreakoutFailure => "🚫 Breakout failure",
            BullishTag::HighBreakout => "📈 High breakout",
            BullishTag::AcceleratingRally => "📊 Accelerating rally",
            BullishTag::PullbackBounce => "🔂 Pullback bounce",
            BullishTag::TechnicalBounce => "🟡 Technical bounce",
            BullishTag::WatchOnly => "🔍 Watch only",
        }
    }
}

/// Patterns recognised by the bearish rule ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BearishTag {
    OverboughtReversal,
    BreakdownFailure,
    SupportBreakdown,
    AcceleratingSelloff,
    TechnicalPullback,
    WatchOnly,
}

impl BearishTag {
    pub fn code(&self) -> &'static str {
        match self {
            BearishTag::OverboughtReversal => "overbought-reversal",
            BearishTag::BreakdownFailure => "breakdown-failure",
            BearishTag::SupportBreakdown => "support-breakdown",
            BearishTag::AcceleratingSelloff => "accelerating-selloff",
            BearishTag::TechnicalPullback => "technical-pullback",
            BearishTag::WatchOnly => "watch-only",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BearishTag::OverboughtReversal => "🔻 Overbought reversal",
            BearishTag::BreakdownFailure => "🚫 Breakdown failure",
            BearishTag::SupportBreakdown => "📉 Support breakdown",
            BearishTag::AcceleratingSelloff => "💢 Accelerating selloff",
            BearishTag::TechnicalPullback => "🔃 Technical pullback",
            BearishTag::WatchOnly => "🔍 Watch only",
        }
    }
}

/// A classified pattern together with the ladder that produced it.
///
/// `code()` is the stable identifier written to the signal log; `label()` is
/// display text for alerts only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "direction", content = "tag", rename_all = "lowercase")]
pub enum SignalTag {
    Bullish(BullishTag),
    Bearish(BearishTag),
}

impl SignalTag {
    pub fn direction(&self) -> Direction {
        match self {
            SignalTag::Bullish(_) => Direction::Buy,
            SignalTag::Bearish(_) => Direction::Sell,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            SignalTag::Bullish(t) => t.code(),
            SignalTag::Bearish(t) => t.code(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalTag::Bullish(t) => t.label(),
            SignalTag::Bearish(t) => t.label(),
        }
    }
}

impl std::fmt::Display for SignalTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A fully classified and scored alert. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: String,
    pub symbol: String,
    pub direction: Direction,
    pub tag: SignalTag,
    /// Fractional change of the last close vs. the previous close (0.01 = 1%).
    pub pct_change: f64,
    pub volume_ratio: f64,
    pub rsi: f64,
    /// Fractional funding rate; 0 when the exchange could not be reached.
    pub funding_rate: f64,
    pub confidence: f64,
    pub entry_price: f64,
    pub timestamp: DateTime<Utc>,
}

impl Signal {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: impl Into<String>,
        tag: SignalTag,
        pct_change: f64,
        volume_ratio: f64,
        rsi: f64,
        funding_rate: f64,
        confidence: f64,
        entry_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: symbol.into(),
            direction: tag.direction(),
            tag,
            pct_change,
            volume_ratio,
            rsi,
            funding_rate,
            confidence,
            entry_price,
            timestamp,
        }
    }
}

/// Row of the append-only signal log, in the log's presentation units.
///
/// Column order is part of the log contract: symbol, timestamp, pct_change,
/// volume_ratio, rsi, funding, type, tag, confidence, entry_price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SignalRecord {
    pub id: String,
    pub symbol: String,
    pub timestamp: String,
    /// Percent, 2 dp.
    pub pct_change: f64,
    pub volume_ratio: f64,
    pub rsi: f64,
    /// Percent, 4 dp.
    pub funding: f64,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub signal_type: String,
    pub tag: String,
    /// Integer percentage.
    pub confidence: i64,
    pub entry_price: f64,
}

impl SignalRecord {
    /// Build the log row for `signal`, rendering the timestamp in `offset`.
    pub fn from_signal(signal: &Signal, offset: FixedOffset) -> Self {
        Self {
            id: signal.id.clone(),
            symbol: signal.symbol.clone(),
            timestamp: signal
                .timestamp
                .with_timezone(&offset)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            pct_change: round_to(signal.pct_change * 100.0, 2),
            volume_ratio: round_to(signal.volume_ratio, 2),
            rsi: round_to(signal.rsi, 2),
            funding: round_to(signal.funding_rate * 100.0, 4),
            signal_type: signal.direction.to_string(),
            tag: signal.tag.code().to_string(),
            confidence: (signal.confidence * 100.0).round() as i64,
            entry_price: signal.entry_price,
        }
    }
}

/// Round `value` to `dp` decimal places.
pub fn round_to(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// Current state of the scan engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Stopped => write!(f, "stopped"),
            EngineState::Running => write!(f, "running"),
            EngineState::Paused => write!(f, "paused"),
        }
    }
}

/// Commands sent to the engine via the command channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Pause,
    Resume,
}
