#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};

use common::{Candle, Error, MarketData, Notifier, Result, Signal, SignalRecord, SignalStore};

pub const CANDIDATE_INTERVAL: &str = "1m";
pub const DETECTION_INTERVAL: &str = "5m";

// ─── Candle builders ──────────────────────────────────────────────────────────

fn candle(i: usize, open: f64, close: f64, volume: f64) -> Candle {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Candle {
        open_time: start + Duration::minutes(i as i64),
        open,
        high: open.max(close),
        low: open.min(close),
        close,
        volume,
    }
}

/// 10 one-minute candles whose last volume is 5x the leading baseline.
pub fn spiking_minutes() -> Vec<Candle> {
    (0..10)
        .map(|i| candle(i, 100.0, 100.0, if i == 9 { 5.0 } else { 1.0 }))
        .collect()
}

/// 10 one-minute candles with flat volume.
pub fn flat_minutes() -> Vec<Candle> {
    (0..10).map(|i| candle(i, 100.0, 100.0, 1.0)).collect()
}

/// 20 five-minute candles ending in a green +1.4% bar on 2.5x volume:
/// a high breakout.
pub fn breakout_window() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..19).map(|i| candle(i * 5, 100.0, 100.0, 10.0)).collect();
    candles.push(candle(95, 100.1, 101.4, 25.0));
    candles
}

/// 20 flat five-minute candles: passes no gate.
pub fn quiet_window() -> Vec<Candle> {
    (0..20).map(|i| candle(i * 5, 100.0, 100.0, 10.0)).collect()
}

// ─── MarketData ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockMarket {
    pub universe: Option<Vec<String>>,
    candles: HashMap<(String, String), Vec<Candle>>,
    failing: HashSet<(String, String)>,
    pub funding: Option<f64>,
    pub detection_fetches: AtomicUsize,
    pub universe_calls: AtomicUsize,
}

impl MockMarket {
    pub fn new(universe: &[&str]) -> Self {
        Self {
            universe: Some(universe.iter().map(|s| s.to_string()).collect()),
            funding: Some(0.0001),
            ..Self::default()
        }
    }

    pub fn failing_universe() -> Self {
        Self::default()
    }

    pub fn with_candles(mut self, symbol: &str, interval: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert((symbol.to_string(), interval.to_string()), candles);
        self
    }

    pub fn with_failure(mut self, symbol: &str, interval: &str) -> Self {
        self.failing.insert((symbol.to_string(), interval.to_string()));
        self
    }

    pub fn without_funding(mut self) -> Self {
        self.funding = None;
        self
    }

    pub fn detection_fetches(&self) -> usize {
        self.detection_fetches.load(Ordering::SeqCst)
    }

    pub fn universe_calls(&self) -> usize {
        self.universe_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketData for MockMarket {
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        if interval == DETECTION_INTERVAL {
            self.detection_fetches.fetch_add(1, Ordering::SeqCst);
        }
        let key = (symbol.to_string(), interval.to_string());
        if self.failing.contains(&key) {
            return Err(Error::Timeout(format!("{symbol} {interval}")));
        }
        let candles = self.candles.get(&key).cloned().unwrap_or_default();
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.into_iter().skip(skip).collect())
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<f64> {
        self.funding
            .ok_or_else(|| Error::Exchange(format!("no funding for {symbol}")))
    }

    async fn list_tradable_symbols(&self) -> Result<Vec<String>> {
        self.universe_calls.fetch_add(1, Ordering::SeqCst);
        self.universe
            .clone()
            .ok_or_else(|| Error::Http("exchangeInfo unreachable".into()))
    }
}

// ─── Notifier ─────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        if self.fail {
            return Err(Error::Notify("chat unreachable".into()));
        }
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

// ─── SignalStore ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryStore {
    signals: Mutex<Vec<Signal>>,
    pub fail: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalStore for MemoryStore {
    async fn append(&self, signal: &Signal) -> Result<()> {
        if self.fail {
            return Err(Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
        }
        self.signals.lock().unwrap().push(signal.clone());
        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<SignalRecord>> {
        let offset = chrono::FixedOffset::east_opt(0).unwrap();
        Ok(self
            .signals
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .map(|s| SignalRecord::from_signal(s, offset))
            .collect())
    }
}
