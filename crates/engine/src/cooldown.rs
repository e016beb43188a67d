use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

/// Per-symbol alert suppression.
///
/// A symbol is READY until it alerts, then COOLING until `cooldown` has
/// elapsed since that alert. State lives in memory only and starts empty on
/// every launch.
pub struct CooldownGate {
    cooldown: Duration,
    last_alerted: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CooldownGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alerted: Mutex::new(HashMap::new()),
        }
    }

    /// True if `symbol` may alert at `now`.
    pub async fn is_ready(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        let last = self.last_alerted.lock().await;
        elapsed(last.get(symbol), now, self.cooldown)
    }

    /// Record an alert for `symbol` at `now` if it is still ready.
    ///
    /// Check and update happen under one lock, so of two concurrent callers
    /// for the same symbol only one gets `true`.
    pub async fn mark_alerted(&self, symbol: &str, now: DateTime<Utc>) -> bool {
        let mut last = self.last_alerted.lock().await;
        if !elapsed(last.get(symbol), now, self.cooldown) {
            return false;
        }
        last.insert(symbol.to_string(), now);
        true
    }

    /// Symbols still cooling at `now`, sorted.
    pub async fn cooling_symbols(&self, now: DateTime<Utc>) -> Vec<String> {
        let last = self.last_alerted.lock().await;
        let mut symbols: Vec<String> = last
            .iter()
            .filter(|(_, t)| !elapsed(Some(*t), now, self.cooldown))
            .map(|(s, _)| s.clone())
            .collect();
        symbols.sort();
        symbols
    }
}

/// A clock that went backwards counts as not elapsed.
fn elapsed(last: Option<&DateTime<Utc>>, now: DateTime<Utc>, cooldown: Duration) -> bool {
    match last {
        None => true,
        Some(t) => (now - *t).to_std().map_or(false, |d| d >= cooldown),
    }
}
