use std::sync::Arc;

use tracing::{error, info, warn};

use common::{round_to, Direction, Notifier, Signal, SignalStore};

/// Delivers emitted signals: one alert per signal, one log row per signal.
///
/// Delivery failures are reported and swallowed. By the time a signal gets
/// here its cooldown is already committed and is not rolled back.
pub struct Dispatcher {
    notifier: Arc<dyn Notifier>,
    store: Arc<dyn SignalStore>,
}

impl Dispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, store: Arc<dyn SignalStore>) -> Self {
        Self { notifier, store }
    }

    pub async fn dispatch(&self, signal: &Signal) {
        info!(
            symbol = %signal.symbol,
            direction = %signal.direction,
            tag = %signal.tag,
            pct = round_to(signal.pct_change * 100.0, 2),
            volume = round_to(signal.volume_ratio, 2),
            rsi = round_to(signal.rsi, 2),
            confidence = round_to(signal.confidence, 2),
            "Signal emitted"
        );

        if let Err(e) = self.notifier.notify(&format_alert(signal)).await {
            warn!(symbol = %signal.symbol, error = %e, "Alert delivery failed");
        }

        if let Err(e) = self.store.append(signal).await {
            error!(symbol = %signal.symbol, error = %e, "Failed to record signal");
            self.report(&format!("⚠️ Failed to record signal for {}: {e}", signal.symbol))
                .await;
        }
    }

    /// Best-effort operational message (startup, failures, shutdown).
    pub async fn report(&self, message: &str) {
        if let Err(e) = self.notifier.notify(message).await {
            warn!(error = %e, "Status notification failed");
        }
    }
}

/// Alert text for one signal.
pub fn format_alert(signal: &Signal) -> String {
    let (header, advice) = match signal.direction {
        Direction::Buy => ("🚀 Bullish signal", "✅ Consider a long entry (manual review)"),
        Direction::Sell => ("🔻 Bearish signal", "⚠️ Consider a short entry (manual review)"),
    };

    format!(
        "{header}\n\
         Symbol: {symbol}\n\
         Pattern: {label}\n\
         📊 Change: {pct}%\n\
         🔥 Volume: x{volume} (vs prior avg)\n\
         🧠 RSI: {rsi}\n\
         💰 Funding: {funding}%\n\
         🎯 Confidence: {confidence}%\n\
         👉 {advice}",
        symbol = signal.symbol,
        label = signal.tag.label(),
        pct = round_to(signal.pct_change * 100.0, 2),
        volume = round_to(signal.volume_ratio, 2),
        rsi = round_to(signal.rsi, 2),
        funding = round_to(signal.funding_rate * 100.0, 4),
        confidence = (signal.confidence * 100.0).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use common::{BearishTag, BullishTag, SignalTag};

    fn signal(tag: SignalTag, pct: f64) -> Signal {
        Signal::new(
            "BTCUSDT",
            tag,
            pct,
            2.2312,
            65.4321,
            0.000123,
            0.7,
            101.4,
            Utc.with_ymd_and_hms(2024, 3, 1, 15, 30, 0).unwrap(),
        )
    }

    #[test]
    fn bullish_alert_carries_all_fields() {
        let text = format_alert(&signal(SignalTag::Bullish(BullishTag::HighBreakout), 0.0146));
        assert!(text.starts_with("🚀 Bullish signal"));
        assert!(text.contains("Symbol: BTCUSDT"));
        assert!(text.contains(BullishTag::HighBreakout.label()));
        assert!(text.contains("Change: 1.46%"));
        assert!(text.contains("Volume: x2.23"));
        assert!(text.contains("RSI: 65.43"));
        assert!(text.contains("Funding: 0.0123%"));
        assert!(text.contains("Confidence: 70%"));
        assert!(text.contains("long entry"));
    }

    #[test]
    fn bearish_alert_suggests_short() {
        let text = format_alert(&signal(SignalTag::Bearish(BearishTag::SupportBreakdown), -0.012));
        assert!(text.starts_with("🔻 Bearish signal"));
        assert!(text.contains("Change: -1.2%"));
        assert!(text.contains("short entry"));
    }
}
