use std::sync::Arc;

use chrono::Utc;
use futures_util::{stream, StreamExt};
use tracing::{debug, info, warn};

use common::{Error, MarketData, Result, Signal};
use strategy::{IndicatorSnapshot, ScanConfig};

use crate::candidates::CandidateSelector;
use crate::cooldown::CooldownGate;
use crate::dispatch::Dispatcher;

/// What happened to one candidate during a cycle.
#[derive(Debug)]
pub enum SymbolOutcome {
    Emitted(Signal),
    /// Suppressed by the cooldown gate.
    Cooling,
    /// Evaluated, but no gate or rule matched.
    Quiet,
    /// Data could not be obtained; retried next cycle.
    Skipped(Error),
}

/// Tally of a finished cycle.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub universe: usize,
    pub candidates: usize,
    pub emitted: Vec<Signal>,
    pub cooling: usize,
    pub quiet: usize,
    pub skipped: usize,
}

impl ScanReport {
    fn record(&mut self, outcome: SymbolOutcome) {
        match outcome {
            SymbolOutcome::Emitted(signal) => self.emitted.push(signal),
            SymbolOutcome::Cooling => self.cooling += 1,
            SymbolOutcome::Quiet => self.quiet += 1,
            SymbolOutcome::Skipped(_) => self.skipped += 1,
        }
    }
}

/// One full pass over the market: universe, candidates, per-symbol
/// evaluation, delivery.
pub struct Scanner {
    market: Arc<dyn MarketData>,
    gate: Arc<CooldownGate>,
    dispatcher: Dispatcher,
    selector: CandidateSelector,
    cfg: ScanConfig,
}

impl Scanner {
    pub fn new(
        market: Arc<dyn MarketData>,
        gate: Arc<CooldownGate>,
        dispatcher: Dispatcher,
        cfg: ScanConfig,
    ) -> Self {
        let selector = CandidateSelector::new(market.clone(), cfg.candidates.clone(), cfg.concurrency);
        Self {
            market,
            gate,
            dispatcher,
            selector,
            cfg,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run one cycle. Only a failed universe listing fails the cycle; every
    /// per-symbol problem is contained to that symbol.
    pub async fn scan_cycle(&self) -> Result<ScanReport> {
        let universe = self
            .market
            .list_tradable_symbols()
            .await
            .map_err(|e| Error::Universe(e.to_string()))?;

        let candidates = self.selector.select(&universe).await;
        let mut report = ScanReport {
            universe: universe.len(),
            candidates: candidates.len(),
            ..ScanReport::default()
        };

        if candidates.is_empty() {
            info!(universe = report.universe, "No candidates this cycle");
            return Ok(report);
        }

        // Owned symbols keep the per-symbol futures `Send` for `tokio::spawn`.
        let outcomes: Vec<SymbolOutcome> = stream::iter(candidates.iter().cloned())
            .map(|symbol| async move { self.evaluate_symbol(&symbol).await })
            .buffer_unordered(self.cfg.concurrency.max(1))
            .collect()
            .await;

        for outcome in outcomes {
            report.record(outcome);
        }

        info!(
            universe = report.universe,
            candidates = report.candidates,
            emitted = report.emitted.len(),
            cooling = report.cooling,
            quiet = report.quiet,
            skipped = report.skipped,
            "Scan cycle complete"
        );
        Ok(report)
    }

    /// Evaluate one candidate end to end.
    ///
    /// The cooldown is committed before delivery. A failed alert or log write
    /// still counts as an alert for suppression purposes.
    pub async fn evaluate_symbol(&self, symbol: &str) -> SymbolOutcome {
        if !self.gate.is_ready(symbol, Utc::now()).await {
            debug!(symbol, "Cooling down; skipped");
            return SymbolOutcome::Cooling;
        }

        let det = &self.cfg.detection;
        let candles = match self.market.fetch_candles(symbol, &det.interval, det.limit).await {
            Ok(c) => c,
            Err(e) => {
                warn!(
                    symbol,
                    error = %e,
                    transient = e.is_transient(),
                    "Detection fetch failed; skipping symbol"
                );
                return SymbolOutcome::Skipped(e);
            }
        };

        let Some(snapshot) = IndicatorSnapshot::from_candles(&candles, det) else {
            debug!(symbol, got = candles.len(), need = det.limit, "Insufficient detection window");
            return SymbolOutcome::Skipped(Error::InsufficientData {
                symbol: symbol.to_string(),
                got: candles.len(),
                need: det.limit,
            });
        };

        let Some(detection) = strategy::detect(&snapshot) else {
            debug!(
                symbol,
                pct = snapshot.pct_change,
                volume = snapshot.volume_ratio,
                rsi = snapshot.rsi,
                "No signal"
            );
            return SymbolOutcome::Quiet;
        };

        let funding = match self.market.fetch_funding_rate(symbol).await {
            Ok(rate) => rate,
            Err(e) => {
                debug!(symbol, error = %e, "Funding rate unavailable; using 0");
                0.0
            }
        };

        let signal = detection.into_signal(symbol, funding, Utc::now());

        if !self.gate.mark_alerted(symbol, signal.timestamp).await {
            debug!(symbol, "Lost cooldown race; dropping duplicate");
            return SymbolOutcome::Cooling;
        }

        self.dispatcher.dispatch(&signal).await;
        SymbolOutcome::Emitted(signal)
    }
}
