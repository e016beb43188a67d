use std::sync::Arc;

use futures_util::{stream, StreamExt};
use tracing::{debug, info};

use common::MarketData;
use strategy::indicators::is_volume_spike;
use strategy::CandidateConfig;

/// Cheap pre-filter: flags symbols whose latest short-interval volume spikes
/// over the leading baseline. Only flagged symbols get the full evaluation.
pub struct CandidateSelector {
    market: Arc<dyn MarketData>,
    cfg: CandidateConfig,
    concurrency: usize,
}

impl CandidateSelector {
    pub fn new(market: Arc<dyn MarketData>, cfg: CandidateConfig, concurrency: usize) -> Self {
        Self {
            market,
            cfg,
            concurrency: concurrency.max(1),
        }
    }

    /// Symbols from `universe` with a volume spike, sorted.
    ///
    /// A symbol whose fetch fails or returns a short window is left out; it
    /// never fails the whole selection.
    pub async fn select(&self, universe: &[String]) -> Vec<String> {
        let mut candidates: Vec<String> = stream::iter(universe.iter().cloned())
            .map(|symbol| async move { self.is_candidate(&symbol).await.then_some(symbol) })
            .buffer_unordered(self.concurrency)
            .filter_map(std::future::ready)
            .collect()
            .await;

        candidates.sort();
        info!(
            universe = universe.len(),
            candidates = candidates.len(),
            "Candidate selection complete"
        );
        candidates
    }

    async fn is_candidate(&self, symbol: &str) -> bool {
        let candles = match self
            .market
            .fetch_candles(symbol, &self.cfg.interval, self.cfg.limit)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                debug!(symbol, error = %e, "Candidate fetch failed; excluding");
                return false;
            }
        };

        if candles.len() < self.cfg.limit {
            debug!(symbol, got = candles.len(), need = self.cfg.limit, "Short candidate window");
            return false;
        }

        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();
        is_volume_spike(&volumes, self.cfg.baseline, self.cfg.spike_multiplier)
    }
}
