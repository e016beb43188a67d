use common::Candle;

/// Fractional change from `prev_close` to `close`. Zero when `prev_close` is zero.
pub fn pct_change(prev_close: f64, close: f64) -> f64 {
    if prev_close == 0.0 {
        return 0.0;
    }
    (close - prev_close) / prev_close
}

/// Latest candle's volume divided by the mean volume of the `lookback`
/// candles immediately before it.
///
/// Returns `None` with fewer than `lookback + 1` candles, and `Some(0.0)` when
/// the prior mean is zero.
pub fn volume_ratio(candles: &[Candle], lookback: usize) -> Option<f64> {
    if lookback == 0 || candles.len() < lookback + 1 {
        return None;
    }
    let last = candles.len() - 1;
    let prior = &candles[last - lookback..last];
    let mean = prior.iter().map(|c| c.volume).sum::<f64>() / lookback as f64;
    if mean > 0.0 {
        Some(candles[last].volume / mean)
    } else {
        Some(0.0)
    }
}

/// Volume spike test used to pick scan candidates.
///
/// The baseline is the mean of the first `baseline` volumes of the sample
/// (not the ones immediately preceding the latest); the latest volume must
/// exceed `multiplier` times that mean.
pub fn is_volume_spike(volumes: &[f64], baseline: usize, multiplier: f64) -> bool {
    if baseline == 0 || volumes.len() <= baseline {
        return false;
    }
    let avg = volumes[..baseline].iter().sum::<f64>() / baseline as f64;
    match volumes.last() {
        Some(&recent) => recent > avg * multiplier,
        None => false,
    }
}
