/// RSI (Relative Strength Index) over a trailing window.
///
/// Uses Wilder's simplified form: the average gain and average loss are plain
/// means of the positive and negative single-period changes across the last
/// `period` changes. No smoothing is carried from earlier data.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    /// Relative strength used when the window has no losses.
    pub const NO_LOSS_RS: f64 = 100.0;

    pub fn new(period: usize) -> Self {
        Self { period }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    /// Only the trailing `period + 1` values are used.
    /// Returns `None` if there are fewer than `period + 1` values or the
    /// period is below 2.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if self.period < 2 || closes.len() < self.period + 1 {
            return None;
        }

        let window = &closes[closes.len() - (self.period + 1)..];
        let (gains, losses) = window
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0, 0.0), |(g, l), change: f64| {
                if change > 0.0 {
                    (g + change, l)
                } else {
                    (g, l - change)
                }
            });

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        let rs = if avg_loss > 0.0 {
            avg_gain / avg_loss
        } else {
            Self::NO_LOSS_RS
        };
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(14)
    }
}
