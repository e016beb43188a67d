use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scan windows and pacing (TOML).
///
/// Example `config/scan.toml`:
/// ```toml
/// scan_interval_secs = 60
/// cooldown_minutes = 5
/// concurrency = 8
///
/// [candidates]
/// interval = "1m"
/// limit = 10
/// baseline = 8
/// spike_multiplier = 1.8
///
/// [detection]
/// interval = "5m"
/// limit = 20
/// ```
/// Every field is optional; omitted fields keep their defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Time between the starts of two scan cycles.
    pub scan_interval_secs: u64,
    /// Minimum time between two alerts for the same symbol.
    pub cooldown_minutes: u64,
    /// Sleep after a failed cycle; doubles on consecutive failures.
    pub failure_backoff_secs: u64,
    pub max_backoff_secs: u64,
    /// Upper bound on concurrent per-symbol requests.
    pub concurrency: usize,
    pub candidates: CandidateConfig,
    pub detection: DetectionConfig,
}

/// Fast, short sample used to pre-filter the universe.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CandidateConfig {
    pub interval: String,
    /// Candles fetched per symbol; fewer returned excludes the symbol.
    pub limit: usize,
    /// Leading candles averaged into the volume baseline.
    pub baseline: usize,
    pub spike_multiplier: f64,
}

/// Slower, longer window the indicators are computed on.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub interval: String,
    /// Candles fetched per candidate; fewer returned skips the symbol.
    pub limit: usize,
    pub rsi_length: usize,
    /// Candles before the latest one averaged for the volume ratio.
    pub volume_lookback: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_interval_secs: 60,
            cooldown_minutes: 5,
            failure_backoff_secs: 60,
            max_backoff_secs: 600,
            concurrency: 8,
            candidates: CandidateConfig::default(),
            detection: DetectionConfig::default(),
        }
    }
}

impl Default for CandidateConfig {
    fn default() -> Self {
        Self {
            interval: "1m".to_string(),
            limit: 10,
            baseline: 8,
            spike_multiplier: 1.8,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            interval: "5m".to_string(),
            limit: 20,
            rsi_length: 14,
            volume_lookback: 3,
        }
    }
}

impl ScanConfig {
    /// Load from a TOML file. Exits process on error, including a config
    /// that parses but could never produce a signal.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read scan config at '{path}': {e}")
        });
        let cfg = Self::from_toml(&content).unwrap_or_else(|e| {
            panic!("Failed to parse scan config at '{path}': {e}")
        });
        cfg.validate()
            .unwrap_or_else(|e| panic!("Invalid scan config at '{path}': {e}"));
        cfg
    }

    /// Reject windows that are too short for the indicators they feed.
    pub fn validate(&self) -> Result<(), String> {
        let c = &self.candidates;
        let d = &self.detection;
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".into());
        }
        if c.baseline == 0 {
            return Err("candidates.baseline must be at least 1".into());
        }
        if c.limit <= c.baseline {
            return Err(format!(
                "candidates.limit ({}) must exceed candidates.baseline ({})",
                c.limit, c.baseline
            ));
        }
        if d.rsi_length < 2 {
            return Err(format!("detection.rsi_length ({}) must be at least 2", d.rsi_length));
        }
        if d.volume_lookback == 0 {
            return Err("detection.volume_lookback must be at least 1".into());
        }
        let need = d.rsi_length.max(d.volume_lookback) + 1;
        if d.limit < need {
            return Err(format!(
                "detection.limit ({}) must be at least {need} for rsi_length {} and volume_lookback {}",
                d.limit, d.rsi_length, d.volume_lookback
            ));
        }
        Ok(())
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval_secs.max(1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_minutes * 60)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.failure_backoff_secs)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs.max(self.failure_backoff_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let cfg = ScanConfig::from_toml("").unwrap();
        assert_eq!(cfg.scan_interval(), Duration::from_secs(60));
        assert_eq!(cfg.cooldown(), Duration::from_secs(300));
        assert_eq!(cfg.candidates.interval, "1m");
        assert_eq!(cfg.candidates.limit, 10);
        assert_eq!(cfg.detection.interval, "5m");
        assert_eq!(cfg.detection.limit, 20);
    }

    #[test]
    fn partial_tables_override_only_given_fields() {
        let cfg = ScanConfig::from_toml(
            r#"
            cooldown_minutes = 15

            [detection]
            limit = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.cooldown(), Duration::from_secs(900));
        assert_eq!(cfg.detection.limit, 30);
        assert_eq!(cfg.detection.rsi_length, 14);
        assert_eq!(cfg.concurrency, 8);
    }

    #[test]
    fn shipped_config_matches_defaults() {
        let cfg = ScanConfig::from_toml(include_str!("../../../config/scan.toml")).unwrap();
        let defaults = ScanConfig::default();
        assert_eq!(cfg.scan_interval(), defaults.scan_interval());
        assert_eq!(cfg.cooldown(), defaults.cooldown());
        assert_eq!(cfg.candidates.spike_multiplier, defaults.candidates.spike_multiplier);
        assert_eq!(cfg.detection.volume_lookback, defaults.detection.volume_lookback);
    }

    fn with_detection(f: impl FnOnce(&mut DetectionConfig)) -> ScanConfig {
        let mut cfg = ScanConfig::default();
        f(&mut cfg.detection);
        cfg
    }

    fn with_candidates(f: impl FnOnce(&mut CandidateConfig)) -> ScanConfig {
        let mut cfg = ScanConfig::default();
        f(&mut cfg.candidates);
        cfg
    }

    #[test]
    fn defaults_and_shipped_config_validate() {
        assert!(ScanConfig::default().validate().is_ok());
        let shipped = ScanConfig::from_toml(include_str!("../../../config/scan.toml")).unwrap();
        assert!(shipped.validate().is_ok());
    }

    #[test]
    fn rejects_rsi_length_below_two() {
        let err = with_detection(|d| d.rsi_length = 1).validate().unwrap_err();
        assert!(err.contains("rsi_length"), "{err}");
    }

    #[test]
    fn rejects_candidate_limit_not_above_baseline() {
        let err = with_candidates(|c| c.limit = 8).validate().unwrap_err();
        assert!(err.contains("candidates.limit"), "{err}");
    }

    #[test]
    fn rejects_empty_candidate_baseline() {
        let err = with_candidates(|c| c.baseline = 0).validate().unwrap_err();
        assert!(err.contains("baseline"), "{err}");
    }

    #[test]
    fn rejects_zero_volume_lookback() {
        let err = with_detection(|d| d.volume_lookback = 0).validate().unwrap_err();
        assert!(err.contains("volume_lookback"), "{err}");
    }

    #[test]
    fn rejects_detection_window_shorter_than_rsi() {
        let err = with_detection(|d| d.limit = 14).validate().unwrap_err();
        assert!(err.contains("detection.limit"), "{err}");
        assert!(with_detection(|d| d.limit = 15).validate().is_ok());
    }

    #[test]
    fn rejects_detection_window_shorter_than_volume_lookback() {
        let err = with_detection(|d| {
            d.rsi_length = 2;
            d.volume_lookback = 10;
            d.limit = 10;
        })
        .validate()
        .unwrap_err();
        assert!(err.contains("detection.limit"), "{err}");
    }

    #[test]
    fn rejects_zero_concurrency() {
        let cfg = ScanConfig {
            concurrency: 0,
            ..ScanConfig::default()
        };
        assert!(cfg.validate().unwrap_err().contains("concurrency"));
    }

    #[test]
    #[should_panic(expected = "Invalid scan config")]
    fn load_panics_on_invalid_config() {
        let path = std::env::temp_dir().join(format!("spikewatch-scan-{}.toml", std::process::id()));
        std::fs::write(&path, "[detection]\nrsi_length = 1\n").unwrap();
        ScanConfig::load(path.to_str().unwrap());
    }

    #[test]
    fn max_backoff_never_below_base() {
        let cfg = ScanConfig {
            failure_backoff_secs: 120,
            max_backoff_secs: 30,
            ..ScanConfig::default()
        };
        assert_eq!(cfg.max_backoff(), Duration::from_secs(120));
    }
}
