use std::time::Duration;

use chrono::FixedOffset;

/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // Exchange
    pub binance_futures_url: String,
    pub http_timeout: Duration,

    // Telegram
    pub telegram_token: String,
    pub telegram_chat_id: i64,
    /// Operators allowed to use bot commands. Empty disables the command bot.
    pub telegram_allowed_user_ids: Vec<i64>,

    // Dashboard API. An empty token disables the API.
    pub dashboard_token: String,
    pub dashboard_port: u16,

    // Database
    pub database_url: String,

    /// Offset used to render timestamps in the signal log.
    pub report_offset: FixedOffset,

    /// Optional TOML file overriding scan windows and pacing.
    pub scan_config_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        let telegram_chat_id = required_env("TELEGRAM_CHAT_ID")
            .trim()
            .parse::<i64>()
            .unwrap_or_else(|_| panic!("TELEGRAM_CHAT_ID must be a numeric chat ID"));

        let telegram_allowed_user_ids = optional_env("TELEGRAM_ALLOWED_USER_IDS")
            .map(|raw| parse_id_list(&raw))
            .unwrap_or_default();

        let offset_hours: i32 = optional_env("REPORT_UTC_OFFSET_HOURS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(9);
        let report_offset = FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| {
            panic!("REPORT_UTC_OFFSET_HOURS out of range: {offset_hours}")
        });

        Config {
            binance_futures_url: optional_env("BINANCE_FUTURES_URL")
                .unwrap_or_else(|| "https://fapi.binance.com".to_string()),
            http_timeout: Duration::from_secs(
                optional_env("HTTP_TIMEOUT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
            ),
            telegram_token: required_env("TELEGRAM_TOKEN"),
            telegram_chat_id,
            telegram_allowed_user_ids,
            dashboard_token: optional_env("DASHBOARD_TOKEN").unwrap_or_default(),
            dashboard_port: optional_env("DASHBOARD_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            database_url: required_env("DATABASE_URL"),
            report_offset,
            scan_config_path: optional_env("SCAN_CONFIG_PATH"),
        }
    }
}

fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>().unwrap_or_else(|_| {
                panic!("TELEGRAM_ALLOWED_USER_IDS contains non-numeric ID: '{s}'")
            })
        })
        .collect()
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
