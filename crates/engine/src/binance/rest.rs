use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use common::{Candle, Error, MarketData, Result};

pub const DEFAULT_BASE_URL: &str = "https://fapi.binance.com";

/// Public REST client for Binance USDT-M futures market data.
///
/// Only unauthenticated endpoints are used. Every request is bounded by the
/// client-wide timeout so a stalled call degrades to a skipped symbol.
pub struct BinanceFuturesClient {
    base_url: String,
    http: Client,
}

impl BinanceFuturesClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn public_get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{path}", self.base_url);

        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(http_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(http_error)?;

        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }
}

fn http_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Timeout(e.to_string())
    } else {
        Error::Http(e.to_string())
    }
}

#[async_trait]
impl MarketData for BinanceFuturesClient {
    async fn fetch_candles(&self, symbol: &str, interval: &str, limit: usize) -> Result<Vec<Candle>> {
        debug!(symbol, interval, limit, "Fetching klines");
        let body = self
            .public_get(
                "/fapi/v1/klines",
                &[
                    ("symbol", symbol.to_string()),
                    ("interval", interval.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        parse_klines(&body)
    }

    async fn fetch_funding_rate(&self, symbol: &str) -> Result<f64> {
        let body = self
            .public_get("/fapi/v1/premiumIndex", &[("symbol", symbol.to_string())])
            .await?;
        parse_funding_rate(&body)
    }

    async fn list_tradable_symbols(&self) -> Result<Vec<String>> {
        let body = self.public_get("/fapi/v1/exchangeInfo", &[]).await?;
        parse_exchange_info(&body)
    }
}

// ─── Response parsing ─────────────────────────────────────────────────────────

/// Parse the kline array format:
/// `[openTime, "open", "high", "low", "close", "volume", closeTime, ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>> {
    let rows: Vec<Vec<serde_json::Value>> = serde_json::from_str(body)?;
    rows.iter().map(|row| parse_kline_row(row)).collect()
}

fn parse_kline_row(row: &[serde_json::Value]) -> Result<Candle> {
    if row.len() < 6 {
        return Err(Error::Exchange(format!("kline row too short: {} fields", row.len())));
    }
    let open_time_ms = row[0]
        .as_i64()
        .ok_or_else(|| Error::Exchange("kline open time is not an integer".into()))?;
    let open_time = Utc
        .timestamp_millis_opt(open_time_ms)
        .single()
        .ok_or_else(|| Error::Exchange(format!("kline open time out of range: {open_time_ms}")))?;

    Ok(Candle {
        open_time,
        open: decimal_field(&row[1], "open")?,
        high: decimal_field(&row[2], "high")?,
        low: decimal_field(&row[3], "low")?,
        close: decimal_field(&row[4], "close")?,
        volume: decimal_field(&row[5], "volume")?,
    })
}

/// Binance encodes prices and quantities as decimal strings.
fn decimal_field(value: &serde_json::Value, name: &str) -> Result<f64> {
    match value {
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| Error::Exchange(format!("kline {name} '{s}': {e}"))),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::Exchange(format!("kline {name} not representable"))),
        other => Err(Error::Exchange(format!("kline {name} has unexpected type: {other}"))),
    }
}

pub fn parse_funding_rate(body: &str) -> Result<f64> {
    let index: PremiumIndex = serde_json::from_str(body)?;
    index
        .last_funding_rate
        .parse::<f64>()
        .map_err(|e| Error::Exchange(format!("lastFundingRate '{}': {e}", index.last_funding_rate)))
}

/// USDT-quoted perpetual contracts that are currently trading.
pub fn parse_exchange_info(body: &str) -> Result<Vec<String>> {
    let info: ExchangeInfo = serde_json::from_str(body)?;
    Ok(info
        .symbols
        .into_iter()
        .filter(|s| s.quote_asset == "USDT" && s.contract_type == "PERPETUAL")
        .filter(|s| s.status.as_deref().map_or(true, |st| st == "TRADING"))
        .map(|s| s.symbol)
        .collect())
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PremiumIndex {
    last_funding_rate: String,
}

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    symbol: String,
    quote_asset: String,
    #[serde(default)]
    contract_type: String,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn klines_parse_string_decimals() {
        let body = r#"[
            [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100", "148976.11427815", 1499644799999, "2434.19055334", 308, "1756.87402397", "28.46694368", "0"],
            [1499040300000, "0.01577100", "0.01600000", "0.01570000", "0.01590000", "1000.5", 1499644799999, "0", 1, "0", "0", "0"]
        ]"#;
        let candles = parse_klines(body).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].open_time.timestamp_millis(), 1_499_040_000_000);
        assert_eq!(candles[0].close, 0.015771);
        assert_eq!(candles[1].volume, 1000.5);
        assert!(candles[0].open_time < candles[1].open_time);
    }

    #[test]
    fn klines_reject_malformed_rows() {
        assert!(parse_klines(r#"[[1499040000000, "1.0"]]"#).is_err());
        assert!(parse_klines(r#"[[1499040000000, "x", "1", "1", "1", "1"]]"#).is_err());
        assert!(parse_klines(r#"{"code": -1121, "msg": "Invalid symbol."}"#).is_err());
    }

    #[test]
    fn empty_kline_list_is_ok() {
        assert!(parse_klines("[]").unwrap().is_empty());
    }

    #[test]
    fn funding_rate_parses() {
        let body = r#"{"symbol":"BTCUSDT","markPrice":"11793.63104562","lastFundingRate":"0.00038246","nextFundingTime":1597392000000}"#;
        assert_eq!(parse_funding_rate(body).unwrap(), 0.00038246);
    }

    #[test]
    fn exchange_info_keeps_trading_usdt_perpetuals() {
        let body = r#"{"timezone":"UTC","symbols":[
            {"symbol":"BTCUSDT","quoteAsset":"USDT","contractType":"PERPETUAL","status":"TRADING"},
            {"symbol":"ETHUSDT_240628","quoteAsset":"USDT","contractType":"CURRENT_QUARTER","status":"TRADING"},
            {"symbol":"ETHBUSD","quoteAsset":"BUSD","contractType":"PERPETUAL","status":"TRADING"},
            {"symbol":"OLDUSDT","quoteAsset":"USDT","contractType":"PERPETUAL","status":"SETTLING"},
            {"symbol":"SOLUSDT","quoteAsset":"USDT","contractType":"PERPETUAL"}
        ]}"#;
        assert_eq!(parse_exchange_info(body).unwrap(), vec!["BTCUSDT", "SOLUSDT"]);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = BinanceFuturesClient::new("https://example.test/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "https://example.test");
    }
}
