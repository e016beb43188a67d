use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Exchange API error: {0}")]
    Exchange(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Insufficient data for {symbol}: got {got} candles, need {need}")]
    InsufficientData {
        symbol: String,
        got: usize,
        need: usize,
    },

    #[error("Universe listing failed: {0}")]
    Universe(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for failures that should simply be retried on the next cycle.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Timeout(_) | Error::Exchange(_))
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
