use async_trait::async_trait;
use chrono::FixedOffset;
use sqlx::SqlitePool;

use common::{Result, Signal, SignalRecord, SignalStore};

/// SQLite-backed signal log. Rows are written in presentation units with
/// timestamps rendered in the configured report offset.
pub struct SqliteSignalStore {
    db: SqlitePool,
    offset: FixedOffset,
}

impl SqliteSignalStore {
    pub fn new(db: SqlitePool, offset: FixedOffset) -> Self {
        Self { db, offset }
    }
}

#[async_trait]
impl SignalStore for SqliteSignalStore {
    async fn append(&self, signal: &Signal) -> Result<()> {
        let row = SignalRecord::from_signal(signal, self.offset);

        sqlx::query(
            r#"
            INSERT INTO signals
                (id, symbol, timestamp, pct_change, volume_ratio, rsi, funding, type, tag, confidence, entry_price)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&row.id)
        .bind(&row.symbol)
        .bind(&row.timestamp)
        .bind(row.pct_change)
        .bind(row.volume_ratio)
        .bind(row.rsi)
        .bind(row.funding)
        .bind(&row.signal_type)
        .bind(&row.tag)
        .bind(row.confidence)
        .bind(row.entry_price)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<SignalRecord>> {
        let rows = sqlx::query_as::<_, SignalRecord>(
            r#"
            SELECT id, symbol, timestamp, pct_change, volume_ratio, rsi, funding, type, tag, confidence, entry_price
            FROM signals
            ORDER BY rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
