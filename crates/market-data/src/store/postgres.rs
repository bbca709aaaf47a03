//! PostgreSQL 캐시 저장소.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::CacheKey;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use super::{CacheEntry, MarketDataStore, MoverRow, TopMovers};
use crate::error::{DataError, Result};

/// 캐시 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
struct CacheRecord {
    payload: Json<Value>,
    last_updated: DateTime<Utc>,
}

/// 가격 이력 조회 레코드.
#[derive(Debug, Clone, FromRow)]
struct MoverRecord {
    symbol: String,
    close: Decimal,
    percent_change: Decimal,
}

/// PostgreSQL 기반 캐시 저장소.
#[derive(Clone)]
pub struct PgMarketDataStore {
    pool: PgPool,
}

impl PgMarketDataStore {
    /// 기존 연결 풀로 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 새 연결 풀을 열어 생성.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| DataError::ConnectionError(e.to_string()))?;

        info!("PostgreSQL connection established");
        Ok(Self { pool })
    }

    /// 내부 연결 풀.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn movers_query(&self, interval: &str, limit: usize, descending: bool) -> Result<Vec<MoverRow>> {
        let sql = if descending {
            r#"
            SELECT symbol, close, percent_change
            FROM stock_data_cache
            WHERE "interval" = $1 AND percent_change IS NOT NULL
            ORDER BY percent_change DESC
            LIMIT $2
            "#
        } else {
            r#"
            SELECT symbol, close, percent_change
            FROM stock_data_cache
            WHERE "interval" = $1 AND percent_change IS NOT NULL
            ORDER BY percent_change ASC
            LIMIT $2
            "#
        };

        let records: Vec<MoverRecord> = sqlx::query_as(sql)
            .bind(interval)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(records
            .into_iter()
            .filter_map(|r| MoverRow::new(r.symbol, r.close, r.percent_change))
            .collect())
    }
}

#[async_trait]
impl MarketDataStore for PgMarketDataStore {
    #[instrument(skip(self))]
    async fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>> {
        let record: Option<CacheRecord> = sqlx::query_as(
            r#"
            SELECT payload, last_updated
            FROM market_data_cache
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        debug!(key = %key, hit = record.is_some(), "캐시 조회");

        Ok(record.map(|r| CacheEntry {
            key,
            payload: r.payload.0,
            last_updated: r.last_updated,
        }))
    }

    #[instrument(skip(self, payload))]
    async fn put(&self, key: CacheKey, payload: &Value) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO market_data_cache (key, payload, last_updated)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key)
            DO UPDATE SET
                payload = EXCLUDED.payload,
                last_updated = NOW()
            "#,
        )
        .bind(key.as_str())
        .bind(Json(payload))
        .execute(&self.pool)
        .await?;

        debug!(key = %key, "캐시 저장");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn top_movers(&self, interval: &str, limit: usize) -> Result<TopMovers> {
        let gainers = self.movers_query(interval, limit, true).await?;
        let losers = self.movers_query(interval, limit, false).await?;

        Ok(TopMovers { gainers, losers })
    }
}
