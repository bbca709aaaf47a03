//! 메모리 기반 캐시 저장소.
//!
//! 데이터베이스 없이 실행하거나 테스트할 때 사용합니다.
//! 프로세스 종료 시 내용은 사라집니다.

use async_trait::async_trait;
use chrono::Utc;
use market_core::CacheKey;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{CacheEntry, MarketDataStore, MoverRow, PriceHistoryRow, TopMovers};
use crate::Result;

/// 메모리 캐시 저장소.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketDataStore {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    history: Arc<RwLock<Vec<PriceHistoryRow>>>,
}

impl InMemoryMarketDataStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 가격 이력 행 추가 (같은 symbol+interval은 교체).
    pub async fn upsert_price_history(&self, rows: impl IntoIterator<Item = PriceHistoryRow>) {
        let mut history = self.history.write().await;
        for row in rows {
            history.retain(|r| !(r.symbol == row.symbol && r.interval == row.interval));
            history.push(row);
        }
    }

    /// 저장된 캐시 항목 수.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// 캐시가 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl MarketDataStore for InMemoryMarketDataStore {
    async fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn put(&self, key: CacheKey, payload: &Value) -> Result<()> {
        let entry = CacheEntry {
            key,
            payload: payload.clone(),
            last_updated: Utc::now(),
        };
        self.entries.write().await.insert(key, entry);
        Ok(())
    }

    async fn top_movers(&self, interval: &str, limit: usize) -> Result<TopMovers> {
        let history = self.history.read().await;

        let mut rows: Vec<MoverRow> = history
            .iter()
            .filter(|r| r.interval == interval)
            .filter_map(|r| MoverRow::new(&r.symbol, r.close, r.percent_change?))
            .collect();

        rows.sort_by(|a, b| b.p_change.cmp(&a.p_change));
        let gainers = rows.iter().take(limit).cloned().collect();
        let losers = rows.iter().rev().take(limit).cloned().collect();

        Ok(TopMovers { gainers, losers })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn row(symbol: &str, interval: &str, pct: Option<Decimal>) -> PriceHistoryRow {
        PriceHistoryRow {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
            close: dec!(100),
            percent_change: pct,
        }
    }

    #[tokio::test]
    async fn test_get_before_put_is_absent() {
        let store = InMemoryMarketDataStore::new();
        assert!(store.get(CacheKey::Indices).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let store = InMemoryMarketDataStore::new();
        let payload = json!({"success": true, "indices": [{"name": "Nifty 50"}]});

        store.put(CacheKey::Indices, &payload).await.unwrap();
        let entry = store.get(CacheKey::Indices).await.unwrap().unwrap();

        assert_eq!(entry.payload, payload);
        assert_eq!(entry.key, CacheKey::Indices);
        assert!(store.get(CacheKey::Global).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_top_movers_excludes_nulls_and_other_intervals() {
        let store = InMemoryMarketDataStore::new();
        store
            .upsert_price_history(vec![
                row("A", "1d", Some(dec!(3.5))),
                row("B", "1d", Some(dec!(-2.0))),
                row("C", "1d", None),
                row("D", "1h", Some(dec!(9.9))),
                row("E", "1d", Some(dec!(0.5))),
            ])
            .await;

        let movers = store.top_movers("1d", 2).await.unwrap();
        let gainers: Vec<&str> = movers.gainers.iter().map(|r| r.symbol.as_str()).collect();
        let losers: Vec<&str> = movers.losers.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(gainers, vec!["A", "E"]);
        assert_eq!(losers, vec!["B", "E"]);
    }
}
