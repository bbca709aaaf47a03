//! 데이터셋 캐시 저장소.
//!
//! - `market_data_cache`: 캐시 키별 JSON 페이로드 + 마지막 갱신 시각
//! - `stock_data_cache`: 종목별 가격 이력 (상승/하락 상위 종목 조회용)
//!
//! 저장소는 신선도 정책을 알지 못합니다. 읽기 우선(read-through) 로직과
//! 갱신 주기는 호출자가 담당합니다.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use market_core::{absolute_change, CacheKey};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;

pub use memory::InMemoryMarketDataStore;
pub use postgres::PgMarketDataStore;

/// 일봉 가격 이력 interval.
pub const DAILY_INTERVAL: &str = "1d";

/// 캐시 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// 캐시 키
    pub key: CacheKey,
    /// 저장된 페이로드
    pub payload: Value,
    /// 마지막 갱신 시각
    pub last_updated: DateTime<Utc>,
}

/// 가격 이력 테이블 행.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistoryRow {
    pub symbol: String,
    pub interval: String,
    pub close: Decimal,
    pub percent_change: Option<Decimal>,
}

/// 상승/하락 상위 종목 한 줄.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverRow {
    pub symbol: String,
    #[serde(rename = "lastPrice")]
    pub last_price: Decimal,
    #[serde(rename = "pChange")]
    pub p_change: Decimal,
    /// 절대 변동폭 = round2(last_price * p_change / 100)
    pub change: Decimal,
}

impl MoverRow {
    /// 종가와 변동률로 생성 (절대 변동폭 계산).
    ///
    /// 변동폭이 Decimal 범위를 넘으면 `None`.
    pub fn new(symbol: impl Into<String>, last_price: Decimal, p_change: Decimal) -> Option<Self> {
        Some(Self {
            symbol: symbol.into(),
            last_price,
            p_change,
            change: absolute_change(last_price, p_change)?,
        })
    }
}

/// 상승/하락 상위 종목.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopMovers {
    /// 변동률 내림차순
    pub gainers: Vec<MoverRow>,
    /// 변동률 오름차순
    pub losers: Vec<MoverRow>,
}

/// 데이터셋 캐시 저장소 트레잇.
#[async_trait]
pub trait MarketDataStore: Send + Sync {
    /// 캐시 항목 조회. 없으면 `None`.
    async fn get(&self, key: CacheKey) -> Result<Option<CacheEntry>>;

    /// 캐시 항목 저장 (덮어쓰기).
    async fn put(&self, key: CacheKey, payload: &Value) -> Result<()>;

    /// 가격 이력에서 상승/하락 상위 종목 조회 (변동률 null 제외).
    async fn top_movers(&self, interval: &str, limit: usize) -> Result<TopMovers>;
}
