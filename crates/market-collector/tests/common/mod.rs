//! 통합 테스트용 mock Provider / 저장소.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use market_collector::{MarketDataService, RefreshOrchestrator};
use market_core::{CacheKey, MarketSymbol, QuotePair, SessionClock};
use market_data::{
    CacheEntry, DataError, FlowPeriod, FlowsProvider, InMemoryMarketDataStore, MarketDataStore,
    QuoteProvider, TopMovers,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const UPDATE_INTERVAL: Duration = Duration::from_secs(300);

/// IST 기준 시각을 UTC로 변환.
pub fn ist(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    chrono_tz::Asia::Kolkata
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
        .with_timezone(&Utc)
}

/// 모든 심볼에 대해 현재가 105, 전일 종가 100을 돌려주는 Provider.
#[derive(Default)]
pub struct MockQuotes {
    pub calls: AtomicUsize,
    missing: Mutex<HashSet<String>>,
    down: Mutex<bool>,
}

impl MockQuotes {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 특정 티커를 응답에서 제외
    pub fn drop_ticker(&self, ticker: &str) {
        self.missing.lock().unwrap().insert(ticker.to_string());
    }

    /// 배치 전체 실패 (빈 맵)
    pub fn set_down(&self, down: bool) {
        *self.down.lock().unwrap() = down;
    }
}

#[async_trait]
impl QuoteProvider for MockQuotes {
    async fn fetch_quote_pairs(&self, symbols: &[MarketSymbol]) -> HashMap<String, QuotePair> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if *self.down.lock().unwrap() {
            return HashMap::new();
        }

        let missing = self.missing.lock().unwrap();
        symbols
            .iter()
            .filter(|s| !missing.contains(&s.ticker))
            .map(|s| {
                (
                    s.ticker.clone(),
                    QuotePair::new(Some(dec!(105)), Some(dec!(100))),
                )
            })
            .collect()
    }
}

/// FII/DII, IPO mock Provider.
#[derive(Default)]
pub struct MockFlows {
    pub fii_calls: AtomicUsize,
    pub ipo_calls: AtomicUsize,
    pub periods: Mutex<Vec<FlowPeriod>>,
    ipos_down: Mutex<bool>,
}

impl MockFlows {
    pub fn fii_calls(&self) -> usize {
        self.fii_calls.load(Ordering::SeqCst)
    }

    pub fn ipo_calls(&self) -> usize {
        self.ipo_calls.load(Ordering::SeqCst)
    }

    pub fn set_ipos_down(&self, down: bool) {
        *self.ipos_down.lock().unwrap() = down;
    }
}

#[async_trait]
impl FlowsProvider for MockFlows {
    async fn fetch_fii_dii(&self, period: &FlowPeriod) -> market_data::Result<Value> {
        self.fii_calls.fetch_add(1, Ordering::SeqCst);
        self.periods.lock().unwrap().push(period.clone());
        Ok(json!({ "year_month": period.year_month, "fii_net": "1250.50" }))
    }

    async fn fetch_ipos(&self) -> market_data::Result<Value> {
        self.ipo_calls.fetch_add(1, Ordering::SeqCst);
        if *self.ipos_down.lock().unwrap() {
            return Err(DataError::FetchError("HTTP 503".to_string()));
        }
        Ok(json!([{ "company_name": "Acme Ltd" }]))
    }
}

/// 특정 키의 읽기/쓰기를 실패시키는 저장소 래퍼.
pub struct FlakyStore {
    pub inner: InMemoryMarketDataStore,
    pub fail_get: bool,
    pub fail_put: HashSet<CacheKey>,
    pub fail_movers: bool,
}

#[async_trait]
impl MarketDataStore for FlakyStore {
    async fn get(&self, key: CacheKey) -> market_data::Result<Option<CacheEntry>> {
        if self.fail_get {
            return Err(DataError::ConnectionError("connection refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn put(&self, key: CacheKey, payload: &Value) -> market_data::Result<()> {
        if self.fail_put.contains(&key) {
            return Err(DataError::QueryError("disk full".to_string()));
        }
        self.inner.put(key, payload).await
    }

    async fn top_movers(&self, interval: &str, limit: usize) -> market_data::Result<TopMovers> {
        if self.fail_movers {
            return Err(DataError::ConnectionError("db down".to_string()));
        }
        self.inner.top_movers(interval, limit).await
    }
}

pub struct Harness {
    pub quotes: Arc<MockQuotes>,
    pub flows: Arc<MockFlows>,
    pub store: Arc<InMemoryMarketDataStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            quotes: Arc::new(MockQuotes::default()),
            flows: Arc::new(MockFlows::default()),
            store: Arc::new(InMemoryMarketDataStore::new()),
        }
    }

    pub fn service(&self) -> MarketDataService {
        self.service_with_store(self.store.clone())
    }

    pub fn service_with_store(&self, store: Arc<dyn MarketDataStore>) -> MarketDataService {
        MarketDataService::new(
            self.quotes.clone(),
            self.flows.clone(),
            store,
            SessionClock::nse(),
            5,
        )
    }

    pub fn orchestrator(&self) -> RefreshOrchestrator {
        RefreshOrchestrator::new(self.service(), UPDATE_INTERVAL)
    }
}
