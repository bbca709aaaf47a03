//! 시장 데이터 읽기 API.
//!
//! 모든 읽기는 캐시를 먼저 확인하고, 캐시에 없거나 캐시 조회가 실패하면
//! 갱신 사이클과 같은 Provider로 직접 조회합니다. 실패는 에러 대신
//! `{ "success": false, "error": ... }` 페이로드로 반환됩니다.

use chrono::{DateTime, Utc};
use market_core::{
    catalog, compute, sort_by_abs_percent_change, CacheKey, Dataset, DerivedMetric,
    MarketSymbol, SessionClock,
};
use market_data::store::DAILY_INTERVAL;
use market_data::{CacheEntry, FlowPeriod, FlowsProvider, MarketDataStore, QuoteProvider};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::payload::{
    CryptoQuote, GlobalMarketSnapshot, GlobalQuote, IndexQuote, IndianMarketSnapshot,
    MoversPayload,
};

const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 시장 데이터 서비스.
///
/// Provider, 캐시 저장소, 세션 시계를 묶어 데이터셋별 페이로드를
/// 만들고 읽기 API를 제공합니다.
#[derive(Clone)]
pub struct MarketDataService {
    quotes: Arc<dyn QuoteProvider>,
    flows: Arc<dyn FlowsProvider>,
    store: Arc<dyn MarketDataStore>,
    session: SessionClock,
    movers_limit: usize,
}

impl MarketDataService {
    /// 새 서비스 생성.
    pub fn new(
        quotes: Arc<dyn QuoteProvider>,
        flows: Arc<dyn FlowsProvider>,
        store: Arc<dyn MarketDataStore>,
        session: SessionClock,
        movers_limit: usize,
    ) -> Self {
        Self {
            quotes,
            flows,
            store,
            session,
            movers_limit,
        }
    }

    /// 세션 시계.
    pub fn session(&self) -> &SessionClock {
        &self.session
    }

    /// 캐시 저장소.
    pub fn store(&self) -> &Arc<dyn MarketDataStore> {
        &self.store
    }

    // ==================== 직접 조회 ====================

    /// 한 그룹을 배치 조회하여 파생 지표로 변환 (그룹 순서 유지).
    async fn fetch_metrics(&self, symbols: &[MarketSymbol]) -> Vec<DerivedMetric> {
        let pairs = self.quotes.fetch_quote_pairs(symbols).await;

        let ordered: Vec<_> = symbols
            .iter()
            .filter_map(|symbol| pairs.get(&symbol.ticker).map(|pair| (symbol.clone(), *pair)))
            .collect();

        let metrics = compute(&ordered);
        if metrics.len() < symbols.len() {
            debug!(
                requested = symbols.len(),
                computed = metrics.len(),
                "일부 심볼 건너뜀"
            );
        }
        metrics
    }

    /// 인도 지수 직접 조회.
    pub async fn fetch_indian_indices(&self) -> Vec<IndexQuote> {
        self.fetch_metrics(&catalog::indian_indices())
            .await
            .iter()
            .map(IndexQuote::from)
            .collect()
    }

    /// 가격 이력 테이블에서 상승/하락 상위 종목 조회.
    pub async fn fetch_movers(&self) -> market_data::Result<MoversPayload> {
        let movers = self
            .store
            .top_movers(DAILY_INTERVAL, self.movers_limit)
            .await?;

        Ok(MoversPayload {
            top_gainers: movers.gainers,
            top_losers: movers.losers,
        })
    }

    /// 해외 지수, 암호화폐, 원자재 직접 조회.
    ///
    /// 각 그룹은 변동률 절댓값 내림차순으로 정렬됩니다.
    pub async fn fetch_global(&self, now: DateTime<Utc>) -> GlobalMarketSnapshot {
        let mut indices = self.fetch_metrics(&catalog::global_indices()).await;
        let mut cryptos = self.fetch_metrics(&catalog::cryptocurrencies()).await;
        let mut commodities = self.fetch_metrics(&catalog::commodities()).await;

        sort_by_abs_percent_change(&mut indices);
        sort_by_abs_percent_change(&mut cryptos);
        sort_by_abs_percent_change(&mut commodities);

        GlobalMarketSnapshot {
            success: true,
            timestamp: now,
            indices: indices.iter().map(GlobalQuote::from).collect(),
            cryptocurrencies: cryptos.iter().map(CryptoQuote::from).collect(),
            commodities: commodities.iter().map(GlobalQuote::from).collect(),
        }
    }

    /// 세션 타임존 기준 이번 달 FII/DII 조회 기간.
    pub fn current_flow_period(&self, now: DateTime<Utc>) -> FlowPeriod {
        FlowPeriod::current(now, self.session.timezone())
    }

    /// 캐시 키에 해당하는 데이터셋 페이로드 생성.
    ///
    /// 살아남은 데이터가 하나도 없으면 `Ok(None)`을 반환합니다.
    pub async fn build_payload(
        &self,
        key: CacheKey,
        now: DateTime<Utc>,
    ) -> market_data::Result<Option<Value>> {
        match key {
            CacheKey::Indices => {
                let indices = self.fetch_indian_indices().await;
                if indices.is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_value(indices)?))
            }
            CacheKey::Movers => {
                let movers = self.fetch_movers().await?;
                if movers.is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_value(movers)?))
            }
            CacheKey::Global => {
                let snapshot = self.fetch_global(now).await;
                if snapshot.is_empty() {
                    return Ok(None);
                }
                Ok(Some(serde_json::to_value(snapshot)?))
            }
            CacheKey::FiiDii => {
                let data = self
                    .flows
                    .fetch_fii_dii(&self.current_flow_period(now))
                    .await?;
                Ok(non_empty(data))
            }
            CacheKey::Ipos => {
                let ipos = self.flows.fetch_ipos().await?;
                Ok(non_empty(ipos))
            }
        }
    }

    // ==================== 읽기 API ====================

    /// 캐시 조회. 조회 실패는 캐시 미스로 취급합니다.
    async fn cached(&self, key: CacheKey) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(Some(entry)) => Some(entry),
            Ok(None) => {
                debug!(dataset = %key, "캐시 미스, 직접 조회");
                None
            }
            Err(e) => {
                warn!(dataset = %key, error = %e, "캐시 조회 실패, 직접 조회");
                None
            }
        }
    }

    fn format_local(&self, at: DateTime<Utc>) -> String {
        self.session
            .to_local(at)
            .format(LAST_UPDATED_FORMAT)
            .to_string()
    }

    /// 인도 시장 데이터 (지수 + 상승/하락 상위 종목).
    pub async fn get_indian_market_data(&self) -> Value {
        self.get_indian_market_data_at(Utc::now()).await
    }

    /// 주어진 시각 기준 인도 시장 데이터.
    ///
    /// 상승/하락 상위 종목 조회가 실패해도 지수는 반환하며, 실패 사유는
    /// `movers_error`에 담깁니다.
    pub async fn get_indian_market_data_at(&self, now: DateTime<Utc>) -> Value {
        let (indices, updated_at) = match self.cached(CacheKey::Indices).await {
            Some(entry) => match serde_json::from_value::<Vec<IndexQuote>>(entry.payload) {
                Ok(indices) => (indices, entry.last_updated),
                Err(e) => {
                    warn!(error = %e, "캐시된 지수 페이로드 해석 실패, 직접 조회");
                    (self.fetch_indian_indices().await, now)
                }
            },
            None => (self.fetch_indian_indices().await, now),
        };

        let cached_movers = self
            .cached(CacheKey::Movers)
            .await
            .and_then(|entry| serde_json::from_value::<MoversPayload>(entry.payload).ok());

        // 상승/하락 조회 실패는 빈 목록으로 대체하고 지수는 유지
        let (movers, movers_error) = match cached_movers {
            Some(movers) => (movers, None),
            None => match self.fetch_movers().await {
                Ok(movers) => (movers, None),
                Err(e) => {
                    warn!(error = %e, "상승/하락 상위 종목 조회 실패, 빈 목록 사용");
                    (MoversPayload::default(), Some(e.to_string()))
                }
            },
        };

        let snapshot = IndianMarketSnapshot {
            success: true,
            indices,
            top_gainers: movers.top_gainers,
            top_losers: movers.top_losers,
            last_updated: self.format_local(updated_at),
            movers_error,
        };

        serde_json::to_value(snapshot).unwrap_or_else(failure)
    }

    /// 해외 시장 데이터 (지수 + 암호화폐 + 원자재).
    pub async fn get_global_market_data(&self) -> Value {
        if let Some(entry) = self.cached(CacheKey::Global).await {
            return entry.payload;
        }

        let snapshot = self.fetch_global(Utc::now()).await;
        serde_json::to_value(snapshot).unwrap_or_else(failure)
    }

    /// FII/DII 매매 동향.
    ///
    /// 기간을 지정하지 않으면 이번 달 combined 보고서를 캐시에서 읽습니다.
    /// 다른 기간은 캐시를 거치지 않고 직접 조회합니다.
    pub async fn get_fii_dii_data(&self, period: Option<FlowPeriod>) -> Value {
        self.get_fii_dii_data_at(period, Utc::now()).await
    }

    /// 주어진 시각 기준 FII/DII 매매 동향.
    pub async fn get_fii_dii_data_at(&self, period: Option<FlowPeriod>, now: DateTime<Utc>) -> Value {
        let current = self.current_flow_period(now);
        let period = period.unwrap_or_else(|| current.clone());

        if period == current {
            if let Some(entry) = self.cached(CacheKey::FiiDii).await {
                return entry.payload;
            }
        } else {
            debug!(
                year_month = %period.year_month,
                request_type = %period.request_type,
                "지정 기간 FII/DII는 캐시를 거치지 않음"
            );
        }

        match self.flows.fetch_fii_dii(&period).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "FII/DII 직접 조회 실패");
                failure(e)
            }
        }
    }

    /// IPO 목록.
    pub async fn get_ipos(&self) -> Value {
        if let Some(entry) = self.cached(CacheKey::Ipos).await {
            return entry.payload;
        }

        match self.flows.fetch_ipos().await {
            Ok(ipos) => ipos,
            Err(e) => {
                warn!(error = %e, "IPO 직접 조회 실패");
                failure(e)
            }
        }
    }

    /// 데이터셋 하나의 읽기 결과.
    ///
    /// 같은 캐시 항목을 공유하는 데이터셋은 스냅샷에서 해당 부분만 꺼냅니다.
    pub async fn get_dataset(&self, dataset: Dataset, period: Option<FlowPeriod>) -> Value {
        match dataset {
            Dataset::IndianIndices => select(
                self.get_indian_market_data().await,
                &["indices", "last_updated"],
            ),
            Dataset::TopMovers => select(
                self.get_indian_market_data().await,
                &["top_gainers", "top_losers", "last_updated"],
            ),
            Dataset::GlobalIndices => {
                select(self.get_global_market_data().await, &["indices", "timestamp"])
            }
            Dataset::Crypto => select(
                self.get_global_market_data().await,
                &["cryptocurrencies", "timestamp"],
            ),
            Dataset::Commodities => select(
                self.get_global_market_data().await,
                &["commodities", "timestamp"],
            ),
            Dataset::FiiDii => self.get_fii_dii_data(period).await,
            Dataset::Ipos => self.get_ipos().await,
        }
    }
}

/// 스냅샷에서 일부 필드만 추출. 실패 페이로드는 그대로 반환합니다.
fn select(payload: Value, fields: &[&str]) -> Value {
    if payload.get("success") == Some(&Value::Bool(false)) {
        return payload;
    }

    let mut out = Map::new();
    out.insert("success".to_string(), Value::Bool(true));
    for field in fields {
        if let Some(value) = payload.get(*field) {
            out.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

/// 실패 페이로드.
fn failure(error: impl fmt::Display) -> Value {
    json!({ "success": false, "error": error.to_string() })
}

/// null, 빈 배열, 빈 객체는 데이터 없음으로 취급.
fn non_empty(value: Value) -> Option<Value> {
    let empty = match &value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };

    if empty {
        None
    } else {
        Some(value)
    }
}
