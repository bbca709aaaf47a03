//! 데이터 Provider 모듈.
//!
//! 외부 소스에서 데이터를 가져오는 Provider들을 정의합니다.
//!
//! ## Yahoo Finance spark
//! - `YahooSparkProvider`: 그룹 단위 배치 시세 조회
//! - 장중 최신가와 현재 세션 이전 일봉 종가 추출
//!
//! ## NiftyTrader
//! - `NiftyTraderClient`: FII/DII 매매 동향, IPO 목록

pub mod niftytrader;
pub mod yahoo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use market_core::{MarketSymbol, QuotePair};
use serde_json::Value;
use std::collections::HashMap;

use crate::{DataError, Result};

pub use niftytrader::NiftyTraderClient;
pub use yahoo::YahooSparkProvider;

/// 배치 시세 조회 트레잇.
///
/// 한 그룹의 심볼을 가능한 한 적은 요청으로 조회합니다.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 심볼별 시세 쌍 조회.
    ///
    /// 반환 맵의 키는 티커입니다. 추출에 실패한 심볼은 맵에서 빠지며,
    /// 배치 전체가 실패하면 빈 맵을 반환합니다 (데이터 없음과 동일).
    async fn fetch_quote_pairs(&self, symbols: &[MarketSymbol]) -> HashMap<String, QuotePair>;
}

/// FII/DII 동향 및 IPO 목록 조회 트레잇.
#[async_trait]
pub trait FlowsProvider: Send + Sync {
    /// 특정 기간의 FII/DII 매매 동향.
    async fn fetch_fii_dii(&self, period: &FlowPeriod) -> Result<Value>;

    /// IPO 기업 목록.
    async fn fetch_ipos(&self) -> Result<Value>;
}

/// FII/DII 조회 기간.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowPeriod {
    /// 조회 월 (YYYY-MM)
    pub year_month: String,
    /// 조회 유형 (기본: combined)
    pub request_type: String,
}

impl FlowPeriod {
    /// 기본 조회 유형.
    pub const DEFAULT_REQUEST_TYPE: &'static str = "combined";

    /// 새 조회 기간 생성.
    pub fn new(year_month: impl Into<String>, request_type: impl Into<String>) -> Self {
        Self {
            year_month: year_month.into(),
            request_type: request_type.into(),
        }
    }

    /// 주어진 시각이 속한 달의 combined 조회 기간.
    pub fn current(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self::new(
            now.with_timezone(&timezone).format("%Y-%m").to_string(),
            Self::DEFAULT_REQUEST_TYPE,
        )
    }
}

/// Provider 기본 URL 검증 (http/https 절대 URL, 끝의 `/` 제거).
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| DataError::ConfigError(format!("잘못된 기본 URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(raw.trim_end_matches('/').to_string()),
        scheme => Err(DataError::ConfigError(format!(
            "지원하지 않는 URL 스킴 '{}': {}",
            scheme, raw
        ))),
    }
}
