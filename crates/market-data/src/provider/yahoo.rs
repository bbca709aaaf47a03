//! Yahoo Finance spark 배치 시세 Provider.
//!
//! 그룹의 모든 심볼을 spark 엔드포인트 한 번으로 조회합니다.
//! 해상도별로 두 번의 배치 요청을 보냅니다:
//!
//! - 장중 (`range=1d`, `interval=1m`): 최신 가격
//! - 일봉 (`range=5d`, `interval=1d`): 현재 세션 이전의 마지막 종가
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! use market_data::provider::{QuoteProvider, YahooSparkProvider};
//!
//! let provider = YahooSparkProvider::new("https://query1.finance.yahoo.com", timeout)?;
//! let pairs = provider.fetch_quote_pairs(&market_core::catalog::indian_indices()).await;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use market_core::{MarketSymbol, QuotePair};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::QuoteProvider;
use crate::error::{DataError, Result};

/// spark 조회 구간.
#[derive(Debug, Clone, Copy)]
struct SparkWindow {
    range: &'static str,
    interval: &'static str,
}

const INTRADAY: SparkWindow = SparkWindow {
    range: "1d",
    interval: "1m",
};

// 주말/공휴일을 고려하여 여유 있게 5일
const DAILY: SparkWindow = SparkWindow {
    range: "5d",
    interval: "1d",
};

#[derive(Debug, Deserialize)]
struct SparkEnvelope {
    spark: SparkBody,
}

#[derive(Debug, Deserialize)]
struct SparkBody {
    #[serde(default)]
    result: Option<Vec<Value>>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct SparkResult {
    symbol: String,
    response: Vec<SparkResponse>,
}

#[derive(Debug, Deserialize)]
struct SparkResponse {
    #[serde(default)]
    meta: SparkMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: SparkIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SparkMeta {
    exchange_timezone_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SparkIndicators {
    quote: Vec<SparkQuote>,
}

#[derive(Debug, Deserialize)]
struct SparkQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// 종가 시계열 (null 제외, 시간순).
#[derive(Debug, Clone, Default)]
struct CloseSeries {
    points: Vec<(DateTime<Utc>, f64)>,
    timezone: Option<Tz>,
}

impl CloseSeries {
    fn latest(&self) -> Option<(DateTime<Utc>, f64)> {
        self.points.last().copied()
    }

    /// 거래소 현지 기준 세션 날짜.
    fn session_date(&self, at: DateTime<Utc>) -> NaiveDate {
        match self.timezone {
            Some(tz) => at.with_timezone(&tz).date_naive(),
            None => at.date_naive(),
        }
    }

    /// 주어진 세션 날짜 이전의 마지막 종가.
    fn close_before(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .iter()
            .rev()
            .find(|(ts, _)| self.session_date(*ts) < date)
            .map(|(_, close)| *close)
    }

    /// 끝에서 두 번째 종가.
    fn second_to_last(&self) -> Option<f64> {
        self.points.iter().rev().nth(1).map(|(_, close)| *close)
    }
}

/// spark 결과 한 항목을 종가 시계열로 변환.
fn parse_series(raw: Value) -> Result<(String, CloseSeries)> {
    let result: SparkResult = serde_json::from_value(raw)?;

    let response = result
        .response
        .into_iter()
        .next()
        .ok_or_else(|| DataError::NoData(format!("{}: 응답 없음", result.symbol)))?;

    let closes = response
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    if response.timestamp.len() != closes.len() {
        return Err(DataError::ParseError(format!(
            "{}: timestamp {}개, close {}개 불일치",
            result.symbol,
            response.timestamp.len(),
            closes.len()
        )));
    }

    let points: Vec<(DateTime<Utc>, f64)> = response
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            let ts = Utc.timestamp_opt(*ts, 0).single()?;
            Some((ts, close))
        })
        .collect();

    let timezone = response
        .meta
        .exchange_timezone_name
        .and_then(|name| name.parse::<Tz>().ok());

    Ok((result.symbol, CloseSeries { points, timezone }))
}

/// Yahoo Finance spark 기반 배치 시세 제공자.
pub struct YahooSparkProvider {
    client: reqwest::Client,
    base_url: String,
}

impl YahooSparkProvider {
    /// 새로운 Provider 생성.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0 Safari/537.36")
            .build()
            .map_err(|e| DataError::ConnectionError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: super::normalize_base_url(&base_url.into())?,
        })
    }

    /// 한 구간에 대해 배치 요청 한 번.
    ///
    /// 개별 항목 파싱 실패는 경고 후 건너뜁니다.
    async fn fetch_window(
        &self,
        tickers: &[&str],
        window: SparkWindow,
    ) -> Result<HashMap<String, CloseSeries>> {
        let url = format!("{}/v8/finance/spark", self.base_url);
        let symbols = tickers.join(",");

        debug!(
            symbols = %symbols,
            range = window.range,
            interval = window.interval,
            "Yahoo spark API 호출"
        );

        let envelope: SparkEnvelope = self
            .client
            .get(&url)
            .query(&[
                ("symbols", symbols.as_str()),
                ("range", window.range),
                ("interval", window.interval),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let results = match envelope.spark.result {
            Some(results) => results,
            None => {
                let message = envelope
                    .spark
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "결과 없음".to_string());
                return Err(DataError::FetchError(format!("spark 오류: {}", message)));
            }
        };

        let mut series = HashMap::with_capacity(results.len());
        for raw in results {
            match parse_series(raw) {
                Ok((symbol, s)) => {
                    series.insert(symbol, s);
                }
                Err(e) => {
                    warn!(error = %e, interval = window.interval, "spark 항목 파싱 실패, 건너뜀");
                }
            }
        }

        Ok(series)
    }
}

#[async_trait]
impl QuoteProvider for YahooSparkProvider {
    #[instrument(skip(self, symbols), fields(count = symbols.len()))]
    async fn fetch_quote_pairs(&self, symbols: &[MarketSymbol]) -> HashMap<String, QuotePair> {
        if symbols.is_empty() {
            return HashMap::new();
        }

        let tickers: Vec<&str> = symbols.iter().map(|s| s.ticker.as_str()).collect();

        let intraday = match self.fetch_window(&tickers, INTRADAY).await {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "장중 배치 조회 실패");
                return HashMap::new();
            }
        };

        let daily = match self.fetch_window(&tickers, DAILY).await {
            Ok(series) => series,
            Err(e) => {
                warn!(error = %e, "일봉 배치 조회 실패");
                return HashMap::new();
            }
        };

        let mut pairs = HashMap::with_capacity(tickers.len());

        for ticker in tickers {
            let intraday_series = intraday.get(ticker);
            let daily_series = daily.get(ticker);

            if intraday_series.is_none() && daily_series.is_none() {
                debug!(symbol = ticker, "시세 데이터 없음");
                continue;
            }

            let latest = intraday_series.and_then(|s| s.latest().map(|point| (s, point)));
            let current_price = latest.map(|(_, (_, close))| close);

            let previous_close = daily_series.and_then(|daily| match latest {
                Some((series, (ts, _))) => daily.close_before(series.session_date(ts)),
                None => daily.second_to_last(),
            });

            pairs.insert(
                ticker.to_string(),
                QuotePair::new(
                    current_price.and_then(Decimal::from_f64),
                    previous_close.and_then(Decimal::from_f64),
                ),
            );
        }

        debug!(requested = symbols.len(), received = pairs.len(), "배치 시세 조회 완료");
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> i64 {
        chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .timestamp()
    }

    #[test]
    fn test_parse_series_drops_null_closes() {
        let raw = json!({
            "symbol": "^NSEI",
            "response": [{
                "meta": { "exchangeTimezoneName": "Asia/Kolkata" },
                "timestamp": [ts(2024, 6, 14, 9, 15), ts(2024, 6, 14, 9, 16), ts(2024, 6, 14, 9, 17)],
                "indicators": { "quote": [{ "close": [22500.5, null, 22510.0] }] }
            }]
        });

        let (symbol, series) = parse_series(raw).unwrap();
        assert_eq!(symbol, "^NSEI");
        assert_eq!(series.points.len(), 2);
        assert_eq!(series.latest().map(|(_, c)| c), Some(22510.0));
        assert_eq!(series.timezone, Some(chrono_tz::Asia::Kolkata));
    }

    #[test]
    fn test_parse_series_rejects_length_mismatch() {
        let raw = json!({
            "symbol": "^BSESN",
            "response": [{
                "timestamp": [1, 2, 3],
                "indicators": { "quote": [{ "close": [1.0] }] }
            }]
        });

        assert!(matches!(parse_series(raw), Err(DataError::ParseError(_))));
    }

    #[test]
    fn test_close_before_skips_current_session() {
        let series = CloseSeries {
            points: vec![
                (Utc.timestamp_opt(ts(2024, 6, 12, 9, 15), 0).unwrap(), 100.0),
                (Utc.timestamp_opt(ts(2024, 6, 13, 9, 15), 0).unwrap(), 101.0),
                (Utc.timestamp_opt(ts(2024, 6, 14, 9, 15), 0).unwrap(), 102.0),
            ],
            timezone: Some(chrono_tz::Asia::Kolkata),
        };

        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(series.close_before(today), Some(101.0));
        assert_eq!(series.second_to_last(), Some(101.0));

        // 휴장일 다음 날: 마지막 일봉이 이전 세션
        let monday = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
        assert_eq!(series.close_before(monday), Some(102.0));
    }
}
