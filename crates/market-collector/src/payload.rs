//! 읽기 API 응답 페이로드.
//!
//! 캐시 저장소 경계에서는 `serde_json::Value`로 변환되어 저장됩니다.

use chrono::{DateTime, Utc};
use market_core::DerivedMetric;
use market_data::MoverRow;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 인도 지수 한 줄.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub name: String,
    pub symbol: String,
    pub current_price: Decimal,
    pub change: Decimal,
    pub change_percent: Decimal,
    pub prev_close: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub status_color: String,
}

impl From<&DerivedMetric> for IndexQuote {
    fn from(metric: &DerivedMetric) -> Self {
        Self {
            name: metric.symbol.name.clone(),
            symbol: metric.symbol.ticker.clone(),
            current_price: metric.price,
            change: metric.change,
            change_percent: metric.percent_change,
            prev_close: metric.previous_close,
            color: metric.symbol.color.clone(),
            status_color: metric.status_color().to_string(),
        }
    }
}

/// 해외 지수 / 원자재 한 줄.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalQuote {
    pub symbol: String,
    pub name: String,
    pub price: Decimal,
    pub change: Decimal,
    pub percent_change: Decimal,
}

impl From<&DerivedMetric> for GlobalQuote {
    fn from(metric: &DerivedMetric) -> Self {
        Self {
            symbol: metric.symbol.ticker.clone(),
            name: metric.symbol.name.clone(),
            price: metric.price,
            change: metric.change,
            percent_change: metric.percent_change,
        }
    }
}

/// 암호화폐 한 줄 (티커는 `-USD` 제거).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoQuote {
    pub name: String,
    pub symbol: String,
    pub price: Decimal,
    pub percent_change_24h: Decimal,
}

impl From<&DerivedMetric> for CryptoQuote {
    fn from(metric: &DerivedMetric) -> Self {
        Self {
            name: metric.symbol.name.clone(),
            symbol: metric.symbol.display_ticker().to_string(),
            price: metric.price,
            percent_change_24h: metric.percent_change,
        }
    }
}

/// 상승/하락 상위 종목 캐시 페이로드.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MoversPayload {
    pub top_gainers: Vec<MoverRow>,
    pub top_losers: Vec<MoverRow>,
}

impl MoversPayload {
    pub fn is_empty(&self) -> bool {
        self.top_gainers.is_empty() && self.top_losers.is_empty()
    }
}

/// 인도 시장 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndianMarketSnapshot {
    pub success: bool,
    pub indices: Vec<IndexQuote>,
    pub top_gainers: Vec<MoverRow>,
    pub top_losers: Vec<MoverRow>,
    /// 세션 타임존 기준 `%Y-%m-%d %H:%M:%S`
    pub last_updated: String,
    /// 상승/하락 상위 종목 조회 실패 사유 (지수는 그대로 반환)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub movers_error: Option<String>,
}

/// 해외 시장 스냅샷 (해외 지수 + 암호화폐 + 원자재).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketSnapshot {
    pub success: bool,
    pub timestamp: DateTime<Utc>,
    pub indices: Vec<GlobalQuote>,
    pub cryptocurrencies: Vec<CryptoQuote>,
    pub commodities: Vec<GlobalQuote>,
}

impl GlobalMarketSnapshot {
    /// 세 그룹 모두 비었는지 여부
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() && self.cryptocurrencies.is_empty() && self.commodities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_core::{MarketSymbol, QuotePair, SymbolGroup, LOSS_COLOR};
    use rust_decimal_macros::dec;

    #[test]
    fn test_crypto_quote_strips_usd_suffix() {
        let symbol = MarketSymbol::new("BTC-USD", "Bitcoin", SymbolGroup::Crypto);
        let metric =
            DerivedMetric::from_pair(&symbol, &QuotePair::new(Some(dec!(61000)), Some(dec!(60000))))
                .unwrap();

        let quote = CryptoQuote::from(&metric);
        assert_eq!(quote.symbol, "BTC");
        assert_eq!(quote.percent_change_24h, dec!(1.67));
    }

    #[test]
    fn test_index_quote_carries_colors() {
        let symbol =
            MarketSymbol::new("^NSEI", "Nifty 50", SymbolGroup::IndianIndex).with_color("#1f77b4");
        let metric =
            DerivedMetric::from_pair(&symbol, &QuotePair::new(Some(dec!(99)), Some(dec!(100))))
                .unwrap();

        let quote = IndexQuote::from(&metric);
        assert_eq!(quote.color.as_deref(), Some("#1f77b4"));
        assert_eq!(quote.status_color, LOSS_COLOR);
        assert_eq!(quote.change, dec!(-1.00));
        assert_eq!(quote.change_percent, dec!(-1.00));
    }
}
