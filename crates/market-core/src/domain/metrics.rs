//! 파생 지표 계산.
//!
//! 시세 쌍을 변동폭/변동률로 변환합니다. 모든 금액과 비율은
//! [`round2`] 하나의 반올림 정책(소수점 2자리, 0에서 먼 쪽으로)을 사용합니다.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::{MarketSymbol, QuotePair};

/// 상승(보합 포함) 표시 색상.
pub const GAIN_COLOR: &str = "#2ecc71";
/// 하락 표시 색상.
pub const LOSS_COLOR: &str = "#e74c3c";

/// 소수점 2자리 반올림 (half away from zero).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 변동률로부터 절대 변동폭 계산.
///
/// `round2(last_price * percent_change / 100)`. Decimal 범위를 넘으면 `None`.
pub fn absolute_change(last_price: Decimal, percent_change: Decimal) -> Option<Decimal> {
    last_price
        .checked_mul(percent_change)?
        .checked_div(Decimal::ONE_HUNDRED)
        .map(round2)
}

/// 한 심볼의 파생 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    /// 원본 심볼
    pub symbol: MarketSymbol,
    /// 현재가
    pub price: Decimal,
    /// 전일 종가
    pub previous_close: Decimal,
    /// 변동폭 = round2(price - previous_close)
    pub change: Decimal,
    /// 변동률 (%) = round2(change / previous_close * 100)
    pub percent_change: Decimal,
}

impl DerivedMetric {
    /// 시세 쌍에서 파생 지표 계산.
    ///
    /// 현재가 또는 전일 종가가 없거나 전일 종가가 0 이하면 `None`.
    /// 변동률이 Decimal 범위를 넘는 경우도 `None`.
    pub fn from_pair(symbol: &MarketSymbol, pair: &QuotePair) -> Option<Self> {
        let price = pair.current_price?;
        let previous_close = pair.previous_close.filter(|p| *p > Decimal::ZERO)?;

        let change = round2(price.checked_sub(previous_close)?);
        let percent_change = round2(
            change
                .checked_div(previous_close)?
                .checked_mul(Decimal::ONE_HUNDRED)?,
        );

        Some(Self {
            symbol: symbol.clone(),
            price: round2(price),
            previous_close: round2(previous_close),
            change,
            percent_change,
        })
    }

    /// 상승(보합 포함) 여부.
    pub fn is_gain(&self) -> bool {
        self.change >= Decimal::ZERO
    }

    /// 상승/하락 표시 색상.
    pub fn status_color(&self) -> &'static str {
        if self.is_gain() {
            GAIN_COLOR
        } else {
            LOSS_COLOR
        }
    }
}

/// 시세 쌍 목록을 파생 지표로 변환.
///
/// 입력 순서를 유지하며 계산할 수 없는 항목은 건너뜁니다.
pub fn compute(pairs: &[(MarketSymbol, QuotePair)]) -> Vec<DerivedMetric> {
    pairs
        .iter()
        .filter_map(|(symbol, pair)| DerivedMetric::from_pair(symbol, pair))
        .collect()
}

/// 변동률 절댓값 내림차순 정렬 (큰 움직임 우선).
pub fn sort_by_abs_percent_change(metrics: &mut [DerivedMetric]) {
    metrics.sort_by(|a, b| b.percent_change.abs().cmp(&a.percent_change.abs()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SymbolGroup;
    use rust_decimal_macros::dec;

    fn symbol(ticker: &str) -> MarketSymbol {
        MarketSymbol::new(ticker, ticker, SymbolGroup::GlobalIndex)
    }

    #[test]
    fn test_compute_basic_change() {
        let pairs = vec![(symbol("^GSPC"), QuotePair::new(Some(dec!(105.00)), Some(dec!(100.00))))];
        let metrics = compute(&pairs);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].change, dec!(5.00));
        assert_eq!(metrics[0].percent_change, dec!(5.00));
        assert_eq!(metrics[0].status_color(), GAIN_COLOR);
    }

    #[test]
    fn test_compute_skips_missing_previous_close() {
        let pairs = vec![
            (symbol("A"), QuotePair::new(Some(dec!(105)), None)),
            (symbol("B"), QuotePair::new(Some(dec!(99)), Some(dec!(100)))),
            (symbol("C"), QuotePair::new(None, Some(dec!(100)))),
        ];
        let metrics = compute(&pairs);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].symbol.ticker, "B");
        assert_eq!(metrics[0].change, dec!(-1.00));
        assert_eq!(metrics[0].status_color(), LOSS_COLOR);
    }

    #[test]
    fn test_zero_previous_close_is_skipped() {
        let pair = QuotePair {
            current_price: Some(dec!(10)),
            previous_close: Some(Decimal::ZERO),
        };
        assert!(DerivedMetric::from_pair(&symbol("Z"), &pair).is_none());
    }

    #[test]
    fn test_overflowing_percent_change_is_skipped() {
        let tiny = Decimal::new(1, 25);
        let pairs = vec![
            (symbol("TINY"), QuotePair::new(Some(dec!(1000000)), Some(tiny))),
            (symbol("OK"), QuotePair::new(Some(dec!(105)), Some(dec!(100)))),
        ];
        let metrics = compute(&pairs);

        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].symbol.ticker, "OK");
        assert_eq!(metrics[0].percent_change, dec!(5.00));
    }

    #[test]
    fn test_round2_midpoint_away_from_zero() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round2(dec!(2.344)), dec!(2.34));
    }

    #[test]
    fn test_percent_change_uses_rounded_change() {
        // change = round2(22500.456 - 22400.123) = 100.33
        let pair = QuotePair::new(Some(dec!(22500.456)), Some(dec!(22400.123)));
        let metric = DerivedMetric::from_pair(&symbol("^NSEI"), &pair).unwrap();

        assert_eq!(metric.change, dec!(100.33));
        assert_eq!(metric.percent_change, round2(dec!(100.33) / dec!(22400.123) * dec!(100)));
        assert_eq!(metric.price, dec!(22500.46));
    }

    #[test]
    fn test_sort_by_abs_percent_change() {
        let pairs = vec![
            (symbol("A"), QuotePair::new(Some(dec!(101)), Some(dec!(100)))),
            (symbol("B"), QuotePair::new(Some(dec!(95)), Some(dec!(100)))),
            (symbol("C"), QuotePair::new(Some(dec!(103)), Some(dec!(100)))),
        ];
        let mut metrics = compute(&pairs);
        sort_by_abs_percent_change(&mut metrics);

        let order: Vec<&str> = metrics.iter().map(|m| m.symbol.ticker.as_str()).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_absolute_change() {
        assert_eq!(absolute_change(dec!(2500), dec!(2.5)), Some(dec!(62.50)));
        assert_eq!(absolute_change(dec!(1234.56), dec!(-1.23)), Some(dec!(-15.19)));
        assert_eq!(absolute_change(Decimal::MAX, dec!(200)), None);
    }
}
