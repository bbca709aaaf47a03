//! 시세 쌍 (현재가, 전일 종가).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 한 관측 시점의 현재가와 전일 종가.
///
/// 두 값 모두 없을 수 있습니다 (제공자 데이터 누락).
/// 값이 있다면 항상 0보다 큽니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePair {
    /// 최신 장중 가격
    pub current_price: Option<Decimal>,
    /// 현재 세션 이전의 마지막 일봉 종가
    pub previous_close: Option<Decimal>,
}

impl QuotePair {
    /// 새 시세 쌍 생성.
    ///
    /// 0 이하의 값은 누락으로 취급합니다.
    pub fn new(current_price: Option<Decimal>, previous_close: Option<Decimal>) -> Self {
        Self {
            current_price: current_price.filter(|p| *p > Decimal::ZERO),
            previous_close: previous_close.filter(|p| *p > Decimal::ZERO),
        }
    }

    /// 두 값이 모두 존재하는지 확인.
    pub fn is_complete(&self) -> bool {
        self.current_price.is_some() && self.previous_close.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_non_positive_values_become_absent() {
        let pair = QuotePair::new(Some(dec!(0)), Some(dec!(-5)));
        assert_eq!(pair.current_price, None);
        assert_eq!(pair.previous_close, None);
        assert!(!pair.is_complete());

        let pair = QuotePair::new(Some(dec!(105)), Some(dec!(100)));
        assert!(pair.is_complete());
    }
}
