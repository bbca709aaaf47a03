//! 심볼 정의.
//!
//! 외부 데이터 소스의 티커와 화면에 표시할 이름, 색상을 묶은
//! 정적 설정 값입니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 시장 데이터 그룹.
///
/// 같은 그룹의 심볼은 한 번의 배치 요청으로 조회됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolGroup {
    /// 인도 지수 (Nifty, Sensex 등)
    IndianIndex,
    /// 해외 지수 (S&P 500, Nikkei 등)
    GlobalIndex,
    /// 암호화폐
    Crypto,
    /// 원자재 선물
    Commodity,
}

impl fmt::Display for SymbolGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolGroup::IndianIndex => write!(f, "indian_index"),
            SymbolGroup::GlobalIndex => write!(f, "global_index"),
            SymbolGroup::Crypto => write!(f, "crypto"),
            SymbolGroup::Commodity => write!(f, "commodity"),
        }
    }
}

/// 데이터 제공자가 인식하는 심볼.
///
/// 예: `^NSEI` (Nifty 50), `BTC-USD` (Bitcoin).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketSymbol {
    /// 외부 티커 (예: ^NSEI, GC=F)
    pub ticker: String,
    /// 표시 이름
    pub name: String,
    /// 차트 표시 색상
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// 소속 그룹
    pub group: SymbolGroup,
}

impl MarketSymbol {
    /// 새 심볼을 생성합니다.
    pub fn new(ticker: impl Into<String>, name: impl Into<String>, group: SymbolGroup) -> Self {
        Self {
            ticker: ticker.into(),
            name: name.into(),
            color: None,
            group,
        }
    }

    /// 표시 색상을 설정합니다.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// 화면 표시용 티커.
    ///
    /// 암호화폐는 `-USD` 접미사를 제거합니다 (BTC-USD → BTC).
    pub fn display_ticker(&self) -> &str {
        match self.group {
            SymbolGroup::Crypto => self.ticker.strip_suffix("-USD").unwrap_or(&self.ticker),
            _ => &self.ticker,
        }
    }
}

impl fmt::Display for MarketSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.ticker)
    }
}
