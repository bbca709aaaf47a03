//! 정적으로 설정된 심볼 목록.
//!
//! 그룹별 목록은 한 번의 배치 요청으로 조회되는 단위입니다.

use crate::types::{MarketSymbol, SymbolGroup};

/// 인도 주요 지수.
pub fn indian_indices() -> Vec<MarketSymbol> {
    [
        ("^NSEI", "Nifty 50", "#1f77b4"),
        ("^NSEBANK", "Nifty Bank", "#ff7f0e"),
        ("NIFTY_FIN_SERVICE.NS", "FinNifty", "#2ca02c"),
        ("^NSEMDCP50", "Midcap Nifty", "#d62728"),
        ("^BSESN", "Sensex", "#9467bd"),
    ]
    .into_iter()
    .map(|(ticker, name, color)| {
        MarketSymbol::new(ticker, name, SymbolGroup::IndianIndex).with_color(color)
    })
    .collect()
}

/// 해외 주요 지수.
pub fn global_indices() -> Vec<MarketSymbol> {
    group(
        SymbolGroup::GlobalIndex,
        &[
            ("^GSPC", "S&P 500"),
            ("^DJI", "Dow Jones"),
            ("^IXIC", "NASDAQ"),
            ("^FTSE", "FTSE 100"),
            ("^N225", "Nikkei 225"),
            ("^HSI", "Hang Seng"),
        ],
    )
}

/// 주요 암호화폐.
pub fn cryptocurrencies() -> Vec<MarketSymbol> {
    group(
        SymbolGroup::Crypto,
        &[
            ("BTC-USD", "Bitcoin"),
            ("ETH-USD", "Ethereum"),
            ("BNB-USD", "Binance Coin"),
            ("SOL-USD", "Solana"),
            ("XRP-USD", "XRP"),
        ],
    )
}

/// 원자재 선물.
pub fn commodities() -> Vec<MarketSymbol> {
    group(
        SymbolGroup::Commodity,
        &[
            ("GC=F", "Gold"),
            ("SI=F", "Silver"),
            ("CL=F", "Crude Oil"),
            ("NG=F", "Natural Gas"),
            ("HG=F", "Copper"),
        ],
    )
}

fn group(group: SymbolGroup, entries: &[(&str, &str)]) -> Vec<MarketSymbol> {
    entries
        .iter()
        .map(|(ticker, name)| MarketSymbol::new(*ticker, *name, group))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indian_indices_have_colors() {
        let indices = indian_indices();
        assert_eq!(indices.len(), 5);
        assert!(indices.iter().all(|s| s.color.is_some()));
        assert_eq!(indices[0].ticker, "^NSEI");
    }

    #[test]
    fn test_groups_are_tagged() {
        assert!(cryptocurrencies().iter().all(|s| s.group == SymbolGroup::Crypto));
        assert!(commodities().iter().all(|s| s.group == SymbolGroup::Commodity));
        assert_eq!(global_indices().len(), 6);
    }
}
