//! 데이터셋과 캐시 키 정의.
//!
//! 데이터셋은 독립적으로 갱신/캐시되는 시장 데이터 카테고리입니다.
//! 해외 지수, 암호화폐, 원자재는 하나의 해외 시장 스냅샷으로 함께
//! 수집되므로 같은 캐시 키(`global`)를 공유합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// 시장 데이터셋.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    /// 인도 주요 지수
    IndianIndices,
    /// 상승/하락 상위 종목
    TopMovers,
    /// 해외 주요 지수
    GlobalIndices,
    /// 암호화폐
    Crypto,
    /// 원자재
    Commodities,
    /// FII/DII 매매 동향 (월 1회)
    FiiDii,
    /// IPO 목록
    Ipos,
}

impl Dataset {
    /// 모든 데이터셋.
    pub const ALL: [Dataset; 7] = [
        Dataset::IndianIndices,
        Dataset::TopMovers,
        Dataset::GlobalIndices,
        Dataset::Crypto,
        Dataset::Commodities,
        Dataset::FiiDii,
        Dataset::Ipos,
    ];

    /// 문자열 이름.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::IndianIndices => "indian_indices",
            Dataset::TopMovers => "top_movers",
            Dataset::GlobalIndices => "global_indices",
            Dataset::Crypto => "crypto",
            Dataset::Commodities => "commodities",
            Dataset::FiiDii => "fii_dii",
            Dataset::Ipos => "ipos",
        }
    }

    /// 데이터셋이 저장되는 캐시 키.
    pub fn cache_key(&self) -> CacheKey {
        match self {
            Dataset::IndianIndices => CacheKey::Indices,
            Dataset::TopMovers => CacheKey::Movers,
            Dataset::GlobalIndices | Dataset::Crypto | Dataset::Commodities => CacheKey::Global,
            Dataset::FiiDii => CacheKey::FiiDii,
            Dataset::Ipos => CacheKey::Ipos,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dataset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .into_iter()
            .find(|d| d.as_str() == s.to_lowercase())
            .ok_or_else(|| CoreError::UnknownDataset(s.to_string()))
    }
}

/// 캐시 저장소 키.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKey {
    /// 인도 지수 스냅샷
    Indices,
    /// 상승/하락 상위 종목
    Movers,
    /// 해외 시장 스냅샷 (지수, 암호화폐, 원자재)
    Global,
    /// FII/DII 동향
    FiiDii,
    /// IPO 목록
    Ipos,
}

impl CacheKey {
    /// 갱신 사이클에서 시도하는 고정 순서.
    pub const REFRESH_ORDER: [CacheKey; 5] = [
        CacheKey::Indices,
        CacheKey::Movers,
        CacheKey::Global,
        CacheKey::FiiDii,
        CacheKey::Ipos,
    ];

    /// 저장소에 기록되는 키 문자열.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheKey::Indices => "indices",
            CacheKey::Movers => "movers",
            CacheKey::Global => "global",
            CacheKey::FiiDii => "fii_dii",
            CacheKey::Ipos => "ipos",
        }
    }

    /// 매월 1일에만 갱신되는 키인지 확인.
    pub fn is_monthly(&self) -> bool {
        matches!(self, CacheKey::FiiDii)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheKey::REFRESH_ORDER
            .into_iter()
            .find(|k| k.as_str() == s.to_lowercase())
            .ok_or_else(|| CoreError::UnknownDataset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_datasets_share_cache_key() {
        assert_eq!(Dataset::GlobalIndices.cache_key(), CacheKey::Global);
        assert_eq!(Dataset::Crypto.cache_key(), CacheKey::Global);
        assert_eq!(Dataset::Commodities.cache_key(), CacheKey::Global);
        assert_eq!(Dataset::FiiDii.cache_key(), CacheKey::FiiDii);
    }

    #[test]
    fn test_refresh_order_is_fixed() {
        let order: Vec<&str> = CacheKey::REFRESH_ORDER.iter().map(|k| k.as_str()).collect();
        assert_eq!(order, vec!["indices", "movers", "global", "fii_dii", "ipos"]);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("FII_DII".parse::<CacheKey>().unwrap(), CacheKey::FiiDii);
        assert_eq!("crypto".parse::<Dataset>().unwrap(), Dataset::Crypto);
        assert!("options".parse::<Dataset>().is_err());
    }
}
