//! 시장 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - Yahoo Finance spark 배치 시세 조회 (현재가 + 전일 종가)
//! - NiftyTrader FII/DII 동향 및 IPO 목록 조회
//! - 데이터셋 캐시 저장소 (PostgreSQL, 메모리)
//! - 가격 이력 테이블 기반 상승/하락 상위 종목 조회
//! - 브로커 계정/토큰 저장소

pub mod accounts;
pub mod error;
pub mod provider;
pub mod store;

pub use error::{DataError, Result};

pub use accounts::{AccountStore, BrokerAccount, InMemoryAccountStore, PgAccountStore, TokenPayload};
pub use provider::{
    FlowPeriod, FlowsProvider, NiftyTraderClient, QuoteProvider, YahooSparkProvider,
};
pub use store::{
    CacheEntry, InMemoryMarketDataStore, MarketDataStore, MoverRow, PgMarketDataStore, PriceHistoryRow,
    TopMovers,
};
