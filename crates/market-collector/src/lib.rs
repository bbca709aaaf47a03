//! 시장 데이터 갱신 오케스트레이터 및 읽기 API.
//!
//! 이 crate는 다음을 제공합니다:
//! - 최소 갱신 간격으로 제한되는 데이터셋 갱신 사이클
//! - 캐시 우선 읽기 API (캐시 미스 시 직접 조회)
//! - 사이클 결과 보고서
//! - 단독 실행 CLI 바이너리 (`market-collector`)

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod payload;
pub mod report;
pub mod service;
pub mod state;

pub use config::CollectorConfig;
pub use error::{CollectorError, Result};
pub use orchestrator::RefreshOrchestrator;
pub use report::{CycleReport, DatasetOutcome, DatasetStatus, RefreshOutcome, SessionStatus};
pub use service::MarketDataService;
pub use state::RefreshState;
