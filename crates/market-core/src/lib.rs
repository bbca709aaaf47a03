//! # Market Core
//!
//! 시장 데이터 수집/캐시 시스템의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 심볼 및 시세 쌍(현재가, 전일 종가) 타입
//! - 데이터셋 및 캐시 키 정의
//! - 거래 세션 시계 (시장 개장 여부, 다음 개장까지 남은 시간)
//! - 파생 지표 계산 (변동폭, 변동률)
//! - 설정 관리
//! - 로깅 인프라

pub mod catalog;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
