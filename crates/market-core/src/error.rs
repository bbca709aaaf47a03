//! 핵심 도메인 에러 타입.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 타임존
    #[error("알 수 없는 타임존: {0}")]
    InvalidTimezone(String),

    /// 잘못된 세션 시간 범위
    #[error("잘못된 세션 시간: {0}")]
    InvalidSessionWindow(String),

    /// 알 수 없는 데이터셋
    #[error("알 수 없는 데이터셋: {0}")]
    UnknownDataset(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}
