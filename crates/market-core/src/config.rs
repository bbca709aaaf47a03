//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 파일(TOML)과 `MARKET__` 접두사 환경 변수에서 로드합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::CoreResult;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 데이터베이스 설정
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 거래 세션 설정
    #[serde(default)]
    pub session: SessionConfig,
    /// 갱신 주기 설정
    #[serde(default)]
    pub refresh: RefreshConfig,
    /// 외부 데이터 제공자 설정
    #[serde(default)]
    pub providers: ProviderConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// 연결 URL (없으면 메모리 캐시 사용)
    #[serde(default)]
    pub url: Option<String>,
    /// 최대 연결 수
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// 거래 세션 설정.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// IANA 타임존 이름
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// 개장 시각 (HH:MM)
    #[serde(default = "default_open_time")]
    pub open_time: String,
    /// 마감 시각 (HH:MM)
    #[serde(default = "default_close_time")]
    pub close_time: String,
}

fn default_timezone() -> String {
    "Asia/Kolkata".to_string()
}
fn default_open_time() -> String {
    "09:15".to_string()
}
fn default_close_time() -> String {
    "15:30".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            open_time: default_open_time(),
            close_time: default_close_time(),
        }
    }
}

/// 갱신 주기 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// 최소 갱신 간격 (초)
    #[serde(default = "default_update_interval")]
    pub update_interval_secs: u64,
    /// 데몬 모드 틱 간격 (초)
    #[serde(default = "default_daemon_tick")]
    pub daemon_tick_secs: u64,
    /// 상승/하락 상위 종목 수
    #[serde(default = "default_movers_limit")]
    pub movers_limit: usize,
}

fn default_update_interval() -> u64 {
    300 // 5 minutes
}
fn default_daemon_tick() -> u64 {
    60
}
fn default_movers_limit() -> usize {
    5
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: default_update_interval(),
            daemon_tick_secs: default_daemon_tick(),
            movers_limit: default_movers_limit(),
        }
    }
}

impl RefreshConfig {
    /// 최소 갱신 간격을 Duration으로 반환
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    /// 데몬 틱 간격을 Duration으로 반환
    pub fn daemon_tick(&self) -> Duration {
        Duration::from_secs(self.daemon_tick_secs)
    }
}

/// 외부 데이터 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Yahoo Finance 기본 URL
    #[serde(default = "default_yahoo_url")]
    pub yahoo_base_url: String,
    /// NiftyTrader 기본 URL (FII/DII, IPO)
    #[serde(default = "default_niftytrader_url")]
    pub niftytrader_base_url: String,
    /// HTTP 요청 타임아웃 (초)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
}

fn default_yahoo_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}
fn default_niftytrader_url() -> String {
    "https://webapi.niftytrader.in".to_string()
}
fn default_http_timeout() -> u64 {
    15
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: default_yahoo_url(),
            niftytrader_base_url: default_niftytrader_url(),
            http_timeout_secs: default_http_timeout(),
        }
    }
}

impl ProviderConfig {
    /// HTTP 타임아웃을 Duration으로 반환
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("MARKET")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> CoreResult<Self> {
        Self::load("config/default.toml")
    }
}
