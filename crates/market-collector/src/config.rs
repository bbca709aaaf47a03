//! 환경변수 기반 설정 모듈.
//!
//! `.env`/환경변수에서 로드하거나(`from_env`), TOML 파일 + `MARKET__`
//! 환경변수 오버라이드(`from_file`)로 로드합니다.

use crate::error::CollectorError;
use crate::Result;
use market_core::{
    AppConfig, DatabaseConfig, LoggingConfig, ProviderConfig, RefreshConfig, SessionClock,
    SessionConfig,
};
use std::path::Path;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone, Default)]
pub struct CollectorConfig {
    /// 데이터베이스 설정 (URL 없으면 메모리 캐시)
    pub database: DatabaseConfig,
    /// 거래 세션 설정
    pub session: SessionConfig,
    /// 갱신 주기 설정
    pub refresh: RefreshConfig,
    /// 외부 데이터 제공자 설정
    pub providers: ProviderConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = AppConfig::default();

        let config = Self {
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
                max_connections: env_var_parse(
                    "DATABASE_MAX_CONNECTIONS",
                    defaults.database.max_connections,
                ),
            },
            session: SessionConfig {
                timezone: env_var_string("SESSION_TIMEZONE", defaults.session.timezone),
                open_time: env_var_string("SESSION_OPEN_TIME", defaults.session.open_time),
                close_time: env_var_string("SESSION_CLOSE_TIME", defaults.session.close_time),
            },
            refresh: RefreshConfig {
                update_interval_secs: env_var_parse(
                    "UPDATE_INTERVAL_SECS",
                    defaults.refresh.update_interval_secs,
                ),
                daemon_tick_secs: env_var_parse("DAEMON_TICK_SECS", defaults.refresh.daemon_tick_secs),
                movers_limit: env_var_parse("MOVERS_LIMIT", defaults.refresh.movers_limit),
            },
            providers: ProviderConfig {
                yahoo_base_url: env_var_string("YAHOO_BASE_URL", defaults.providers.yahoo_base_url),
                niftytrader_base_url: env_var_string(
                    "NIFTYTRADER_BASE_URL",
                    defaults.providers.niftytrader_base_url,
                ),
                http_timeout_secs: env_var_parse(
                    "HTTP_TIMEOUT_SECS",
                    defaults.providers.http_timeout_secs,
                ),
            },
            logging: LoggingConfig {
                level: env_var_string("LOG_LEVEL", defaults.logging.level),
                format: env_var_string("LOG_FORMAT", defaults.logging.format),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// TOML 파일 + `MARKET__` 환경변수에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::from(AppConfig::load(path)?);
        config.validate()?;
        Ok(config)
    }

    /// 설정된 세션 시계 생성
    pub fn session_clock(&self) -> Result<SessionClock> {
        Ok(SessionClock::from_config(&self.session)?)
    }

    /// 최소 갱신 간격
    pub fn update_interval(&self) -> Duration {
        self.refresh.update_interval()
    }

    fn validate(&self) -> Result<()> {
        self.session_clock()?;

        if self.refresh.daemon_tick_secs == 0 {
            return Err(CollectorError::Config(
                "DAEMON_TICK_SECS는 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

impl From<AppConfig> for CollectorConfig {
    fn from(config: AppConfig) -> Self {
        Self {
            database: config.database,
            session: config.session,
            refresh: config.refresh,
            providers: config.providers,
            logging: config.logging,
        }
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// 환경변수 문자열 (비어 있으면 기본값 사용)
fn env_var_string(key: &str, default: String) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}
