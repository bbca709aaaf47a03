//! 갱신 사이클 결과 보고서.

use chrono::{DateTime, Utc};
use market_core::{CacheKey, SessionClock};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// 데이터셋 하나의 갱신 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum DatasetStatus {
    /// 캐시에 새 값 저장
    Updated,
    /// 이번 사이클에서 대상 아님
    Skipped(String),
    /// 조회 성공, 데이터 없음 (기존 캐시 유지)
    Empty,
    /// 조회 또는 저장 실패
    Failed(String),
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Updated => write!(f, "updated"),
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Empty => write!(f, "empty"),
            Self::Failed(error) => write!(f, "failed ({})", error),
        }
    }
}

/// 데이터셋별 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetOutcome {
    pub key: CacheKey,
    #[serde(flatten)]
    pub status: DatasetStatus,
}

/// 사이클 시점의 거래 세션 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    /// 시장 개장 여부
    pub is_open: bool,
    /// 다음 개장까지 남은 초 (세션 진행 중이면 0)
    pub seconds_until_open: u64,
}

impl SessionStatus {
    /// 주어진 시각의 세션 상태
    pub fn at(clock: &SessionClock, now: DateTime<Utc>) -> Self {
        Self {
            is_open: clock.is_open(now),
            seconds_until_open: clock.seconds_until_open(now),
        }
    }
}

/// 갱신 사이클 보고서
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// 사이클 기준 시각
    pub started_at: DateTime<Utc>,
    /// 세션 상태
    pub session: SessionStatus,
    /// 데이터셋별 결과 (갱신 순서)
    pub outcomes: Vec<DatasetOutcome>,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CycleReport {
    /// 빈 보고서 생성
    pub fn new(started_at: DateTime<Utc>, session: SessionStatus) -> Self {
        Self {
            started_at,
            session,
            outcomes: Vec::with_capacity(CacheKey::REFRESH_ORDER.len()),
            elapsed: Duration::ZERO,
        }
    }

    /// 데이터셋 결과 기록
    pub fn record(&mut self, key: CacheKey, status: DatasetStatus) {
        self.outcomes.push(DatasetOutcome { key, status });
    }

    /// 특정 데이터셋의 결과
    pub fn status(&self, key: CacheKey) -> Option<&DatasetStatus> {
        self.outcomes
            .iter()
            .find(|o| o.key == key)
            .map(|o| &o.status)
    }

    pub fn updated(&self) -> usize {
        self.count(|s| matches!(s, DatasetStatus::Updated))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DatasetStatus::Skipped(_)))
    }

    pub fn empty(&self) -> usize {
        self.count(|s| matches!(s, DatasetStatus::Empty))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DatasetStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&DatasetStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self) {
        for outcome in &self.outcomes {
            match &outcome.status {
                DatasetStatus::Failed(error) => {
                    tracing::warn!(dataset = %outcome.key, error = %error, "데이터셋 갱신 실패");
                }
                status => {
                    tracing::debug!(dataset = %outcome.key, status = %status, "데이터셋 갱신 결과");
                }
            }
        }

        tracing::info!(
            total = self.outcomes.len(),
            updated = self.updated(),
            skipped = self.skipped(),
            empty = self.empty(),
            failed = self.failed(),
            market_open = self.session.is_open,
            seconds_until_open = self.session.seconds_until_open,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "갱신 사이클 완료"
        );
    }
}

/// `refresh` 호출 결과
#[derive(Debug, Clone)]
pub enum RefreshOutcome {
    /// 최소 갱신 간격 이내 (아무것도 하지 않음)
    NotDue { remaining: Duration },
    /// 사이클 실행 완료
    Completed(CycleReport),
}

impl RefreshOutcome {
    /// 사이클이 실행되었는지 여부
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// 실행된 사이클의 보고서
    pub fn report(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::NotDue { .. } => None,
        }
    }
}
