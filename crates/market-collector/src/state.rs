//! 갱신 주기 상태.

use chrono::{DateTime, Utc};
use std::time::Duration;

/// 마지막 갱신 시각과 최소 갱신 간격.
///
/// 오케스트레이터 인스턴스 하나가 소유하며 프로세스 간에 공유되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshState {
    last_update: Option<DateTime<Utc>>,
    update_interval: Duration,
}

impl RefreshState {
    /// 한 번도 갱신되지 않은 상태로 생성
    pub fn new(update_interval: Duration) -> Self {
        Self {
            last_update: None,
            update_interval,
        }
    }

    /// 마지막 갱신 시각
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// 최소 갱신 간격
    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// 마지막 갱신 이후 경과 시간.
    ///
    /// 시계가 뒤로 간 경우 0으로 봅니다.
    fn elapsed(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.last_update
            .map(|last| (now - last).to_std().unwrap_or(Duration::ZERO))
    }

    /// 갱신 시점 도래 여부
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.elapsed(now) {
            Some(elapsed) => elapsed >= self.update_interval,
            None => true,
        }
    }

    /// 다음 갱신까지 남은 시간
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        match self.elapsed(now) {
            Some(elapsed) => self.update_interval.saturating_sub(elapsed),
            None => Duration::ZERO,
        }
    }

    /// 사이클 완료 기록
    pub fn mark_refreshed(&mut self, now: DateTime<Utc>) {
        self.last_update = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 14, 4, 0, 0).unwrap() + chrono::Duration::seconds(secs)
    }

    #[test]
    fn test_never_refreshed_is_due() {
        let state = RefreshState::new(Duration::from_secs(300));
        assert!(state.is_due(at(0)));
        assert_eq!(state.remaining(at(0)), Duration::ZERO);
    }

    #[test]
    fn test_interval_gate() {
        let mut state = RefreshState::new(Duration::from_secs(300));
        state.mark_refreshed(at(0));

        assert!(!state.is_due(at(299)));
        assert_eq!(state.remaining(at(200)), Duration::from_secs(100));
        assert!(state.is_due(at(300)));
        assert_eq!(state.remaining(at(400)), Duration::ZERO);
    }

    #[test]
    fn test_clock_going_backwards_is_not_due() {
        let mut state = RefreshState::new(Duration::from_secs(300));
        state.mark_refreshed(at(100));

        assert!(!state.is_due(at(0)));
        assert_eq!(state.remaining(at(0)), Duration::from_secs(300));
    }
}
