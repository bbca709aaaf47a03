//! 데이터셋 갱신 오케스트레이터.
//!
//! 최소 갱신 간격 이내의 호출은 아무것도 하지 않습니다. 간격이 지나면
//! 고정 순서(`indices → movers → global → fii_dii → ipos`)로 데이터셋을
//! 하나씩 순차 갱신하며, 한 데이터셋의 실패는 기록만 하고 다음
//! 데이터셋으로 진행합니다.

use chrono::{DateTime, Datelike, Utc};
use market_core::CacheKey;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::report::{CycleReport, DatasetStatus, RefreshOutcome, SessionStatus};
use crate::service::MarketDataService;
use crate::state::RefreshState;

/// FII/DII 갱신일 (세션 타임존 기준 매월 1일).
const MONTHLY_REFRESH_DAY: u32 = 1;

/// 갱신 오케스트레이터.
pub struct RefreshOrchestrator {
    service: MarketDataService,
    state: RefreshState,
}

impl RefreshOrchestrator {
    /// 새 오케스트레이터 생성 (아직 갱신 이력 없음).
    pub fn new(service: MarketDataService, update_interval: Duration) -> Self {
        Self {
            service,
            state: RefreshState::new(update_interval),
        }
    }

    /// 읽기 API 서비스.
    pub fn service(&self) -> &MarketDataService {
        &self.service
    }

    /// 현재 갱신 상태.
    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    /// 현재 시각 기준 갱신 사이클 실행.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        self.refresh_at(Utc::now()).await
    }

    /// 주어진 시각 기준 갱신 사이클 실행.
    ///
    /// 사이클이 끝나면 데이터셋별 실패와 관계없이 마지막 갱신 시각을
    /// `now`로 옮깁니다.
    #[instrument(skip(self))]
    pub async fn refresh_at(&mut self, now: DateTime<Utc>) -> RefreshOutcome {
        if !self.state.is_due(now) {
            let remaining = self.state.remaining(now);
            debug!(remaining_secs = remaining.as_secs(), "갱신 주기 전, 건너뜀");
            return RefreshOutcome::NotDue { remaining };
        }

        let started = Instant::now();
        let session = SessionStatus::at(self.service.session(), now);
        info!(
            market_open = session.is_open,
            seconds_until_open = session.seconds_until_open,
            "=== 갱신 사이클 시작 ==="
        );

        let mut report = CycleReport::new(now, session);
        for key in CacheKey::REFRESH_ORDER {
            let status = self.refresh_dataset(key, now).await;
            report.record(key, status);
        }

        report.elapsed = started.elapsed();
        self.state.mark_refreshed(now);
        report.log_summary();

        RefreshOutcome::Completed(report)
    }

    /// 데이터셋 하나 갱신. 에러는 상태로 변환되며 전파되지 않습니다.
    async fn refresh_dataset(&self, key: CacheKey, now: DateTime<Utc>) -> DatasetStatus {
        if key.is_monthly() {
            let day = self.service.session().to_local(now).day();
            if day != MONTHLY_REFRESH_DAY {
                debug!(dataset = %key, day, "월간 데이터셋, 갱신일 아님");
                return DatasetStatus::Skipped(format!(
                    "매월 {}일에만 갱신",
                    MONTHLY_REFRESH_DAY
                ));
            }
        }

        let payload = match self.service.build_payload(key, now).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                warn!(dataset = %key, "조회 결과 없음, 기존 캐시 유지");
                return DatasetStatus::Empty;
            }
            Err(e) => {
                warn!(dataset = %key, error = %e, "데이터셋 조회 실패");
                return DatasetStatus::Failed(e.to_string());
            }
        };

        match self.service.store().put(key, &payload).await {
            Ok(()) => {
                info!(dataset = %key, "데이터셋 갱신 완료");
                DatasetStatus::Updated
            }
            Err(e) => {
                warn!(dataset = %key, error = %e, "캐시 저장 실패");
                DatasetStatus::Failed(e.to_string())
            }
        }
    }
}
