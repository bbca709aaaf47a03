//! 거래 세션 시계.
//!
//! 호스트 타임존과 무관하게 설정된 타임존(기본 Asia/Kolkata) 기준으로
//! 시장 개장 여부와 다음 개장까지 남은 시간을 계산합니다.
//!
//! - 토/일요일은 항상 휴장
//! - 평일은 `open_time <= 현지 시각 <= close_time` 일 때 개장 (양끝 포함)

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::config::SessionConfig;
use crate::error::{CoreError, CoreResult};

/// 다음 개장일 탐색 최대 일수.
const MAX_SCAN_DAYS: u32 = 7;

/// NSE 개장 시각 (09:15).
const NSE_OPEN: NaiveTime = match NaiveTime::from_hms_opt(9, 15, 0) {
    Some(time) => time,
    None => panic!("invalid NSE open time"),
};

/// NSE 마감 시각 (15:30).
const NSE_CLOSE: NaiveTime = match NaiveTime::from_hms_opt(15, 30, 0) {
    Some(time) => time,
    None => panic!("invalid NSE close time"),
};

/// 거래 세션 시계.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    timezone: Tz,
    open_time: NaiveTime,
    close_time: NaiveTime,
}

impl SessionClock {
    /// 새 세션 시계 생성.
    ///
    /// `open_time`이 `close_time`보다 늦으면 에러를 반환합니다.
    pub fn new(timezone: Tz, open_time: NaiveTime, close_time: NaiveTime) -> CoreResult<Self> {
        if open_time > close_time {
            return Err(CoreError::InvalidSessionWindow(format!(
                "{} > {}",
                open_time, close_time
            )));
        }

        Ok(Self {
            timezone,
            open_time,
            close_time,
        })
    }

    /// NSE 현물 시장 기본값 (Asia/Kolkata 09:15-15:30).
    pub fn nse() -> Self {
        Self {
            timezone: chrono_tz::Asia::Kolkata,
            open_time: NSE_OPEN,
            close_time: NSE_CLOSE,
        }
    }

    /// 설정에서 세션 시계 생성.
    pub fn from_config(config: &SessionConfig) -> CoreResult<Self> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| CoreError::InvalidTimezone(config.timezone.clone()))?;
        let open_time = parse_time(&config.open_time)?;
        let close_time = parse_time(&config.close_time)?;

        Self::new(timezone, open_time, close_time)
    }

    /// 세션 타임존.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// 개장 시각.
    pub fn open_time(&self) -> NaiveTime {
        self.open_time
    }

    /// 마감 시각.
    pub fn close_time(&self) -> NaiveTime {
        self.close_time
    }

    /// UTC 시각을 세션 타임존으로 변환.
    pub fn to_local(&self, now: DateTime<Utc>) -> DateTime<Tz> {
        now.with_timezone(&self.timezone)
    }

    /// 거래일(월~금) 여부.
    pub fn is_trading_day(date: NaiveDate) -> bool {
        !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// 시장 개장 여부.
    pub fn is_open(&self, now: DateTime<Utc>) -> bool {
        let local = self.to_local(now);

        if !Self::is_trading_day(local.date_naive()) {
            return false;
        }

        let time = local.time();
        self.open_time <= time && time <= self.close_time
    }

    /// 다음 개장까지 남은 초.
    ///
    /// 세션 진행 중이면 0을 반환합니다. 마감 시각 정각은 세션이 끝난
    /// 것으로 보고 다음 거래일 개장까지의 시간을 계산합니다.
    pub fn seconds_until_open(&self, now: DateTime<Utc>) -> u64 {
        let local = self.to_local(now);
        let today = local.date_naive();
        let time = local.time();

        if self.is_open(now) && time < self.close_time {
            return 0;
        }

        // 오늘 개장 전
        if Self::is_trading_day(today) && time < self.open_time {
            return seconds_between(now, self.open_at(today));
        }

        // 다음 거래일 탐색
        let mut date = today;
        for _ in 0..MAX_SCAN_DAYS {
            let Some(next) = date.succ_opt() else {
                break;
            };
            date = next;

            if Self::is_trading_day(date) {
                return seconds_between(now, self.open_at(date));
            }
        }

        0
    }

    /// 특정 날짜의 개장 시각 (UTC).
    fn open_at(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date.and_time(self.open_time);

        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // DST 갭: 존재하지 않는 현지 시각은 한 시간 뒤로 민다
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|| naive.and_utc()),
        }
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::nse()
    }
}

/// "HH:MM" 또는 "HH:MM:SS" 형식 파싱.
fn parse_time(value: &str) -> CoreResult<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|e| CoreError::InvalidSessionWindow(format!("{}: {}", value, e)))
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    (to - from).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// IST 현지 시각을 UTC로 변환.
    fn ist(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        chrono_tz::Asia::Kolkata
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_weekend_is_closed() {
        let clock = SessionClock::nse();
        // 2024-06-15 토요일, 2024-06-16 일요일
        assert!(!clock.is_open(ist(2024, 6, 15, 10, 0, 0)));
        assert!(!clock.is_open(ist(2024, 6, 16, 12, 0, 0)));
    }

    #[test]
    fn test_open_window_is_inclusive() {
        let clock = SessionClock::nse();
        // 2024-06-14 금요일
        assert!(!clock.is_open(ist(2024, 6, 14, 9, 14, 59)));
        assert!(clock.is_open(ist(2024, 6, 14, 9, 15, 0)));
        assert!(clock.is_open(ist(2024, 6, 14, 15, 30, 0)));
        assert!(!clock.is_open(ist(2024, 6, 14, 15, 30, 1)));
    }

    #[test]
    fn test_evaluated_in_session_timezone() {
        let clock = SessionClock::nse();
        // 04:00 UTC = 09:30 IST
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 4, 0, 0).unwrap();
        assert!(clock.is_open(now));
        // 11:00 UTC = 16:30 IST
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 11, 0, 0).unwrap();
        assert!(!clock.is_open(now));
    }

    #[test]
    fn test_seconds_until_open_while_open() {
        let clock = SessionClock::nse();
        assert_eq!(clock.seconds_until_open(ist(2024, 6, 14, 11, 0, 0)), 0);
    }

    #[test]
    fn test_seconds_until_open_before_open() {
        let clock = SessionClock::nse();
        assert_eq!(clock.seconds_until_open(ist(2024, 6, 14, 9, 0, 0)), 15 * 60);
    }

    #[test]
    fn test_seconds_until_open_friday_close_goes_to_monday() {
        let clock = SessionClock::nse();
        let now = ist(2024, 6, 14, 15, 30, 0);
        let monday_open = ist(2024, 6, 17, 9, 15, 0);
        assert_eq!(
            clock.seconds_until_open(now),
            (monday_open - now).num_seconds() as u64
        );
    }

    #[test]
    fn test_seconds_until_open_from_saturday_morning() {
        let clock = SessionClock::nse();
        let now = ist(2024, 6, 15, 8, 0, 0);
        let monday_open = ist(2024, 6, 17, 9, 15, 0);
        assert_eq!(
            clock.seconds_until_open(now),
            (monday_open - now).num_seconds() as u64
        );
    }

    #[test]
    fn test_from_config_rejects_bad_values() {
        let mut config = SessionConfig::default();
        config.timezone = "Mars/Olympus".to_string();
        assert!(matches!(
            SessionClock::from_config(&config),
            Err(CoreError::InvalidTimezone(_))
        ));

        let mut config = SessionConfig::default();
        config.open_time = "16:00".to_string();
        assert!(matches!(
            SessionClock::from_config(&config),
            Err(CoreError::InvalidSessionWindow(_))
        ));
    }

    #[test]
    fn test_from_config_defaults_match_nse() {
        let clock = SessionClock::from_config(&SessionConfig::default()).unwrap();
        assert_eq!(clock, SessionClock::nse());
        assert_eq!(clock.open_time().format("%H:%M").to_string(), "09:15");
        assert_eq!(clock.close_time().format("%H:%M").to_string(), "15:30");
    }
}
