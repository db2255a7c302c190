use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 积分汇总（学生或班级）
///
/// `today`/`this_week` 只统计落在当前日/周内的流水，其余字段为累计值。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "points.ts")]
pub struct PointTotals {
    pub total: i64,
    pub positive: i64,
    pub negative: i64,
    pub today: i64,
    pub this_week: i64,
}

impl std::ops::Add for PointTotals {
    type Output = PointTotals;

    fn add(self, rhs: Self) -> Self::Output {
        PointTotals {
            total: self.total + rhs.total,
            positive: self.positive + rhs.positive,
            negative: self.negative + rhs.negative,
            today: self.today + rhs.today,
            this_week: self.this_week + rhs.this_week,
        }
    }
}

impl std::ops::Sub for PointTotals {
    type Output = PointTotals;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Neg for PointTotals {
    type Output = PointTotals;

    fn neg(self) -> Self::Output {
        PointTotals {
            total: -self.total,
            positive: -self.positive,
            negative: -self.negative,
            today: -self.today,
            this_week: -self.this_week,
        }
    }
}

impl std::ops::AddAssign for PointTotals {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

const DAY_MS: i64 = 86_400_000;

/// 当前"今天"与"本周"的时间范围（毫秒时间戳，周一为一周起点）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodWindow {
    pub day_start_ms: i64,
    pub week_start_ms: i64,
}

impl PeriodWindow {
    pub fn containing(now: chrono::DateTime<chrono::Utc>, utc_offset_minutes: i32) -> Self {
        let offset_ms = i64::from(utc_offset_minutes) * 60_000;
        let local_ms = now.timestamp_millis() + offset_ms;
        let days = local_ms.div_euclid(DAY_MS);
        // 1970-01-01 是周四
        let since_monday = (days + 3).rem_euclid(7);

        Self {
            day_start_ms: days * DAY_MS - offset_ms,
            week_start_ms: (days - since_monday) * DAY_MS - offset_ms,
        }
    }

    pub fn is_today(&self, at_ms: i64) -> bool {
        at_ms >= self.day_start_ms && at_ms < self.day_start_ms + DAY_MS
    }

    pub fn is_this_week(&self, at_ms: i64) -> bool {
        at_ms >= self.week_start_ms && at_ms < self.week_start_ms + 7 * DAY_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_totals_arithmetic() {
        let a = PointTotals {
            total: 5,
            positive: 7,
            negative: -2,
            today: 3,
            this_week: 5,
        };
        assert_eq!(a - a, PointTotals::default());
        assert_eq!((a + a).negative, -4);
    }

    #[test]
    fn test_week_starts_on_monday() {
        // 2024-01-03 是周三
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 3, 15, 30, 0).unwrap();
        let window = PeriodWindow::containing(now, 0);
        let monday = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let today = chrono::Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert_eq!(window.week_start_ms, monday.timestamp_millis());
        assert_eq!(window.day_start_ms, today.timestamp_millis());
        assert!(window.is_today(now.timestamp_millis()));
        assert!(!window.is_today(monday.timestamp_millis()));
        assert!(window.is_this_week(monday.timestamp_millis()));
        assert!(!window.is_this_week(monday.timestamp_millis() - 1));
    }

    #[test]
    fn test_utc_offset_shifts_day() {
        // UTC 周一 23:00，在 +120 分钟时区已是周二 01:00
        let now = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 23, 0, 0).unwrap();
        let window = PeriodWindow::containing(now, 120);
        let local_tuesday = chrono::Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 0).unwrap();
        assert_eq!(window.day_start_ms, local_tuesday.timestamp_millis());
        assert!(!window.is_today(now.timestamp_millis() - 2 * 3_600_000));
    }
}
