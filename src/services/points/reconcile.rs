//! 积分汇总的增量与对账
//!
//! 本地先按奖励增量乐观更新，随后收到存储端的完整行快照时，
//! 以 `remote - local` 作为班级汇总的修正量。自己的写入修正量为 0，
//! 其他会话的写入则完整计入。

use crate::models::{PeriodWindow, PointTotals};

/// 一次奖励或撤销对汇总的影响
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TotalsDelta(PointTotals);

impl TotalsDelta {
    /// 奖励 `points` 分，`at_ms` 为流水时间
    pub fn award(points: i32, at_ms: i64, periods: &PeriodWindow) -> Self {
        let p = i64::from(points);
        TotalsDelta(PointTotals {
            total: p,
            positive: if p > 0 { p } else { 0 },
            negative: if p < 0 { p } else { 0 },
            today: if periods.is_today(at_ms) { p } else { 0 },
            this_week: if periods.is_this_week(at_ms) { p } else { 0 },
        })
    }

    /// 撤销一条流水，恰好抵消其奖励增量
    pub fn undo(points: i32, at_ms: i64, periods: &PeriodWindow) -> Self {
        -Self::award(points, at_ms, periods)
    }

    pub fn totals(&self) -> PointTotals {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == PointTotals::default()
    }
}

impl std::ops::Neg for TotalsDelta {
    type Output = TotalsDelta;

    fn neg(self) -> Self::Output {
        TotalsDelta(-self.0)
    }
}

impl std::ops::Add for TotalsDelta {
    type Output = TotalsDelta;

    fn add(self, rhs: Self) -> Self::Output {
        TotalsDelta(self.0 + rhs.0)
    }
}

impl std::iter::Sum for TotalsDelta {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(TotalsDelta::default(), |acc, d| acc + d)
    }
}

/// 对账结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    /// 以存储端为准的学生汇总
    pub merged: PointTotals,
    /// 需要叠加到班级汇总上的修正量
    pub classroom_delta: PointTotals,
}

pub fn reconcile(local: &PointTotals, remote: &PointTotals) -> Reconciled {
    Reconciled {
        merged: *remote,
        classroom_delta: *remote - *local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn periods() -> (PeriodWindow, i64) {
        let now = chrono::Utc.with_ymd_and_hms(2024, 3, 6, 10, 0, 0).unwrap();
        (PeriodWindow::containing(now, 0), now.timestamp_millis())
    }

    #[test]
    fn test_award_splits_by_sign_and_period() {
        let (window, now) = periods();
        let plus = TotalsDelta::award(3, now, &window).totals();
        assert_eq!((plus.total, plus.positive, plus.negative), (3, 3, 0));
        assert_eq!((plus.today, plus.this_week), (3, 3));

        let last_month = now - 30 * 86_400_000;
        let minus = TotalsDelta::award(-2, last_month, &window).totals();
        assert_eq!((minus.total, minus.positive, minus.negative), (-2, 0, -2));
        assert_eq!((minus.today, minus.this_week), (0, 0));
    }

    #[test]
    fn test_undo_is_exact_negation() {
        let (window, now) = periods();
        let sum = TotalsDelta::award(5, now, &window) + TotalsDelta::undo(5, now, &window);
        assert!(sum.is_zero());
    }

    #[test]
    fn test_own_write_nets_to_zero() {
        let (window, now) = periods();
        let before = PointTotals {
            total: 10,
            positive: 12,
            negative: -2,
            today: 1,
            this_week: 4,
        };
        let delta = TotalsDelta::award(3, now, &window).totals();
        let optimistic = before + delta;

        // 存储端确认的快照与乐观值一致
        let confirmed = reconcile(&optimistic, &(before + delta));
        assert_eq!(confirmed.classroom_delta, PointTotals::default());
        assert_eq!(confirmed.merged, optimistic);
    }

    #[test]
    fn test_foreign_write_applies_fully() {
        let (window, now) = periods();
        let local = PointTotals::default();
        let delta = TotalsDelta::award(-1, now, &window).totals();
        let result = reconcile(&local, &delta);
        assert_eq!(result.classroom_delta, delta);
    }
}
