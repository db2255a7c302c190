//! 积分汇总引擎：增量、对账、实时视图与撤销窗口

pub mod commit;
pub mod live_totals;
pub mod reconcile;
pub mod undo_window;

pub use commit::{commit_award, commit_undo, resync_classroom};
pub use live_totals::{EventOutcome, LiveTotals};
pub use reconcile::{Reconciled, TotalsDelta, reconcile};
pub use undo_window::{UndoUnit, find_undoable};

use crate::config::AppConfig;
use crate::models::PeriodWindow;

/// 按配置的时区偏移计算当前的日/周范围
pub fn current_window() -> PeriodWindow {
    PeriodWindow::containing(
        chrono::Utc::now(),
        AppConfig::get().points.utc_offset_minutes,
    )
}
