//! 撤销窗口
//!
//! 只有最近一次写入可以撤销：单条流水，或同一 batch_id 的整批流水。
//! 超过窗口期后不再可撤销。

use chrono::{DateTime, Duration, Utc};

use crate::models::transactions::entities::PointTransaction;

/// 一次可撤销的写入
#[derive(Debug, Clone, PartialEq)]
pub struct UndoUnit {
    pub transactions: Vec<PointTransaction>,
    pub batch_id: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl UndoUnit {
    pub fn ids(&self) -> Vec<String> {
        self.transactions.iter().map(|tx| tx.id.clone()).collect()
    }

    pub fn points(&self) -> i64 {
        self.transactions.iter().map(|tx| i64::from(tx.points)).sum()
    }

    pub fn expires_in_ms(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_milliseconds().max(0)
    }
}

/// 在 `transactions` 中查找当前可撤销的写入
pub fn find_undoable(
    transactions: &[PointTransaction],
    now: DateTime<Utc>,
    window: Duration,
) -> Option<UndoUnit> {
    let latest = transactions.iter().max_by_key(|tx| tx.created_at)?;
    let expires_at = latest.created_at + window;
    if now > expires_at || latest.created_at > now + window {
        return None;
    }

    let mut unit: Vec<PointTransaction> = match &latest.batch_id {
        Some(batch_id) => transactions
            .iter()
            .filter(|tx| tx.batch_id.as_deref() == Some(batch_id.as_str()))
            .cloned()
            .collect(),
        None => vec![latest.clone()],
    };
    unit.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Some(UndoUnit {
        transactions: unit,
        batch_id: latest.batch_id.clone(),
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(id: &str, points: i32, batch: Option<&str>, at: DateTime<Utc>) -> PointTransaction {
        PointTransaction {
            id: id.to_string(),
            student_id: format!("student-{id}"),
            classroom_id: "c1".to_string(),
            behavior_id: None,
            behavior_name: "Helping others".to_string(),
            behavior_icon: "🤝".to_string(),
            points,
            note: None,
            batch_id: batch.map(str::to_string),
            created_at: at,
        }
    }

    #[test]
    fn test_latest_single_within_window() {
        let now = Utc::now();
        let txs = vec![
            tx("old", 1, None, now - Duration::seconds(30)),
            tx("new", 3, None, now - Duration::seconds(4)),
        ];
        let unit = find_undoable(&txs, now, Duration::seconds(10)).unwrap();
        assert_eq!(unit.ids(), vec!["new".to_string()]);
        assert_eq!(unit.points(), 3);
        assert_eq!(unit.expires_in_ms(now), 6000);
    }

    #[test]
    fn test_batch_is_one_unit() {
        let now = Utc::now();
        let at = now - Duration::seconds(2);
        let txs = vec![
            tx("a", 2, Some("b1"), at),
            tx("b", 2, Some("b1"), at),
            tx("c", 2, Some("b1"), at + Duration::milliseconds(1)),
            tx("solo", 5, None, now - Duration::seconds(5)),
        ];
        let unit = find_undoable(&txs, now, Duration::seconds(10)).unwrap();
        assert_eq!(unit.batch_id.as_deref(), Some("b1"));
        assert_eq!(unit.transactions.len(), 3);
        assert_eq!(unit.points(), 6);
    }

    #[test]
    fn test_expired_or_empty() {
        let now = Utc::now();
        let txs = vec![tx("late", 1, None, now - Duration::seconds(11))];
        assert!(find_undoable(&txs, now, Duration::seconds(10)).is_none());
        assert!(find_undoable(&[], now, Duration::seconds(10)).is_none());
    }
}
