//! 座位分配规划

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::presets::entities::{PresetElement, PresetGroup, PresetLayout};
use crate::models::seating::entities::SeatingChart;

/// 随机排座的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatPlan {
    /// (座位 id, 学生 id)
    pub assignments: Vec<(String, String)>,
    /// 座位不足时剩下的学生
    pub unseated: Vec<String>,
}

/// 打乱学生顺序后按 (组字母, 座位位置) 依次入座
pub fn plan_random_seating<R: Rng + ?Sized>(
    chart: &SeatingChart,
    student_ids: &[String],
    rng: &mut R,
) -> SeatPlan {
    let mut shuffled = student_ids.to_vec();
    shuffled.shuffle(rng);

    let seats = chart.ordered_seat_ids();
    let seated = shuffled.len().min(seats.len());
    let unseated = shuffled.split_off(seated);

    SeatPlan {
        assignments: seats.into_iter().zip(shuffled).collect(),
        unseated,
    }
}

/// 学生当前所在的座位
pub fn current_seat_of<'a>(chart: &'a SeatingChart, student_id: &str) -> Option<&'a str> {
    chart
        .groups
        .iter()
        .flat_map(|g| g.seats.iter())
        .find(|s| s.student_id.as_deref() == Some(student_id))
        .map(|s| s.id.as_str())
}

/// 下一个未被使用的组字母（A..Z）
pub fn next_group_letter(chart: &SeatingChart, max_groups: usize) -> Option<String> {
    ('A'..='Z')
        .take(max_groups.min(26))
        .map(|c| c.to_string())
        .find(|letter| chart.groups.iter().all(|g| &g.letter != letter))
}

/// 提取布局快照，不带座位分配
pub fn capture_layout(chart: &SeatingChart) -> PresetLayout {
    let mut groups: Vec<PresetGroup> = chart
        .groups
        .iter()
        .map(|g| PresetGroup {
            letter: g.letter.clone(),
            x: g.x,
            y: g.y,
            rotation: g.rotation,
        })
        .collect();
    groups.sort_by(|a, b| a.letter.cmp(&b.letter));

    PresetLayout {
        canvas_width: chart.canvas_width,
        canvas_height: chart.canvas_height,
        grid_size: chart.grid_size,
        groups,
        elements: chart
            .elements
            .iter()
            .map(|e| PresetElement {
                kind: e.kind,
                label: e.label.clone(),
                x: e.x,
                y: e.y,
                width: e.width,
                height: e.height,
                rotation: e.rotation,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seating::entities::{SeatingGroup, SeatingSeat};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn chart(letters: &[&str]) -> SeatingChart {
        let groups = letters
            .iter()
            .map(|letter| SeatingGroup {
                id: format!("g{letter}"),
                chart_id: "chart".to_string(),
                letter: letter.to_string(),
                x: 0.0,
                y: 0.0,
                rotation: 0,
                seats: (0..4)
                    .rev()
                    .map(|p| SeatingSeat {
                        id: format!("{letter}{p}"),
                        group_id: format!("g{letter}"),
                        position: p,
                        student_id: None,
                    })
                    .collect(),
            })
            .collect();
        SeatingChart {
            id: "chart".to_string(),
            classroom_id: "c1".to_string(),
            canvas_width: 1600.0,
            canvas_height: 1200.0,
            grid_size: 40.0,
            snap_enabled: true,
            groups,
            elements: vec![],
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn students(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("s{i}")).collect()
    }

    #[test]
    fn test_random_fills_seats_in_letter_order() {
        let chart = chart(&["B", "A"]);
        let mut rng = StdRng::seed_from_u64(7);
        let plan = plan_random_seating(&chart, &students(5), &mut rng);

        let seats: Vec<&str> = plan.assignments.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(seats, vec!["A0", "A1", "A2", "A3", "B0"]);
        assert!(plan.unseated.is_empty());
        let unique: HashSet<&String> = plan.assignments.iter().map(|(_, s)| s).collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_random_reports_unseated() {
        let chart = chart(&["A"]);
        let mut rng = StdRng::seed_from_u64(1);
        let plan = plan_random_seating(&chart, &students(6), &mut rng);
        assert_eq!(plan.assignments.len(), 4);
        assert_eq!(plan.unseated.len(), 2);

        let mut all: Vec<String> = plan
            .assignments
            .iter()
            .map(|(_, s)| s.clone())
            .chain(plan.unseated.clone())
            .collect();
        all.sort();
        assert_eq!(all, students(6));
    }

    #[test]
    fn test_next_letter_fills_gaps() {
        let chart = chart(&["A", "C"]);
        assert_eq!(next_group_letter(&chart, 26).as_deref(), Some("B"));
        assert_eq!(next_group_letter(&chart, 1), None);
    }

    #[test]
    fn test_capture_layout_drops_students() {
        let mut chart = chart(&["A"]);
        chart.groups[0].seats[0].student_id = Some("s1".to_string());
        assert_eq!(current_seat_of(&chart, "s1"), Some("A3"));

        let layout = capture_layout(&chart);
        assert_eq!(layout.groups.len(), 1);
        let json = serde_json::to_string(&layout).unwrap();
        assert!(!json.contains("s1"));
    }
}
