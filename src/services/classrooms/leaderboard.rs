//! 排行榜
//!
//! 按类别分数降序；分数相同时依次按正向积分降序、负向积分绝对值升序、姓名排序。
//! 分数相同的学生名次相同（1, 1, 3）。

use std::cmp::Ordering;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::error;

use super::ClassroomService;
use crate::middlewares::RequireClassroomOwner;
use crate::models::classrooms::entities::LeaderboardCategory;
use crate::models::classrooms::requests::LeaderboardQuery;
use crate::models::classrooms::responses::{LeaderboardEntry, LeaderboardResponse};
use crate::models::students::entities::Student;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::classroom_context_missing;
use crate::services::points::current_window;

/// 正负比：positive / max(1, |negative|)
pub fn ratio(positive: i64, negative: i64) -> f64 {
    positive as f64 / negative.abs().max(1) as f64
}

pub fn score(student: &Student, category: LeaderboardCategory) -> f64 {
    match category {
        LeaderboardCategory::Total => student.point_total as f64,
        LeaderboardCategory::Positive => student.positive_total as f64,
        LeaderboardCategory::Negative => student.negative_total.abs() as f64,
        LeaderboardCategory::Today => student.today_total as f64,
        LeaderboardCategory::Week => student.this_week_total as f64,
        LeaderboardCategory::Ratio => ratio(student.positive_total, student.negative_total),
    }
}

fn compare(a: &Student, b: &Student, category: LeaderboardCategory) -> Ordering {
    score(b, category)
        .total_cmp(&score(a, category))
        .then_with(|| b.positive_total.cmp(&a.positive_total))
        .then_with(|| a.negative_total.abs().cmp(&b.negative_total.abs()))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

pub fn rank_students(
    students: &[Student],
    category: LeaderboardCategory,
    limit: Option<usize>,
) -> Vec<LeaderboardEntry> {
    let mut sorted: Vec<&Student> = students.iter().collect();
    sorted.sort_by(|a, b| compare(a, b, category));

    let mut entries: Vec<LeaderboardEntry> = Vec::with_capacity(sorted.len());
    for (index, student) in sorted.into_iter().enumerate() {
        let value = score(student, category);
        let rank = match entries.last() {
            Some(prev) if prev.score == value => prev.rank,
            _ => index + 1,
        };
        entries.push(LeaderboardEntry {
            rank,
            student_id: student.id.clone(),
            name: student.name.clone(),
            score: value,
            totals: student.totals(),
        });
    }

    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}

pub async fn get_leaderboard(
    service: &ClassroomService,
    request: &HttpRequest,
    query: LeaderboardQuery,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };

    match storage.list_students(&classroom.id, current_window()).await {
        Ok(students) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            LeaderboardResponse {
                category: query.category,
                entries: rank_students(&students, query.category, query.limit),
            },
            "Leaderboard retrieved successfully",
        ))),
        Err(e) => {
            error!("Failed to build leaderboard for {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Failed to load leaderboard: {e}"),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, positive: i64, negative: i64) -> Student {
        Student {
            id: name.to_lowercase(),
            classroom_id: "c1".to_string(),
            name: name.to_string(),
            avatar_color: None,
            point_total: positive + negative,
            positive_total: positive,
            negative_total: negative,
            today_total: 0,
            this_week_total: 0,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_ratio_divisor_floor() {
        assert_eq!(ratio(6, 0), 6.0);
        assert_eq!(ratio(6, -3), 2.0);
        assert_eq!(ratio(0, -4), 0.0);
    }

    #[test]
    fn test_total_with_tiebreakers() {
        let students = vec![
            student("Cleo", 5, 0),
            student("Ben", 7, -2),
            student("Ada", 5, 0),
            student("Dan", 1, 0),
        ];
        let ranked = rank_students(&students, LeaderboardCategory::Total, None);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Ben", "Ada", "Cleo", "Dan"]);
        let ranks: Vec<usize> = ranked.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 1, 1, 4]);
    }

    #[test]
    fn test_ratio_and_negative_categories() {
        let students = vec![student("A", 6, -3), student("B", 4, 0), student("C", 9, -9)];
        let ratio_rank = rank_students(&students, LeaderboardCategory::Ratio, Some(2));
        assert_eq!(ratio_rank.len(), 2);
        assert_eq!(ratio_rank[0].name, "B");
        assert_eq!(ratio_rank[0].score, 4.0);
        assert_eq!(ratio_rank[1].name, "A");

        let negative = rank_students(&students, LeaderboardCategory::Negative, None);
        assert_eq!(negative[0].name, "C");
        assert_eq!(negative[0].score, 9.0);
    }
}
