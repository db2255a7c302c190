//! 班级 CSV 导出
//!
//! 文件由两段组成：`=== STUDENTS ===` 学生汇总，空行，`=== POINT HISTORY ===` 积分流水（新到旧）。

use std::collections::HashMap;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use chrono::{FixedOffset, NaiveDate, Offset, Utc};
use tracing::error;

use super::ClassroomService;
use crate::config::AppConfig;
use crate::errors::{ClassPointsError, Result};
use crate::middlewares::RequireClassroomOwner;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::classroom_context_missing;
use crate::services::points::current_window;
use crate::models::students::entities::Student;
use crate::models::transactions::entities::PointTransaction;

const STUDENTS_SECTION: &str = "=== STUDENTS ===";
const HISTORY_SECTION: &str = "=== POINT HISTORY ===";

/// 文件名中只保留字母、数字、`-` 和 `_`
pub fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let collapsed = sanitized
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if collapsed.is_empty() {
        "classroom".to_string()
    } else {
        collapsed
    }
}

pub fn export_filename(classroom_name: &str, date: NaiveDate) -> String {
    format!(
        "{}_export_{}.csv",
        sanitize_filename(classroom_name),
        date.format("%Y-%m-%d")
    )
}

fn write_section<I, R>(out: &mut String, title: &str, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ClassPointsError::serialization(e.to_string()))?;
    let body =
        String::from_utf8(bytes).map_err(|e| ClassPointsError::serialization(e.to_string()))?;

    out.push_str(title);
    out.push_str("\r\n");
    out.push_str(&body);
    Ok(())
}

/// 生成导出内容，流水时间按 `utc_offset_minutes` 显示
pub fn render_classroom_csv(
    students: &[Student],
    transactions: &[PointTransaction],
    utc_offset_minutes: i32,
) -> Result<String> {
    let offset = FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());

    let mut sorted_students: Vec<&Student> = students.iter().collect();
    sorted_students.sort_by_key(|s| s.name.to_lowercase());

    let mut out = String::new();
    write_section(
        &mut out,
        STUDENTS_SECTION,
        &["Name", "Total Points", "Positive", "Negative", "Today", "This Week"],
        sorted_students.iter().map(|s| {
            vec![
                s.name.clone(),
                s.point_total.to_string(),
                s.positive_total.to_string(),
                s.negative_total.to_string(),
                s.today_total.to_string(),
                s.this_week_total.to_string(),
            ]
        }),
    )?;

    out.push_str("\r\n");

    let names: HashMap<&str, &str> = students
        .iter()
        .map(|s| (s.id.as_str(), s.name.as_str()))
        .collect();
    let mut history: Vec<&PointTransaction> = transactions.iter().collect();
    history.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    write_section(
        &mut out,
        HISTORY_SECTION,
        &["Date", "Student", "Behavior", "Points", "Note"],
        history.iter().map(|tx| {
            vec![
                tx.created_at
                    .with_timezone(&offset)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                names
                    .get(tx.student_id.as_str())
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "Unknown student".to_string()),
                tx.behavior_name.clone(),
                tx.points.to_string(),
                tx.note.clone().unwrap_or_default(),
            ]
        }),
    )?;

    Ok(out)
}

pub async fn export_classroom(
    service: &ClassroomService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let Some(classroom) = RequireClassroomOwner::extract_classroom(request) else {
        return Ok(classroom_context_missing());
    };
    let utc_offset_minutes = AppConfig::get().points.utc_offset_minutes;

    let loaded = async {
        let students = storage.list_students(&classroom.id, current_window()).await?;
        let transactions = storage.list_all_transactions(&classroom.id).await?;
        render_classroom_csv(&students, &transactions, utc_offset_minutes)
    };

    match loaded.await {
        Ok(body) => {
            let offset =
                FixedOffset::east_opt(utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
            let today = Utc::now().with_timezone(&offset).date_naive();
            let filename = export_filename(&classroom.name, today);
            Ok(HttpResponse::Ok()
                .content_type("text/csv; charset=utf-8")
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ))
                .body(body))
        }
        Err(e) => {
            error!("Failed to export classroom {}: {}", classroom.id, e);
            Ok(HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                format!("Export failed: {e}"),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn student(id: &str, name: &str, total: i64) -> Student {
        Student {
            id: id.to_string(),
            classroom_id: "c1".to_string(),
            name: name.to_string(),
            avatar_color: None,
            point_total: total,
            positive_total: total,
            negative_total: 0,
            today_total: 0,
            this_week_total: total,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        assert_eq!(export_filename("Room 12 / Math!", date), "Room_12_Math_export_2024-09-02.csv");
        assert_eq!(export_filename("???", date), "classroom_export_2024-09-02.csv");
    }

    #[test]
    fn test_sections_and_escaping() {
        let students = vec![student("s1", "Smith, John", 3), student("s2", "Amy \"Ace\" Lee", 1)];
        let at = Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap();
        let transactions = vec![PointTransaction {
            id: "t1".to_string(),
            student_id: "s1".to_string(),
            classroom_id: "c1".to_string(),
            behavior_id: None,
            behavior_name: "On task".to_string(),
            behavior_icon: "🎯".to_string(),
            points: 3,
            note: Some("great, really".to_string()),
            batch_id: None,
            created_at: at,
        }];

        let csv = render_classroom_csv(&students, &transactions, 120).unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], "=== STUDENTS ===");
        assert_eq!(lines[1], "Name,Total Points,Positive,Negative,Today,This Week");
        assert_eq!(lines[2], "\"Amy \"\"Ace\"\" Lee\",1,1,0,0,1");
        assert_eq!(lines[3], "\"Smith, John\",3,3,0,0,3");
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "=== POINT HISTORY ===");
        assert_eq!(
            lines[7],
            "2024-09-02 10:30:00,\"Smith, John\",On task,3,\"great, really\""
        );
    }
}
