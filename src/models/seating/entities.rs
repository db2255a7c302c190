use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct SeatingSeat {
    pub id: String,
    pub group_id: String,
    /// 组内位置 0..3
    pub position: i32,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct SeatingGroup {
    pub id: String,
    pub chart_id: String,
    pub letter: String,
    pub x: f64,
    pub y: f64,
    pub rotation: i32,
    pub seats: Vec<SeatingSeat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "seating.ts")]
pub enum RoomElementKind {
    TeacherDesk,
    Door,
    Window,
    Counter,
    Sink,
}

impl RoomElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomElementKind::TeacherDesk => "teacher_desk",
            RoomElementKind::Door => "door",
            RoomElementKind::Window => "window",
            RoomElementKind::Counter => "counter",
            RoomElementKind::Sink => "sink",
        }
    }

    /// 新建设施的默认尺寸（宽, 高）
    pub fn default_size(&self, grid_size: f64) -> (f64, f64) {
        match self {
            RoomElementKind::TeacherDesk => (grid_size * 4.0, grid_size * 2.0),
            RoomElementKind::Door => (grid_size * 2.0, grid_size),
            RoomElementKind::Window => (grid_size * 3.0, grid_size),
            RoomElementKind::Counter => (grid_size * 5.0, grid_size),
            RoomElementKind::Sink => (grid_size * 2.0, grid_size * 2.0),
        }
    }
}

impl std::str::FromStr for RoomElementKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "teacher_desk" => Ok(RoomElementKind::TeacherDesk),
            "door" => Ok(RoomElementKind::Door),
            "window" => Ok(RoomElementKind::Window),
            "counter" => Ok(RoomElementKind::Counter),
            "sink" => Ok(RoomElementKind::Sink),
            _ => Err(format!("Invalid room element kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct RoomElement {
    pub id: String,
    pub chart_id: String,
    pub kind: RoomElementKind,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "seating.ts")]
pub struct SeatingChart {
    pub id: String,
    pub classroom_id: String,
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub grid_size: f64,
    pub snap_enabled: bool,
    pub groups: Vec<SeatingGroup>,
    pub elements: Vec<RoomElement>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl SeatingChart {
    /// 按 (组字母, 座位位置) 排序的座位 id
    pub fn ordered_seat_ids(&self) -> Vec<String> {
        let mut groups: Vec<&SeatingGroup> = self.groups.iter().collect();
        groups.sort_by(|a, b| a.letter.cmp(&b.letter));
        groups
            .into_iter()
            .flat_map(|g| {
                let mut seats: Vec<&SeatingSeat> = g.seats.iter().collect();
                seats.sort_by_key(|s| s.position);
                seats.into_iter().map(|s| s.id.clone())
            })
            .collect()
    }

    pub fn find_seat(&self, seat_id: &str) -> Option<&SeatingSeat> {
        self.groups
            .iter()
            .flat_map(|g| g.seats.iter())
            .find(|s| s.id == seat_id)
    }
}

/// 座位组的部分更新
#[derive(Debug, Clone, Copy, Default)]
pub struct SeatingGroupUpdate {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<i32>,
}

/// 设施的部分更新；`label: Some(None)` 表示清除标签
#[derive(Debug, Clone, Default)]
pub struct RoomElementUpdate {
    pub label: Option<Option<String>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<i32>,
}

/// 新建设施
#[derive(Debug, Clone)]
pub struct NewRoomElement {
    pub kind: RoomElementKind,
    pub label: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
