//! 座位表存储操作

use std::collections::HashMap;

use super::{SeaOrmStorage, new_id, now_secs};
use crate::config::SeatingConfig;
use crate::entity::room_elements::{self, Entity as RoomElements};
use crate::entity::seating_charts::{self, Entity as SeatingCharts};
use crate::entity::seating_groups::{self, Entity as SeatingGroups};
use crate::entity::seating_seats::{self, Entity as SeatingSeats};
use crate::errors::{ClassPointsError, Result};
use crate::models::{
    presets::entities::PresetLayout,
    seating::entities::{
        NewRoomElement, RoomElement, RoomElementUpdate, SeatingChart, SeatingGroup,
        SeatingGroupUpdate, SeatingSeat,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 每组座位数
pub const SEATS_PER_GROUP: i32 = 4;

/// 在连接中创建座位组及其座位
async fn insert_group<C: ConnectionTrait>(
    conn: &C,
    chart_id: &str,
    letter: &str,
    x: f64,
    y: f64,
    rotation: i32,
) -> Result<SeatingGroup> {
    let now = now_secs();
    let group = seating_groups::ActiveModel {
        id: Set(new_id()),
        chart_id: Set(chart_id.to_string()),
        letter: Set(letter.to_string()),
        x: Set(x),
        y: Set(y),
        rotation: Set(rotation),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| ClassPointsError::database_operation(format!("创建座位组失败: {e}")))?;

    let mut seats = Vec::with_capacity(SEATS_PER_GROUP as usize);
    for position in 0..SEATS_PER_GROUP {
        let seat = seating_seats::ActiveModel {
            id: Set(new_id()),
            group_id: Set(group.id.clone()),
            chart_id: Set(chart_id.to_string()),
            position: Set(position),
            student_id: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| ClassPointsError::database_operation(format!("创建座位失败: {e}")))?;
        seats.push(seat.into_seat());
    }

    Ok(group.into_group(seats))
}

async fn insert_element<C: ConnectionTrait>(
    conn: &C,
    chart_id: &str,
    element: NewRoomElement,
    rotation: i32,
) -> Result<RoomElement> {
    let now = now_secs();
    let model = room_elements::ActiveModel {
        id: Set(new_id()),
        chart_id: Set(chart_id.to_string()),
        kind: Set(element.kind.as_str().to_string()),
        label: Set(element.label),
        x: Set(element.x),
        y: Set(element.y),
        width: Set(element.width),
        height: Set(element.height),
        rotation: Set(rotation),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(|e| ClassPointsError::database_operation(format!("创建设施失败: {e}")))?;

    Ok(model.into_element())
}

impl SeaOrmStorage {
    /// 加载座位表的组、座位与设施
    async fn load_chart(&self, chart: seating_charts::Model) -> Result<SeatingChart> {
        let groups = SeatingGroups::find()
            .filter(seating_groups::Column::ChartId.eq(chart.id.clone()))
            .order_by_asc(seating_groups::Column::Letter)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询座位组失败: {e}")))?;

        let seats = SeatingSeats::find()
            .filter(seating_seats::Column::ChartId.eq(chart.id.clone()))
            .order_by_asc(seating_seats::Column::Position)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询座位失败: {e}")))?;

        let elements = RoomElements::find()
            .filter(room_elements::Column::ChartId.eq(chart.id.clone()))
            .order_by_asc(room_elements::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询设施失败: {e}")))?;

        let mut seats_by_group: HashMap<String, Vec<SeatingSeat>> = HashMap::new();
        for seat in seats {
            seats_by_group
                .entry(seat.group_id.clone())
                .or_default()
                .push(seat.into_seat());
        }

        let mut result = chart.into_chart();
        result.groups = groups
            .into_iter()
            .map(|g| {
                let seats = seats_by_group.remove(&g.id).unwrap_or_default();
                g.into_group(seats)
            })
            .collect();
        result.elements = elements.into_iter().map(|e| e.into_element()).collect();
        Ok(result)
    }

    /// 获取班级座位表
    pub async fn get_chart_impl(&self, classroom_id: &str) -> Result<Option<SeatingChart>> {
        let chart = SeatingCharts::find()
            .filter(seating_charts::Column::ClassroomId.eq(classroom_id))
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询座位表失败: {e}")))?;

        match chart {
            Some(chart) => Ok(Some(self.load_chart(chart).await?)),
            None => Ok(None),
        }
    }

    /// 通过 ID 获取座位表
    pub async fn get_chart_by_id_impl(&self, chart_id: &str) -> Result<Option<SeatingChart>> {
        let chart = SeatingCharts::find_by_id(chart_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询座位表失败: {e}")))?;

        match chart {
            Some(chart) => Ok(Some(self.load_chart(chart).await?)),
            None => Ok(None),
        }
    }

    /// 获取或创建座位表
    pub async fn get_or_create_chart_impl(
        &self,
        classroom_id: &str,
        defaults: &SeatingConfig,
    ) -> Result<SeatingChart> {
        if let Some(chart) = self.get_chart_impl(classroom_id).await? {
            return Ok(chart);
        }

        let now = now_secs();
        let model = seating_charts::ActiveModel {
            id: Set(new_id()),
            classroom_id: Set(classroom_id.to_string()),
            canvas_width: Set(defaults.default_canvas_width),
            canvas_height: Set(defaults.default_canvas_height),
            grid_size: Set(defaults.default_grid_size),
            snap_enabled: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
        .map_err(|e| ClassPointsError::database_operation(format!("创建座位表失败: {e}")))?;

        Ok(model.into_chart())
    }

    /// 更新画布设置
    pub async fn update_chart_impl(
        &self,
        chart_id: &str,
        canvas_width: Option<f64>,
        canvas_height: Option<f64>,
        grid_size: Option<f64>,
        snap_enabled: Option<bool>,
    ) -> Result<Option<SeatingChart>> {
        let Some(existing) = SeatingCharts::find_by_id(chart_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(w) = canvas_width {
            model.canvas_width = Set(w);
        }
        if let Some(h) = canvas_height {
            model.canvas_height = Set(h);
        }
        if let Some(g) = grid_size {
            model.grid_size = Set(g);
        }
        if let Some(s) = snap_enabled {
            model.snap_enabled = Set(s);
        }
        model.updated_at = Set(now_secs());
        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新座位表失败: {e}")))?;

        Ok(Some(self.load_chart(updated).await?))
    }

    /// 新建座位组
    pub async fn create_group_impl(
        &self,
        chart_id: &str,
        letter: &str,
        x: f64,
        y: f64,
    ) -> Result<SeatingGroup> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let group = insert_group(&txn, chart_id, letter, x, y, 0).await?;
        txn.commit().await?;
        Ok(group)
    }

    /// 获取座位组
    pub async fn get_group_impl(&self, id: &str) -> Result<Option<SeatingGroup>> {
        let Some(group) = SeatingGroups::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("查询座位组失败: {e}")))?
        else {
            return Ok(None);
        };

        let seats = SeatingSeats::find()
            .filter(seating_seats::Column::GroupId.eq(id))
            .order_by_asc(seating_seats::Column::Position)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|s| s.into_seat())
            .collect();

        Ok(Some(group.into_group(seats)))
    }

    /// 更新座位组
    pub async fn update_group_impl(
        &self,
        id: &str,
        update: SeatingGroupUpdate,
    ) -> Result<Option<SeatingGroup>> {
        let Some(existing) = SeatingGroups::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(x) = update.x {
            model.x = Set(x);
        }
        if let Some(y) = update.y {
            model.y = Set(y);
        }
        if let Some(rotation) = update.rotation {
            model.rotation = Set(rotation);
        }
        model.updated_at = Set(now_secs());
        model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新座位组失败: {e}")))?;

        self.get_group_impl(id).await
    }

    /// 删除座位组（座位级联删除）
    pub async fn delete_group_impl(&self, id: &str) -> Result<bool> {
        let result = SeatingGroups::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除座位组失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 安排学生入座，学生在同一座位表中的原座位先被清空
    pub async fn assign_seat_impl(
        &self,
        seat_id: &str,
        student_id: &str,
    ) -> Result<Vec<SeatingSeat>> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let now = now_secs();

        let seat = SeatingSeats::find_by_id(seat_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| ClassPointsError::not_found(format!("Seat {seat_id} not found")))?;

        let previous = SeatingSeats::find()
            .filter(seating_seats::Column::ChartId.eq(seat.chart_id.clone()))
            .filter(seating_seats::Column::StudentId.eq(student_id))
            .filter(seating_seats::Column::Id.ne(seat_id))
            .all(&txn)
            .await?;

        let mut changed = Vec::with_capacity(previous.len() + 1);
        for old in previous {
            let mut model = old.into_active_model();
            model.student_id = Set(None);
            model.updated_at = Set(now);
            changed.push(model.update(&txn).await?.into_seat());
        }

        let mut model = seat.into_active_model();
        model.student_id = Set(Some(student_id.to_string()));
        model.updated_at = Set(now);
        changed.push(model.update(&txn).await?.into_seat());

        txn.commit().await?;
        Ok(changed)
    }

    /// 清空座位
    pub async fn unassign_seat_impl(&self, seat_id: &str) -> Result<Option<SeatingSeat>> {
        let Some(seat) = SeatingSeats::find_by_id(seat_id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = seat.into_active_model();
        model.student_id = Set(None);
        model.updated_at = Set(now_secs());
        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新座位失败: {e}")))?;

        Ok(Some(updated.into_seat()))
    }

    /// 清空全部座位后按 (座位, 学生) 计划入座
    pub async fn apply_seat_plan_impl(
        &self,
        chart_id: &str,
        plan: Vec<(String, String)>,
    ) -> Result<()> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;
        let now = now_secs();

        SeatingSeats::update_many()
            .col_expr(
                seating_seats::Column::StudentId,
                sea_orm::sea_query::Expr::value(Option::<String>::None),
            )
            .col_expr(
                seating_seats::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(seating_seats::Column::ChartId.eq(chart_id))
            .exec(&txn)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("清空座位失败: {e}")))?;

        for (seat_id, student_id) in plan {
            SeatingSeats::update_many()
                .col_expr(
                    seating_seats::Column::StudentId,
                    sea_orm::sea_query::Expr::value(student_id),
                )
                .filter(seating_seats::Column::Id.eq(seat_id))
                .filter(seating_seats::Column::ChartId.eq(chart_id))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(())
    }

    /// 新建设施
    pub async fn create_element_impl(
        &self,
        chart_id: &str,
        element: NewRoomElement,
    ) -> Result<RoomElement> {
        insert_element(&self.db, chart_id, element, 0).await
    }

    /// 更新设施
    pub async fn update_element_impl(
        &self,
        id: &str,
        update: RoomElementUpdate,
    ) -> Result<Option<RoomElement>> {
        let Some(existing) = RoomElements::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(label) = update.label {
            model.label = Set(label);
        }
        if let Some(x) = update.x {
            model.x = Set(x);
        }
        if let Some(y) = update.y {
            model.y = Set(y);
        }
        if let Some(width) = update.width {
            model.width = Set(width);
        }
        if let Some(height) = update.height {
            model.height = Set(height);
        }
        if let Some(rotation) = update.rotation {
            model.rotation = Set(rotation);
        }
        model.updated_at = Set(now_secs());
        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("更新设施失败: {e}")))?;

        Ok(Some(updated.into_element()))
    }

    /// 删除设施
    pub async fn delete_element_impl(&self, id: &str) -> Result<bool> {
        let result = RoomElements::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| ClassPointsError::database_operation(format!("删除设施失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 以预设替换整个布局，原有座位分配全部清除
    pub async fn replace_layout_impl(&self, chart_id: &str, layout: &PresetLayout) -> Result<()> {
        let _write = self.write_guard().await;
        let txn = self.db.begin().await?;

        let chart = SeatingCharts::find_by_id(chart_id.to_string())
            .one(&txn)
            .await?
            .ok_or_else(|| ClassPointsError::not_found(format!("Chart {chart_id} not found")))?;

        SeatingGroups::delete_many()
            .filter(seating_groups::Column::ChartId.eq(chart_id))
            .exec(&txn)
            .await?;
        RoomElements::delete_many()
            .filter(room_elements::Column::ChartId.eq(chart_id))
            .exec(&txn)
            .await?;

        let mut model = chart.into_active_model();
        model.canvas_width = Set(layout.canvas_width);
        model.canvas_height = Set(layout.canvas_height);
        model.grid_size = Set(layout.grid_size);
        model.updated_at = Set(now_secs());
        model.update(&txn).await?;

        for group in &layout.groups {
            insert_group(&txn, chart_id, &group.letter, group.x, group.y, group.rotation).await?;
        }
        for element in &layout.elements {
            insert_element(
                &txn,
                chart_id,
                NewRoomElement {
                    kind: element.kind,
                    label: element.label.clone(),
                    x: element.x,
                    y: element.y,
                    width: element.width,
                    height: element.height,
                },
                element.rotation,
            )
            .await?;
        }

        txn.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::presets::entities::{PresetElement, PresetGroup};
    use crate::models::seating::entities::RoomElementKind;
    use crate::storage::sea_orm_storage::test_support::classroom_with_students;

    #[tokio::test]
    async fn test_chart_created_once_with_defaults() {
        let (storage, _, classroom_id, _) = classroom_with_students(&[]).await;
        let config = SeatingConfig::default();
        let chart = storage
            .get_or_create_chart_impl(&classroom_id, &config)
            .await
            .unwrap();
        assert_eq!(chart.grid_size, 40.0);
        let again = storage
            .get_or_create_chart_impl(&classroom_id, &config)
            .await
            .unwrap();
        assert_eq!(chart.id, again.id);
    }

    #[tokio::test]
    async fn test_group_has_four_seats() {
        let (storage, _, classroom_id, _) = classroom_with_students(&[]).await;
        let chart = storage
            .get_or_create_chart_impl(&classroom_id, &SeatingConfig::default())
            .await
            .unwrap();
        let group = storage
            .create_group_impl(&chart.id, "A", 40.0, 80.0)
            .await
            .unwrap();
        let positions: Vec<i32> = group.seats.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_assign_moves_student_between_seats() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann"]).await;
        let chart = storage
            .get_or_create_chart_impl(&classroom_id, &SeatingConfig::default())
            .await
            .unwrap();
        let group = storage
            .create_group_impl(&chart.id, "A", 0.0, 0.0)
            .await
            .unwrap();

        storage
            .assign_seat_impl(&group.seats[0].id, &students[0])
            .await
            .unwrap();
        let changed = storage
            .assign_seat_impl(&group.seats[2].id, &students[0])
            .await
            .unwrap();
        assert_eq!(changed.len(), 2);

        let chart = storage.get_chart_impl(&classroom_id).await.unwrap().unwrap();
        let occupied: Vec<&SeatingSeat> = chart.groups[0]
            .seats
            .iter()
            .filter(|s| s.student_id.is_some())
            .collect();
        assert_eq!(occupied.len(), 1);
        assert_eq!(occupied[0].position, 2);
    }

    #[tokio::test]
    async fn test_replace_layout_clears_assignments() {
        let (storage, _, classroom_id, students) = classroom_with_students(&["Ann"]).await;
        let chart = storage
            .get_or_create_chart_impl(&classroom_id, &SeatingConfig::default())
            .await
            .unwrap();
        let group = storage
            .create_group_impl(&chart.id, "A", 0.0, 0.0)
            .await
            .unwrap();
        storage
            .assign_seat_impl(&group.seats[0].id, &students[0])
            .await
            .unwrap();

        let layout = PresetLayout {
            canvas_width: 800.0,
            canvas_height: 600.0,
            grid_size: 20.0,
            groups: vec![
                PresetGroup {
                    letter: "A".to_string(),
                    x: 20.0,
                    y: 20.0,
                    rotation: 90,
                },
                PresetGroup {
                    letter: "B".to_string(),
                    x: 200.0,
                    y: 20.0,
                    rotation: 0,
                },
            ],
            elements: vec![PresetElement {
                kind: RoomElementKind::TeacherDesk,
                label: None,
                x: 0.0,
                y: 500.0,
                width: 80.0,
                height: 40.0,
                rotation: 0,
            }],
        };
        storage.replace_layout_impl(&chart.id, &layout).await.unwrap();

        let chart = storage.get_chart_impl(&classroom_id).await.unwrap().unwrap();
        assert_eq!(chart.grid_size, 20.0);
        assert_eq!(chart.groups.len(), 2);
        assert_eq!(chart.groups[0].rotation, 90);
        assert_eq!(chart.elements.len(), 1);
        assert!(
            chart
                .groups
                .iter()
                .flat_map(|g| g.seats.iter())
                .all(|s| s.student_id.is_none())
        );
    }
}
