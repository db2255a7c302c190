use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_tables::Behaviors;

#[derive(DeriveMigrationName)]
pub struct Migration;

// 全局行为目录（user_id 为空，所有教师可见）
const DEFAULT_BEHAVIORS: [(&str, &str, i32, &str, &str); 11] = [
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000001",
        "On Task",
        1,
        "🎯",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000002",
        "Helping Others",
        2,
        "🤝",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000003",
        "Great Participation",
        1,
        "✋",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000004",
        "Kindness",
        2,
        "💖",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000005",
        "Excellent Work",
        3,
        "⭐",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000006",
        "Teamwork",
        2,
        "👥",
        "positive",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000007",
        "Off Task",
        -1,
        "😴",
        "negative",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000008",
        "Disruptive",
        -2,
        "📢",
        "negative",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a000009",
        "Unprepared",
        -1,
        "📝",
        "negative",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a00000a",
        "Unkind Words",
        -2,
        "💬",
        "negative",
    ),
    (
        "5b1f0c7e-3a41-4c2e-9d3a-0f6e1a00000b",
        "Late",
        -1,
        "⏰",
        "negative",
    ),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_err(|e| DbErr::Custom(e.to_string()))?
            .as_secs() as i64;

        for (id, name, points, icon, category) in DEFAULT_BEHAVIORS {
            let insert = Query::insert()
                .into_table(Behaviors::Table)
                .columns([
                    Behaviors::Id,
                    Behaviors::Name,
                    Behaviors::Points,
                    Behaviors::Icon,
                    Behaviors::Category,
                    Behaviors::IsCustom,
                    Behaviors::CreatedAt,
                    Behaviors::UpdatedAt,
                ])
                .values_panic([
                    id.into(),
                    name.into(),
                    points.into(),
                    icon.into(),
                    category.into(),
                    false.into(),
                    now.into(),
                    now.into(),
                ])
                .to_owned();

            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let ids: Vec<&str> = DEFAULT_BEHAVIORS.iter().map(|b| b.0).collect();
        let delete = Query::delete()
            .from_table(Behaviors::Table)
            .and_where(Expr::col(Behaviors::Id).is_in(ids))
            .to_owned();
        manager.exec_stmt(delete).await?;
        Ok(())
    }
}
