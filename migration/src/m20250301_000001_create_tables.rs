use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建班级表（含冗余积分汇总）
        manager
            .create_table(
                Table::create()
                    .table(Classrooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Classrooms::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Classrooms::UserId).string().not_null())
                    .col(ColumnDef::new(Classrooms::Name).string().not_null())
                    .col(
                        ColumnDef::new(Classrooms::PointTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Classrooms::PositiveTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Classrooms::NegativeTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Classrooms::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Classrooms::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Classrooms::Table, Classrooms::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建学生表
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::ClassroomId).string().not_null())
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .col(ColumnDef::new(Students::AvatarColor).string().null())
                    .col(
                        ColumnDef::new(Students::PointTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Students::PositiveTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Students::NegativeTotal)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Students::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Students::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Students::Table, Students::ClassroomId)
                            .to(Classrooms::Table, Classrooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建行为表（user_id 为空表示全局行为）
        manager
            .create_table(
                Table::create()
                    .table(Behaviors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Behaviors::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Behaviors::UserId).string().null())
                    .col(ColumnDef::new(Behaviors::Name).string().not_null())
                    .col(ColumnDef::new(Behaviors::Points).integer().not_null())
                    .col(ColumnDef::new(Behaviors::Icon).string().not_null())
                    .col(ColumnDef::new(Behaviors::Category).string().not_null())
                    .col(
                        ColumnDef::new(Behaviors::IsCustom)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Behaviors::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Behaviors::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Behaviors::Table, Behaviors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建积分流水表
        manager
            .create_table(
                Table::create()
                    .table(PointTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PointTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::StudentId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::ClassroomId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::BehaviorId).string().null())
                    .col(
                        ColumnDef::new(PointTransactions::BehaviorName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::BehaviorIcon)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::Points)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PointTransactions::Note).text().null())
                    .col(ColumnDef::new(PointTransactions::BatchId).string().null())
                    .col(
                        ColumnDef::new(PointTransactions::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PointTransactions::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PointTransactions::Table, PointTransactions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PointTransactions::Table, PointTransactions::ClassroomId)
                            .to(Classrooms::Table, Classrooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PointTransactions::Table, PointTransactions::BehaviorId)
                            .to(Behaviors::Table, Behaviors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建座位表（每个班级一张）
        manager
            .create_table(
                Table::create()
                    .table(SeatingCharts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeatingCharts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(SeatingCharts::ClassroomId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(SeatingCharts::CanvasWidth)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeatingCharts::CanvasHeight)
                            .double()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SeatingCharts::GridSize).double().not_null())
                    .col(
                        ColumnDef::new(SeatingCharts::SnapEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SeatingCharts::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeatingCharts::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SeatingCharts::Table, SeatingCharts::ClassroomId)
                            .to(Classrooms::Table, Classrooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建座位组表
        manager
            .create_table(
                Table::create()
                    .table(SeatingGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeatingGroups::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeatingGroups::ChartId).string().not_null())
                    .col(ColumnDef::new(SeatingGroups::Letter).string().not_null())
                    .col(ColumnDef::new(SeatingGroups::X).double().not_null())
                    .col(ColumnDef::new(SeatingGroups::Y).double().not_null())
                    .col(
                        ColumnDef::new(SeatingGroups::Rotation)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SeatingGroups::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeatingGroups::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SeatingGroups::Table, SeatingGroups::ChartId)
                            .to(SeatingCharts::Table, SeatingCharts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建座位表
        manager
            .create_table(
                Table::create()
                    .table(SeatingSeats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeatingSeats::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeatingSeats::GroupId).string().not_null())
                    .col(ColumnDef::new(SeatingSeats::ChartId).string().not_null())
                    .col(ColumnDef::new(SeatingSeats::Position).integer().not_null())
                    .col(ColumnDef::new(SeatingSeats::StudentId).string().null())
                    .col(
                        ColumnDef::new(SeatingSeats::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SeatingSeats::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SeatingSeats::Table, SeatingSeats::GroupId)
                            .to(SeatingGroups::Table, SeatingGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(SeatingSeats::Table, SeatingSeats::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建教室设施表
        manager
            .create_table(
                Table::create()
                    .table(RoomElements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoomElements::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RoomElements::ChartId).string().not_null())
                    .col(ColumnDef::new(RoomElements::Kind).string().not_null())
                    .col(ColumnDef::new(RoomElements::Label).string().null())
                    .col(ColumnDef::new(RoomElements::X).double().not_null())
                    .col(ColumnDef::new(RoomElements::Y).double().not_null())
                    .col(ColumnDef::new(RoomElements::Width).double().not_null())
                    .col(ColumnDef::new(RoomElements::Height).double().not_null())
                    .col(
                        ColumnDef::new(RoomElements::Rotation)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoomElements::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RoomElements::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RoomElements::Table, RoomElements::ChartId)
                            .to(SeatingCharts::Table, SeatingCharts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建布局预设表
        manager
            .create_table(
                Table::create()
                    .table(LayoutPresets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LayoutPresets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LayoutPresets::UserId).string().not_null())
                    .col(ColumnDef::new(LayoutPresets::Name).string().not_null())
                    .col(ColumnDef::new(LayoutPresets::Layout).text().not_null())
                    .col(
                        ColumnDef::new(LayoutPresets::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LayoutPresets::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LayoutPresets::Table, LayoutPresets::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建用户音效设置表
        manager
            .create_table(
                Table::create()
                    .table(UserSoundSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserSoundSettings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(UserSoundSettings::Volume).double().not_null())
                    .col(
                        ColumnDef::new(UserSoundSettings::PositiveSound)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::NegativeSound)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::CustomPositiveUrl)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::CustomNegativeUrl)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserSoundSettings::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserSoundSettings::Table, UserSoundSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        let indexes = [
            Index::create()
                .if_not_exists()
                .name("idx_classrooms_user_id")
                .table(Classrooms::Table)
                .col(Classrooms::UserId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_students_classroom_id")
                .table(Students::Table)
                .col(Students::ClassroomId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_behaviors_user_id")
                .table(Behaviors::Table)
                .col(Behaviors::UserId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_point_transactions_classroom_created")
                .table(PointTransactions::Table)
                .col(PointTransactions::ClassroomId)
                .col(PointTransactions::CreatedAt)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_point_transactions_student_id")
                .table(PointTransactions::Table)
                .col(PointTransactions::StudentId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_point_transactions_batch_id")
                .table(PointTransactions::Table)
                .col(PointTransactions::BatchId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_seating_groups_chart_id")
                .table(SeatingGroups::Table)
                .col(SeatingGroups::ChartId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_seating_seats_chart_id")
                .table(SeatingSeats::Table)
                .col(SeatingSeats::ChartId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_seating_seats_student_id")
                .table(SeatingSeats::Table)
                .col(SeatingSeats::StudentId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_room_elements_chart_id")
                .table(RoomElements::Table)
                .col(RoomElements::ChartId)
                .to_owned(),
            Index::create()
                .if_not_exists()
                .name("idx_layout_presets_user_id")
                .table(LayoutPresets::Table)
                .col(LayoutPresets::UserId)
                .to_owned(),
        ];

        for index in indexes {
            manager.create_index(index).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserSoundSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LayoutPresets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RoomElements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeatingSeats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeatingGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeatingCharts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PointTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Behaviors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classrooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Classrooms {
    #[sea_orm(iden = "classrooms")]
    Table,
    Id,
    UserId,
    Name,
    PointTotal,
    PositiveTotal,
    NegativeTotal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Students {
    #[sea_orm(iden = "students")]
    Table,
    Id,
    ClassroomId,
    Name,
    AvatarColor,
    PointTotal,
    PositiveTotal,
    NegativeTotal,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub(crate) enum Behaviors {
    #[sea_orm(iden = "behaviors")]
    Table,
    Id,
    UserId,
    Name,
    Points,
    Icon,
    Category,
    IsCustom,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PointTransactions {
    #[sea_orm(iden = "point_transactions")]
    Table,
    Id,
    StudentId,
    ClassroomId,
    BehaviorId,
    BehaviorName,
    BehaviorIcon,
    Points,
    Note,
    BatchId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeatingCharts {
    #[sea_orm(iden = "seating_charts")]
    Table,
    Id,
    ClassroomId,
    CanvasWidth,
    CanvasHeight,
    GridSize,
    SnapEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeatingGroups {
    #[sea_orm(iden = "seating_groups")]
    Table,
    Id,
    ChartId,
    Letter,
    X,
    Y,
    Rotation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SeatingSeats {
    #[sea_orm(iden = "seating_seats")]
    Table,
    Id,
    GroupId,
    ChartId,
    Position,
    StudentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum RoomElements {
    #[sea_orm(iden = "room_elements")]
    Table,
    Id,
    ChartId,
    Kind,
    Label,
    X,
    Y,
    Width,
    Height,
    Rotation,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LayoutPresets {
    #[sea_orm(iden = "layout_presets")]
    Table,
    Id,
    UserId,
    Name,
    Layout,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserSoundSettings {
    #[sea_orm(iden = "user_sound_settings")]
    Table,
    Id,
    UserId,
    Enabled,
    Volume,
    PositiveSound,
    NegativeSound,
    CustomPositiveUrl,
    CustomNegativeUrl,
    CreatedAt,
    UpdatedAt,
}
