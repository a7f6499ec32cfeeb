use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 투자자 분석 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
}

/// 투자자 한 명의 피치 분석 (investor, pitch 쌍마다 최대 1개)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "investor_pitch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub investor_pitch_id: i64,
    pub pitch_id: i64,
    pub investor_id: i64,
    /// 0~10
    pub believe_rating: i32,
    pub should_meet: bool,
    #[sea_orm(column_type = "Text")]
    pub analysis: String,
    pub status: AnalysisStatus,
    pub is_submitted: bool,
    pub submitted_at: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::pitch::entity::pitch::Entity",
        from = "Column::PitchId",
        to = "crate::domain::pitch::entity::pitch::Column::PitchId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pitch,
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::InvestorId",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Investor,
}

impl Related<crate::domain::pitch::entity::pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitch.def()
    }
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
