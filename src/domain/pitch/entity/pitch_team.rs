use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::error::AppError;

/// 피치 팀원 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamMemberStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
}

impl TeamMemberStatus {
    /// 초대 응답(수락/거절)은 PENDING에서만 가능
    pub fn ensure_pending(self) -> Result<(), AppError> {
        match self {
            TeamMemberStatus::Pending => Ok(()),
            TeamMemberStatus::Active => Err(AppError::invalid_transition(
                "이미 처리된 팀 초대입니다.",
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pitch_team")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pitch_team_id: i64,
    pub pitch_id: i64,
    pub user_id: i64,
    pub designation: String,
    pub status: TeamMemberStatus,
    pub invited_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pitch::Entity",
        from = "Column::PitchId",
        to = "super::pitch::Column::PitchId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pitch,
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::UserId",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    User,
}

impl Related<super::pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitch.def()
    }
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
