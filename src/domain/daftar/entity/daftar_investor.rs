use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::error::AppError;

/// 다프타 멤버십 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DaftarMemberStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
}

impl DaftarMemberStatus {
    /// 초대 수락: PENDING → ACTIVE
    pub fn accept(self) -> Result<Self, AppError> {
        match self {
            DaftarMemberStatus::Pending => Ok(DaftarMemberStatus::Active),
            DaftarMemberStatus::Active => Err(AppError::invalid_transition(
                "이미 수락된 다프타 초대입니다.",
            )),
        }
    }

    /// 초대 거절은 PENDING 상태에서만 가능 (거절 시 행 삭제)
    pub fn ensure_declinable(self) -> Result<(), AppError> {
        match self {
            DaftarMemberStatus::Pending => Ok(()),
            DaftarMemberStatus::Active => Err(AppError::invalid_transition(
                "이미 수락된 다프타 초대는 거절할 수 없습니다.",
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daftar_investor")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub daftar_investor_id: i64,
    pub daftar_id: i64,
    pub investor_id: i64,
    pub designation: String,
    pub status: DaftarMemberStatus,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::daftar::Entity",
        from = "Column::DaftarId",
        to = "super::daftar::Column::DaftarId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Daftar,
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::InvestorId",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Investor,
}

impl Related<super::daftar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Daftar.def()
    }
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_invite_should_become_active() {
        assert_eq!(
            DaftarMemberStatus::Pending.accept().unwrap(),
            DaftarMemberStatus::Active
        );
    }

    #[test]
    fn active_member_should_not_accept_again() {
        assert!(matches!(
            DaftarMemberStatus::Active.accept(),
            Err(AppError::InvalidStatusTransition(_))
        ));
        assert!(DaftarMemberStatus::Active.ensure_declinable().is_err());
    }
}
