use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::error::AppError;

/// 오퍼 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "DECLINED")]
    Declined,
    #[sea_orm(string_value = "WITHDRAWN")]
    Withdrawn,
}

/// 오퍼 상태를 바꾸는 행위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAction {
    /// 창업자: 수락
    Accept,
    /// 창업자: 거절
    Decline,
    /// 오퍼를 낸 투자자: 철회
    Withdraw,
}

impl OfferStatus {
    /// 오퍼 상태 전이. PENDING에서만 다른 상태로 갈 수 있습니다.
    pub fn apply(self, action: OfferAction) -> Result<OfferStatus, AppError> {
        match (self, action) {
            (OfferStatus::Pending, OfferAction::Accept) => Ok(OfferStatus::Accepted),
            (OfferStatus::Pending, OfferAction::Decline) => Ok(OfferStatus::Declined),
            (OfferStatus::Pending, OfferAction::Withdraw) => Ok(OfferStatus::Withdrawn),
            (current, _) => Err(AppError::invalid_transition(format!(
                "이미 처리된 오퍼입니다. (현재 상태: {:?})",
                current
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub offer_id: i64,
    pub pitch_id: i64,
    pub offer_by: i64,
    pub offer_status: OfferStatus,
    #[sea_orm(column_type = "Text")]
    pub description: String,
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
        from = "Column::OfferBy",
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_offer_should_reach_every_terminal_state() {
        assert_eq!(
            OfferStatus::Pending.apply(OfferAction::Accept).unwrap(),
            OfferStatus::Accepted
        );
        assert_eq!(
            OfferStatus::Pending.apply(OfferAction::Decline).unwrap(),
            OfferStatus::Declined
        );
        assert_eq!(
            OfferStatus::Pending.apply(OfferAction::Withdraw).unwrap(),
            OfferStatus::Withdrawn
        );
    }

    #[test]
    fn terminal_offers_should_not_change() {
        for status in [
            OfferStatus::Accepted,
            OfferStatus::Declined,
            OfferStatus::Withdrawn,
        ] {
            for action in [OfferAction::Accept, OfferAction::Decline, OfferAction::Withdraw] {
                assert!(
                    matches!(
                        status.apply(action),
                        Err(AppError::InvalidStatusTransition(_))
                    ),
                    "{:?} -> {:?}",
                    status,
                    action
                );
            }
        }
    }
}
