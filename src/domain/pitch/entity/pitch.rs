use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::error::AppError;

/// 피치 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PitchStatus {
    /// 스카우트 미지정 임시 저장
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// 스카우트에 제출되어 심사 대기
    #[sea_orm(string_value = "INBOX")]
    Inbox,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "DECLINED")]
    Declined,
    #[sea_orm(string_value = "WITHDRAWN")]
    Withdrawn,
    #[sea_orm(string_value = "DELETED")]
    Deleted,
}

/// 피치 상태를 바꾸는 행위
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PitchAction {
    /// 창업자: 스카우트에 제출
    Submit,
    /// 투자자: 수락
    Accept,
    /// 투자자: 거절
    Decline,
    /// 창업자: 철회
    Withdraw,
    /// 창업자: 삭제
    Delete,
}

impl PitchStatus {
    /// 피치 상태 전이의 단일 진입점
    pub fn apply(self, action: PitchAction) -> Result<PitchStatus, AppError> {
        use PitchAction as A;
        use PitchStatus as S;

        let next = match (self, action) {
            (S::Draft, A::Submit) => S::Inbox,
            (S::Inbox, A::Accept) => S::Accepted,
            (S::Inbox, A::Decline) => S::Declined,
            (S::Draft | S::Inbox | S::Accepted, A::Withdraw) => S::Withdrawn,
            (S::Draft | S::Withdrawn | S::Declined, A::Delete) => S::Deleted,
            (current, action) => {
                return Err(AppError::invalid_transition(format!(
                    "{:?} 상태의 피치에는 {:?} 처리를 할 수 없습니다.",
                    current, action
                )))
            }
        };

        Ok(next)
    }

    /// 투자자가 열람할 수 있는 상태 (스카우트에 제출된 이후)
    pub fn is_visible_to_investors(self) -> bool {
        matches!(
            self,
            PitchStatus::Inbox | PitchStatus::Accepted | PitchStatus::Declined
        )
    }

    /// 오퍼를 받을 수 있는 상태
    pub fn accepts_offers(self) -> bool {
        matches!(self, PitchStatus::Inbox | PitchStatus::Accepted)
    }
}

/// 투자자 측 검토 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvestorStatus {
    #[sea_orm(string_value = "NEW")]
    New,
    /// 한 명 이상의 투자자가 분석을 제출함
    #[sea_orm(string_value = "REVIEW")]
    Review,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pitch")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pitch_id: i64,
    pub pitch_name: String,
    /// None이면 아직 어떤 스카우트에도 제출하지 않은 초안
    pub scout_id: Option<i64>,
    pub status: PitchStatus,
    pub investor_status: InvestorStatus,
    pub is_completed: bool,
    pub is_paid: bool,
    pub is_locked: bool,
    pub created_by: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::scout::entity::scout::Entity",
        from = "Column::ScoutId",
        to = "crate::domain::scout::entity::scout::Column::ScoutId",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Scout,
    #[sea_orm(has_many = "super::pitch_team::Entity")]
    PitchTeam,
    #[sea_orm(has_many = "super::pitch_answer::Entity")]
    PitchAnswer,
    #[sea_orm(has_many = "super::pitch_document::Entity")]
    PitchDocument,
    #[sea_orm(has_many = "crate::domain::offer::entity::offer::Entity")]
    Offer,
    #[sea_orm(has_many = "crate::domain::analysis::entity::investor_pitch::Entity")]
    InvestorPitch,
}

impl Related<crate::domain::scout::entity::scout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scout.def()
    }
}

impl Related<super::pitch_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PitchTeam.def()
    }
}

impl Related<super::pitch_answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PitchAnswer.def()
    }
}

impl Related<super::pitch_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PitchDocument.def()
    }
}

impl Related<crate::domain::offer::entity::offer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offer.def()
    }
}

impl Related<crate::domain::analysis::entity::investor_pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvestorPitch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::PitchAction::*;
    use super::PitchStatus::*;
    use super::*;

    #[test]
    fn draft_should_move_to_inbox_on_submit() {
        assert_eq!(Draft.apply(Submit).unwrap(), Inbox);
    }

    #[test]
    fn inbox_should_be_decided_by_investor() {
        assert_eq!(Inbox.apply(Accept).unwrap(), Accepted);
        assert_eq!(Inbox.apply(Decline).unwrap(), Declined);
    }

    #[test]
    fn accepted_pitch_should_not_be_declined_afterwards() {
        assert!(matches!(
            Accepted.apply(Decline),
            Err(AppError::InvalidStatusTransition(_))
        ));
    }

    #[test]
    fn founder_should_withdraw_before_decline() {
        assert_eq!(Draft.apply(Withdraw).unwrap(), Withdrawn);
        assert_eq!(Inbox.apply(Withdraw).unwrap(), Withdrawn);
        assert_eq!(Accepted.apply(Withdraw).unwrap(), Withdrawn);
        assert!(Declined.apply(Withdraw).is_err());
    }

    #[test]
    fn submitted_pitch_should_not_be_deleted_directly() {
        assert!(Inbox.apply(Delete).is_err());
        assert!(Accepted.apply(Delete).is_err());
        assert_eq!(Withdrawn.apply(Delete).unwrap(), Deleted);
    }

    #[test]
    fn deleted_pitch_should_be_terminal() {
        for action in [Submit, Accept, Decline, Withdraw, Delete] {
            assert!(Deleted.apply(action).is_err(), "{:?}", action);
        }
    }

    #[test]
    fn resubmission_should_be_rejected() {
        assert!(Inbox.apply(Submit).is_err());
        assert!(Withdrawn.apply(Submit).is_err());
    }
}
