use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::entity::user::Gender;
use crate::utils::error::AppError;

/// 스카우트(투자 프로그램) 상태
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoutStatus {
    /// 기획 중 (수정 가능)
    #[sea_orm(string_value = "PLANNING")]
    Planning,
    /// 런칭 예약
    #[sea_orm(string_value = "SCHEDULED")]
    Scheduled,
    /// 피치 접수 중 (잠금)
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// 접수 종료
    #[sea_orm(string_value = "CLOSED")]
    Closed,
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
}

impl ScoutStatus {
    /// 스카우트 상태 전이 규칙
    pub fn transition_to(self, target: ScoutStatus) -> Result<ScoutStatus, AppError> {
        use ScoutStatus::*;
        let allowed = matches!(
            (self, target),
            (Planning, Scheduled)
                | (Planning, Active)
                | (Scheduled, Active)
                | (Scheduled, Planning)
                | (Active, Closed)
                | (Closed, Archived)
        );

        if allowed {
            Ok(target)
        } else {
            Err(AppError::invalid_transition(format!(
                "스카우트 상태를 {:?}에서 {:?}(으)로 변경할 수 없습니다.",
                self, target
            )))
        }
    }

    /// ACTIVE 이후로는 스카우트 정보가 잠깁니다.
    pub fn is_locked(self) -> bool {
        matches!(
            self,
            ScoutStatus::Active | ScoutStatus::Closed | ScoutStatus::Archived
        )
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scout")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub scout_id: i64,
    pub name: String,
    pub description: Option<String>,

    // 타겟 오디언스 필터 (None = 전체)
    pub location: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub gender: Option<Gender>,
    pub community: Option<String>,
    pub sector: Option<String>,
    pub stage: Option<String>,

    pub program_launch_date: Option<Date>,
    pub last_day_to_pitch: Option<Date>,
    pub status: ScoutStatus,
    pub is_locked: bool,
    pub is_archived: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::daftar_scout::Entity")]
    DaftarScout,
    #[sea_orm(has_many = "super::scout_question::Entity")]
    ScoutQuestion,
    #[sea_orm(has_many = "crate::domain::pitch::entity::pitch::Entity")]
    Pitch,
}

impl Related<super::daftar_scout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DaftarScout.def()
    }
}

impl Related<super::scout_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ScoutQuestion.def()
    }
}

impl Related<crate::domain::pitch::entity::pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitch.def()
    }
}

impl Model {
    /// 피치를 받을 수 있는 상태인지 (ACTIVE이고 마감일이 지나지 않음)
    pub fn is_open_for_pitches(&self, today: Date) -> bool {
        self.status == ScoutStatus::Active
            && self.last_day_to_pitch.map_or(true, |last_day| today <= last_day)
    }

    /// 창업자가 스카우트의 대상 조건(나이, 성별, 지역)에 맞는지
    ///
    /// 조건이 비어 있거나 "all"이면 모두 허용합니다.
    /// 나이 조건이 있는데 창업자의 나이를 모르면 대상이 아닙니다.
    pub fn matches_founder(
        &self,
        founder_age: Option<u32>,
        founder_gender: Option<Gender>,
        founder_location: Option<&str>,
    ) -> bool {
        let age_ok = match (self.min_age, self.max_age) {
            (None, None) => true,
            (min, max) => founder_age.is_some_and(|age| {
                let age = age as i32;
                min.map_or(true, |min| age >= min) && max.map_or(true, |max| age <= max)
            }),
        };

        let gender_ok = self
            .gender
            .map_or(true, |wanted| founder_gender == Some(wanted));

        let location_ok = match self.location.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) if wanted.eq_ignore_ascii_case("all") => true,
            Some(wanted) => founder_location
                .is_some_and(|location| location.trim().eq_ignore_ascii_case(wanted)),
        };

        age_ok && gender_ok && location_ok
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::ScoutStatus::*;
    use super::*;

    #[test]
    fn should_allow_forward_lifecycle() {
        assert_eq!(Planning.transition_to(Scheduled).unwrap(), Scheduled);
        assert_eq!(Scheduled.transition_to(Active).unwrap(), Active);
        assert_eq!(Active.transition_to(Closed).unwrap(), Closed);
        assert_eq!(Closed.transition_to(Archived).unwrap(), Archived);
    }

    #[test]
    fn should_allow_unscheduling() {
        assert_eq!(Scheduled.transition_to(Planning).unwrap(), Planning);
    }

    #[test]
    fn should_reject_reopening_closed_scout() {
        assert!(matches!(
            Closed.transition_to(Active),
            Err(AppError::InvalidStatusTransition(_))
        ));
    }

    #[test]
    fn should_reject_skipping_to_archive() {
        assert!(Active.transition_to(Archived).is_err());
        assert!(Planning.transition_to(Closed).is_err());
    }

    #[test]
    fn should_reject_self_transition() {
        assert!(Active.transition_to(Active).is_err());
    }

    #[test]
    fn only_running_or_finished_scouts_are_locked() {
        assert!(!Planning.is_locked());
        assert!(!Scheduled.is_locked());
        assert!(Active.is_locked());
        assert!(Archived.is_locked());
    }
    fn sample(
        min_age: Option<i32>,
        max_age: Option<i32>,
        gender: Option<Gender>,
        location: Option<&str>,
    ) -> Model {
        let now = chrono::Utc::now().naive_utc();
        Model {
            scout_id: 1,
            name: "Seed Sprint".to_string(),
            description: None,
            location: location.map(str::to_string),
            min_age,
            max_age,
            gender,
            community: None,
            sector: None,
            stage: None,
            program_launch_date: None,
            last_day_to_pitch: chrono::NaiveDate::from_ymd_opt(2026, 3, 31),
            status: Active,
            is_locked: true,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn open_filters_should_match_everyone() {
        let scout = sample(None, None, None, Some("All"));

        assert!(scout.matches_founder(None, None, None));
    }

    #[test]
    fn age_range_should_be_inclusive() {
        let scout = sample(Some(21), Some(35), None, None);

        assert!(scout.matches_founder(Some(21), None, None));
        assert!(scout.matches_founder(Some(35), None, None));
        assert!(!scout.matches_founder(Some(36), None, None));
        assert!(!scout.matches_founder(None, None, None));
    }

    #[test]
    fn gender_and_location_should_both_match() {
        let scout = sample(None, None, Some(Gender::Female), Some("Pune"));

        assert!(scout.matches_founder(Some(30), Some(Gender::Female), Some("pune ")));
        assert!(!scout.matches_founder(Some(30), Some(Gender::Male), Some("Pune")));
        assert!(!scout.matches_founder(Some(30), Some(Gender::Female), Some("Delhi")));
    }

    #[test]
    fn scout_should_close_after_last_day() {
        let scout = sample(None, None, None, None);
        let last_day = chrono::NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();

        assert!(scout.is_open_for_pitches(last_day));
        assert!(!scout.is_open_for_pitches(last_day.succ_opt().unwrap()));
    }
}
