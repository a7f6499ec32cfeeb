use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;

use crate::domain::analysis::entity::investor_pitch;
use crate::domain::daftar::entity::daftar;
use crate::domain::daftar::service::DaftarService;
use crate::domain::notification::entity::notification::NotificationRole;
use crate::domain::notification::service::NotificationService;
use crate::domain::notification::template::NotificationKind;
use crate::domain::pitch::entity::pitch::{self, PitchStatus};
use crate::domain::pitch::entity::pitch_team::{self, TeamMemberStatus};
use crate::domain::user::entity::user::{self, UserRole};
use crate::domain::user::service::UserService;
use crate::utils::age::calculate_age;
use crate::utils::error::AppError;

use super::dto::{
    CreateScoutRequest, DaftarScoutItem, ScoutDetailResponse, ScoutQuestionItem, ScoutResponse,
    UpdateScoutRequest,
};
use super::entity::daftar_scout;
use super::entity::scout::{self, ScoutStatus};
use super::entity::scout_question;
use super::insight::{self, FounderSample, ScoutInsights};

/// 질문을 지정하지 않은 스카우트의 기본 질문
pub const DEFAULT_QUESTIONS: [&str; 5] = [
    "Introduce yourself and your co-founders.",
    "What problem are you solving, and for whom?",
    "How does your product solve it today?",
    "What traction have you achieved so far?",
    "How much are you raising, and how will you use it?",
];

/// 나이/날짜 조건의 앞뒤 관계 확인
fn check_schedule_and_audience(
    min_age: Option<i32>,
    max_age: Option<i32>,
    program_launch_date: Option<NaiveDate>,
    last_day_to_pitch: Option<NaiveDate>,
) -> Result<(), AppError> {
    if let (Some(min), Some(max)) = (min_age, max_age) {
        if min > max {
            return Err(AppError::bad_request("최소 나이는 최대 나이보다 클 수 없습니다."));
        }
    }
    if let (Some(launch), Some(last_day)) = (program_launch_date, last_day_to_pitch) {
        if last_day < launch {
            return Err(AppError::bad_request(
                "피치 마감일은 프로그램 시작일 이후여야 합니다.",
            ));
        }
    }
    Ok(())
}

fn question_models(
    scout_id: i64,
    questions: Vec<String>,
) -> impl Iterator<Item = scout_question::ActiveModel> {
    let questions = if questions.is_empty() {
        DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
    } else {
        questions
    };
    questions
        .into_iter()
        .enumerate()
        .map(move |(idx, question)| scout_question::ActiveModel {
            scout_id: Set(scout_id),
            question: Set(question.trim().to_string()),
            position: Set(idx as i32 + 1),
            ..Default::default()
        })
}

pub struct ScoutService;

impl ScoutService {
    /// 투자자의 스카우트 접근 권한 확인
    ///
    /// 스카우트와 연결된(is_pending=false) 다프타에 ACTIVE로 소속되어 있어야 합니다.
    pub async fn ensure_investor_access<C: ConnectionTrait>(
        conn: &C,
        scout_id: i64,
        investor_id: i64,
    ) -> Result<scout::Model, AppError> {
        let daftar_ids = DaftarService::active_daftar_ids(conn, investor_id).await?;
        if daftar_ids.is_empty() {
            return Err(AppError::not_found("존재하지 않는 스카우트입니다."));
        }

        let link = daftar_scout::Entity::find()
            .filter(daftar_scout::Column::ScoutId.eq(scout_id))
            .filter(daftar_scout::Column::DaftarId.is_in(daftar_ids))
            .filter(daftar_scout::Column::IsPending.eq(false))
            .one(conn)
            .await?;
        if link.is_none() {
            return Err(AppError::not_found("존재하지 않는 스카우트입니다."));
        }

        Self::find_scout(conn, scout_id).await
    }

    /// 스카우트를 운영하는 모든 투자자 ID (알림 수신자)
    pub async fn investor_ids<C: ConnectionTrait>(
        conn: &C,
        scout_id: i64,
    ) -> Result<Vec<i64>, AppError> {
        let daftar_ids = daftar_scout::Entity::find()
            .select_only()
            .column(daftar_scout::Column::DaftarId)
            .filter(daftar_scout::Column::ScoutId.eq(scout_id))
            .filter(daftar_scout::Column::IsPending.eq(false))
            .into_tuple::<i64>()
            .all(conn)
            .await?;

        DaftarService::active_member_ids(conn, &daftar_ids).await
    }

    pub async fn find_scout<C: ConnectionTrait>(
        conn: &C,
        scout_id: i64,
    ) -> Result<scout::Model, AppError> {
        scout::Entity::find_by_id(scout_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 스카우트입니다."))
    }

    async fn questions_of<C: ConnectionTrait>(
        conn: &C,
        scout_id: i64,
    ) -> Result<Vec<ScoutQuestionItem>, AppError> {
        let questions = scout_question::Entity::find()
            .filter(scout_question::Column::ScoutId.eq(scout_id))
            .order_by_asc(scout_question::Column::Position)
            .all(conn)
            .await?;
        Ok(questions.into_iter().map(ScoutQuestionItem::from).collect())
    }

    /// 스카우트 생성
    ///
    /// 스카우트(PLANNING), 소유 다프타 연결, 질문을 하나의 트랜잭션으로 저장합니다.
    pub async fn create_scout<C>(
        conn: &C,
        user_id: i64,
        daftar_id: i64,
        req: CreateScoutRequest,
    ) -> Result<ScoutDetailResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Investor)?;
        DaftarService::ensure_active_member(conn, daftar_id, me.user_id).await?;
        check_schedule_and_audience(
            req.min_age,
            req.max_age,
            req.program_launch_date,
            req.last_day_to_pitch,
        )?;

        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let saved = scout::ActiveModel {
            name: Set(req.name.trim().to_string()),
            description: Set(req.description),
            location: Set(req.location),
            min_age: Set(req.min_age),
            max_age: Set(req.max_age),
            gender: Set(req.gender),
            community: Set(req.community),
            sector: Set(req.sector),
            stage: Set(req.stage),
            program_launch_date: Set(req.program_launch_date),
            last_day_to_pitch: Set(req.last_day_to_pitch),
            status: Set(ScoutStatus::Planning),
            is_locked: Set(false),
            is_archived: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        daftar_scout::ActiveModel {
            daftar_id: Set(daftar_id),
            scout_id: Set(saved.scout_id),
            is_pending: Set(false),
            is_owner: Set(true),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        scout_question::Entity::insert_many(question_models(saved.scout_id, req.questions))
            .exec(&txn)
            .await?;

        let questions = Self::questions_of(&txn, saved.scout_id).await?;
        txn.commit().await?;

        info!(scout_id = saved.scout_id, daftar_id, "Scout created");

        Ok(ScoutDetailResponse {
            scout: saved.into(),
            questions,
        })
    }

    /// 스카우트 상세
    ///
    /// 투자자는 운영 다프타 소속일 때, 창업자는 모집 중인 스카우트만 볼 수 있습니다.
    pub async fn get_scout<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
    ) -> Result<ScoutDetailResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;

        let found = match me.role {
            UserRole::Investor => Self::ensure_investor_access(conn, scout_id, me.user_id).await?,
            UserRole::Founder => {
                let found = Self::find_scout(conn, scout_id).await?;
                if found.status != ScoutStatus::Active {
                    return Err(AppError::not_found("존재하지 않는 스카우트입니다."));
                }
                found
            }
        };

        let questions = Self::questions_of(conn, scout_id).await?;
        Ok(ScoutDetailResponse {
            scout: found.into(),
            questions,
        })
    }

    /// 스카우트 수정 (잠기기 전까지만)
    pub async fn update_scout<C>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
        req: UpdateScoutRequest,
    ) -> Result<ScoutDetailResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::ensure_investor_access(conn, scout_id, me.user_id).await?;
        if found.is_locked || found.status.is_locked() {
            return Err(AppError::conflict("진행 중이거나 종료된 스카우트는 수정할 수 없습니다."));
        }

        check_schedule_and_audience(
            req.min_age.or(found.min_age),
            req.max_age.or(found.max_age),
            req.program_launch_date.or(found.program_launch_date),
            req.last_day_to_pitch.or(found.last_day_to_pitch),
        )?;

        let txn = conn.begin().await?;

        let mut active: scout::ActiveModel = found.into();
        if let Some(name) = req.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = req.description {
            active.description = Set(Some(description));
        }
        if let Some(location) = req.location {
            active.location = Set(Some(location));
        }
        if let Some(min_age) = req.min_age {
            active.min_age = Set(Some(min_age));
        }
        if let Some(max_age) = req.max_age {
            active.max_age = Set(Some(max_age));
        }
        if let Some(gender) = req.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(community) = req.community {
            active.community = Set(Some(community));
        }
        if let Some(sector) = req.sector {
            active.sector = Set(Some(sector));
        }
        if let Some(stage) = req.stage {
            active.stage = Set(Some(stage));
        }
        if let Some(date) = req.program_launch_date {
            active.program_launch_date = Set(Some(date));
        }
        if let Some(date) = req.last_day_to_pitch {
            active.last_day_to_pitch = Set(Some(date));
        }
        active.updated_at = Set(Utc::now().naive_utc());
        let updated = active.update(&txn).await?;

        if let Some(questions) = req.questions {
            scout_question::Entity::delete_many()
                .filter(scout_question::Column::ScoutId.eq(scout_id))
                .exec(&txn)
                .await?;
            scout_question::Entity::insert_many(question_models(scout_id, questions))
                .exec(&txn)
                .await?;
        }

        let questions = Self::questions_of(&txn, scout_id).await?;
        txn.commit().await?;

        Ok(ScoutDetailResponse {
            scout: updated.into(),
            questions,
        })
    }

    /// 스카우트 상태 변경
    pub async fn change_status<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
        target: ScoutStatus,
    ) -> Result<ScoutResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::ensure_investor_access(conn, scout_id, me.user_id).await?;

        let next = found.status.transition_to(target)?;
        if next == ScoutStatus::Scheduled && found.program_launch_date.is_none() {
            return Err(AppError::bad_request(
                "예약하려면 프로그램 시작일이 필요합니다.",
            ));
        }

        let now = Utc::now().naive_utc();
        let result = scout::Entity::update_many()
            .set(scout::ActiveModel {
                status: Set(next),
                is_locked: Set(next.is_locked()),
                is_archived: Set(next == ScoutStatus::Archived),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(scout::Column::ScoutId.eq(scout_id))
            .filter(scout::Column::Status.eq(found.status))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::stale_status());
        }

        info!(scout_id, from = ?found.status, to = ?next, "Scout status changed");
        Ok(scout::Model {
            status: next,
            is_locked: next.is_locked(),
            is_archived: next == ScoutStatus::Archived,
            updated_at: now,
            ..found
        }
        .into())
    }

    /// 다른 다프타를 공동 운영자로 초대
    ///
    /// 소유 다프타의 멤버만 초대할 수 있습니다.
    pub async fn invite_collaborator<C>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
        daftar_id: i64,
    ) -> Result<(), AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::ensure_investor_access(conn, scout_id, me.user_id).await?;

        let my_daftars = DaftarService::active_daftar_ids(conn, me.user_id).await?;
        let owner_link = daftar_scout::Entity::find()
            .filter(daftar_scout::Column::ScoutId.eq(scout_id))
            .filter(daftar_scout::Column::IsOwner.eq(true))
            .filter(daftar_scout::Column::DaftarId.is_in(my_daftars))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::forbidden("스카우트 소유 다프타의 멤버만 초대할 수 있습니다."))?;

        let target = daftar::Entity::find_by_id(daftar_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 다프타입니다."))?;

        let existing = daftar_scout::Entity::find()
            .filter(daftar_scout::Column::ScoutId.eq(scout_id))
            .filter(daftar_scout::Column::DaftarId.eq(daftar_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("이미 연결되었거나 초대된 다프타입니다."));
        }

        let owner = daftar::Entity::find_by_id(owner_link.daftar_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 다프타입니다."))?;
        let recipients = DaftarService::active_member_ids(conn, &[daftar_id]).await?;

        let txn = conn.begin().await?;

        daftar_scout::ActiveModel {
            daftar_id: Set(daftar_id),
            scout_id: Set(scout_id),
            is_pending: Set(true),
            is_owner: Set(false),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::ScoutCollaboration,
            NotificationRole::Investor,
            &recipients,
            json!({
                "scoutId": scout_id,
                "scoutName": found.name,
                "daftarId": daftar_id,
                "daftarName": target.name,
                "ownerDaftarName": owner.name,
                "actorName": me.name,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(scout_id, daftar_id, "Scout collaboration requested");
        Ok(())
    }

    /// 공동 운영 초대 수락
    pub async fn accept_collaboration<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
        daftar_id: i64,
    ) -> Result<(), AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        DaftarService::ensure_active_member(conn, daftar_id, me.user_id).await?;

        let link = daftar_scout::Entity::find()
            .filter(daftar_scout::Column::ScoutId.eq(scout_id))
            .filter(daftar_scout::Column::DaftarId.eq(daftar_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("받은 공동 운영 초대가 없습니다."))?;
        if !link.is_pending {
            return Err(AppError::invalid_transition("이미 수락된 공동 운영 초대입니다."));
        }

        let mut active: daftar_scout::ActiveModel = link.into();
        active.is_pending = Set(false);
        active.update(conn).await?;

        info!(scout_id, daftar_id, "Scout collaboration accepted");
        Ok(())
    }

    /// 다프타의 스카우트 목록 (공동 운영 초대 대기 포함)
    pub async fn list_daftar_scouts<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        daftar_id: i64,
    ) -> Result<Vec<DaftarScoutItem>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        DaftarService::ensure_active_member(conn, daftar_id, me.user_id).await?;

        let rows = daftar_scout::Entity::find()
            .filter(daftar_scout::Column::DaftarId.eq(daftar_id))
            .find_also_related(scout::Entity)
            .order_by_desc(daftar_scout::Column::CreatedAt)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(link, found)| found.map(|s| DaftarScoutItem::from_parts(link, s)))
            .collect())
    }

    /// 창업자에게 열린 스카우트 목록
    ///
    /// ACTIVE이고 마감일이 지나지 않았으며 대상 조건이 맞는 스카우트만 반환합니다.
    pub async fn list_open_scouts<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<Vec<ScoutResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Founder)?;

        let today = Utc::now().date_naive();
        let age = me
            .date_of_birth
            .map(|dob| calculate_age(dob, today))
            .transpose()?;

        let scouts = scout::Entity::find()
            .filter(scout::Column::Status.eq(ScoutStatus::Active))
            .filter(
                scout::Column::LastDayToPitch
                    .is_null()
                    .or(scout::Column::LastDayToPitch.gte(today)),
            )
            .order_by_asc(scout::Column::LastDayToPitch)
            .all(conn)
            .await?;

        Ok(scouts
            .into_iter()
            .filter(|s| s.is_open_for_pitches(today))
            .filter(|s| s.matches_founder(age, me.gender, me.location.as_deref()))
            .map(ScoutResponse::from)
            .collect())
    }

    /// 스카우트 통계
    pub async fn get_insights<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
    ) -> Result<ScoutInsights, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        Self::ensure_investor_access(conn, scout_id, me.user_id).await?;

        let pitches = pitch::Entity::find()
            .filter(pitch::Column::ScoutId.eq(scout_id))
            .filter(pitch::Column::Status.ne(PitchStatus::Deleted))
            .all(conn)
            .await?;
        let pitch_ids: Vec<i64> = pitches.iter().map(|p| p.pitch_id).collect();
        let statuses: Vec<PitchStatus> = pitches.iter().map(|p| p.status).collect();

        let (founders, ratings) = if pitch_ids.is_empty() {
            (Vec::new(), Vec::new())
        } else {
            let members = pitch_team::Entity::find()
                .filter(pitch_team::Column::PitchId.is_in(pitch_ids.clone()))
                .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Active))
                .find_also_related(user::Entity)
                .all(conn)
                .await?;

            let today = Utc::now().date_naive();
            let mut unique: HashMap<i64, FounderSample> = HashMap::new();
            for founder in members.into_iter().filter_map(|(_, founder)| founder) {
                let age = founder
                    .date_of_birth
                    .and_then(|dob| calculate_age(dob, today).ok());
                unique.insert(
                    founder.user_id,
                    FounderSample {
                        gender: founder.gender,
                        age,
                    },
                );
            }

            let ratings = investor_pitch::Entity::find()
                .select_only()
                .column(investor_pitch::Column::BelieveRating)
                .filter(investor_pitch::Column::PitchId.is_in(pitch_ids))
                .filter(investor_pitch::Column::IsSubmitted.eq(true))
                .into_tuple::<i32>()
                .all(conn)
                .await?;

            (unique.into_values().collect::<Vec<_>>(), ratings)
        };

        Ok(ScoutInsights {
            scout_id,
            total_pitches: statuses.len() as u64,
            status_counts: insight::count_statuses(&statuses),
            gender_ratio: insight::gender_ratio(&founders),
            average_founder_age: insight::average_age(&founders),
            nps: insight::nps(&ratings),
        })
    }

    /// 스카우트에 연결된 질문인지 확인
    pub async fn ensure_question_of<C: ConnectionTrait>(
        conn: &C,
        scout_id: i64,
        question_id: i64,
    ) -> Result<scout_question::Model, AppError> {
        let question = scout_question::Entity::find_by_id(question_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 질문입니다."))?;
        if question.scout_id != scout_id {
            return Err(AppError::bad_request("해당 스카우트의 질문이 아닙니다."));
        }
        Ok(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, IntoMockRow, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    #[test]
    fn inverted_age_range_should_be_rejected() {
        assert!(matches!(
            check_schedule_and_audience(Some(40), Some(30), None, None),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn last_day_before_launch_should_be_rejected() {
        let launch = NaiveDate::from_ymd_opt(2026, 5, 1);
        let last_day = NaiveDate::from_ymd_opt(2026, 4, 30);

        assert!(check_schedule_and_audience(None, None, launch, last_day).is_err());
        assert!(check_schedule_and_audience(Some(18), Some(18), launch, launch).is_ok());
    }

    #[test]
    fn empty_question_list_should_fall_back_to_defaults() {
        let models: Vec<_> = question_models(3, Vec::new()).collect();

        assert_eq!(models.len(), DEFAULT_QUESTIONS.len());
        assert_eq!(models[0].position, Set(1));
        assert_eq!(models[0].scout_id, Set(3));
    }

    #[test]
    fn supplied_questions_should_keep_order() {
        let models: Vec<_> =
            question_models(3, vec![" First ".to_string(), "Second".to_string()]).collect();

        assert_eq!(models.len(), 2);
        assert_eq!(models[0].question, Set("First".to_string()));
        assert_eq!(models[1].position, Set(2));
    }

    #[tokio::test]
    async fn status_changed_by_collaborator_should_report_stale_status() {
        // Arrange
        let now = Utc::now().naive_utc();
        let investor = user::Model {
            user_id: 8,
            name: "Meera".to_string(),
            email: "meera@blume.vc".to_string(),
            role: UserRole::Investor,
            phone: None,
            gender: None,
            date_of_birth: None,
            location: None,
            preferred_languages: json!([]),
            deleted_on: None,
            created_at: now,
            updated_at: now,
        };
        let planning = scout::Model {
            scout_id: 4,
            name: "Agritech 2026".to_string(),
            description: None,
            location: None,
            min_age: None,
            max_age: None,
            gender: None,
            community: None,
            sector: None,
            stage: None,
            program_launch_date: None,
            last_day_to_pitch: None,
            status: ScoutStatus::Planning,
            is_locked: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor.into_mock_row()]])
            .append_query_results([vec![
                BTreeMap::from([("daftar_id", Value::from(2_i64))]).into_mock_row(),
            ]])
            .append_query_results([vec![daftar_scout::Model {
                daftar_scout_id: 1,
                daftar_id: 2,
                scout_id: 4,
                is_pending: false,
                is_owner: true,
                created_at: now,
            }
            .into_mock_row()]])
            .append_query_results([vec![planning.into_mock_row()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        // Act
        let result = ScoutService::change_status(&db, 8, 4, ScoutStatus::Active).await;

        // Assert
        assert!(matches!(result, Err(AppError::InvalidStatusTransition(_))));
    }
}
