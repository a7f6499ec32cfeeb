use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::JoinType;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::notification::entity::notification::NotificationRole;
use crate::domain::notification::service::NotificationService;
use crate::domain::notification::template::NotificationKind;
use crate::domain::scout::entity::scout_question;
use crate::domain::scout::service::ScoutService;
use crate::domain::user::entity::user::{self, UserRole};
use crate::domain::user::service::UserService;
use crate::utils::action_token::{ActionTokenSigner, InviteAction};
use crate::utils::error::AppError;

use super::dto::{
    CreatePitchRequest, InviteMemberRequest, InviteMemberResponse, PitchAnswerItem,
    PitchDetailResponse, PitchResponse, SaveAnswerRequest, TeamInviteResult, TeamMemberItem,
};
use super::entity::pitch::{self, InvestorStatus, PitchAction, PitchStatus};
use super::entity::pitch_answer;
use super::entity::pitch_team::{self, TeamMemberStatus};

const DEFAULT_FOUNDER_DESIGNATION: &str = "Founder";

/// 팀 초대 링크 경로 (프론트엔드가 토큰을 받아 응답 API를 호출)
const TEAM_INVITE_PATH: &str = "/pitch-invite";

pub fn invite_link(base_url: &str, token: &str) -> String {
    format!(
        "{}{}?token={}",
        base_url.trim_end_matches('/'),
        TEAM_INVITE_PATH,
        token
    )
}

pub struct PitchService;

impl PitchService {
    /// 삭제되지 않은 피치 조회
    pub async fn find_pitch<C: ConnectionTrait>(
        conn: &C,
        pitch_id: i64,
    ) -> Result<pitch::Model, AppError> {
        pitch::Entity::find_by_id(pitch_id)
            .one(conn)
            .await?
            .filter(|p| p.status != PitchStatus::Deleted)
            .ok_or_else(|| AppError::not_found("존재하지 않는 피치입니다."))
    }

    /// 피치 팀의 ACTIVE 멤버인지 확인
    pub async fn ensure_team_member<C: ConnectionTrait>(
        conn: &C,
        pitch_id: i64,
        user_id: i64,
    ) -> Result<pitch_team::Model, AppError> {
        pitch_team::Entity::find()
            .filter(pitch_team::Column::PitchId.eq(pitch_id))
            .filter(pitch_team::Column::UserId.eq(user_id))
            .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Active))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 피치입니다."))
    }

    /// 피치 팀의 ACTIVE 멤버 ID (알림 수신자)
    pub async fn founder_ids<C: ConnectionTrait>(
        conn: &C,
        pitch_id: i64,
    ) -> Result<Vec<i64>, AppError> {
        let ids = pitch_team::Entity::find()
            .select_only()
            .column(pitch_team::Column::UserId)
            .filter(pitch_team::Column::PitchId.eq(pitch_id))
            .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Active))
            .into_tuple::<i64>()
            .all(conn)
            .await?;
        Ok(ids)
    }

    /// 창업자 쪽 접근 (팀 멤버)
    pub async fn authorize_founder<C: ConnectionTrait>(
        conn: &C,
        me: &user::Model,
        pitch_id: i64,
    ) -> Result<pitch::Model, AppError> {
        UserService::require_role(me, UserRole::Founder)?;
        let found = Self::find_pitch(conn, pitch_id).await?;
        Self::ensure_team_member(conn, pitch_id, me.user_id).await?;
        Ok(found)
    }

    /// 투자자 쪽 접근 (제출된 피치 + 스카우트 접근 권한)
    pub async fn authorize_investor<C: ConnectionTrait>(
        conn: &C,
        me: &user::Model,
        pitch_id: i64,
    ) -> Result<pitch::Model, AppError> {
        UserService::require_role(me, UserRole::Investor)?;
        let found = Self::find_pitch(conn, pitch_id).await?;

        let scout_id = found
            .scout_id
            .filter(|_| found.status.is_visible_to_investors())
            .ok_or_else(|| AppError::not_found("존재하지 않는 피치입니다."))?;
        ScoutService::ensure_investor_access(conn, scout_id, me.user_id).await?;

        Ok(found)
    }

    /// 역할에 따라 창업자/투자자 접근을 확인
    pub async fn authorize_viewer<C: ConnectionTrait>(
        conn: &C,
        me: &user::Model,
        pitch_id: i64,
    ) -> Result<pitch::Model, AppError> {
        match me.role {
            UserRole::Founder => Self::authorize_founder(conn, me, pitch_id).await,
            UserRole::Investor => Self::authorize_investor(conn, me, pitch_id).await,
        }
    }

    /// 읽은 시점의 상태가 그대로일 때만 갱신 (0행이면 동시 요청에 밀린 것)
    async fn compare_and_set<C: ConnectionTrait>(
        conn: &C,
        found: &pitch::Model,
        changes: pitch::ActiveModel,
    ) -> Result<(), AppError> {
        let result = pitch::Entity::update_many()
            .set(changes)
            .filter(pitch::Column::PitchId.eq(found.pitch_id))
            .filter(pitch::Column::Status.eq(found.status))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::stale_status());
        }
        Ok(())
    }

    /// 상태 전이 적용 후 저장
    async fn apply_action<C: ConnectionTrait>(
        conn: &C,
        found: pitch::Model,
        action: PitchAction,
    ) -> Result<pitch::Model, AppError> {
        let next = found.status.apply(action)?;
        let now = Utc::now().naive_utc();

        Self::compare_and_set(
            conn,
            &found,
            pitch::ActiveModel {
                status: Set(next),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;

        info!(pitch_id = found.pitch_id, from = ?found.status, to = ?next, ?action, "Pitch status changed");
        Ok(pitch::Model {
            status: next,
            updated_at: now,
            ..found
        })
    }

    async fn scout_name<C: ConnectionTrait>(
        conn: &C,
        scout_id: Option<i64>,
    ) -> Result<String, AppError> {
        match scout_id {
            Some(id) => Ok(ScoutService::find_scout(conn, id).await?.name),
            None => Ok(String::new()),
        }
    }

    /// 피치 생성 (DRAFT + 생성자 팀 등록)
    pub async fn create_pitch<C>(
        conn: &C,
        user_id: i64,
        req: CreatePitchRequest,
    ) -> Result<PitchResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Founder)?;

        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let saved = pitch::ActiveModel {
            pitch_name: Set(req.pitch_name.trim().to_string()),
            scout_id: Set(None),
            status: Set(PitchStatus::Draft),
            investor_status: Set(InvestorStatus::New),
            is_completed: Set(false),
            is_paid: Set(false),
            is_locked: Set(false),
            created_by: Set(me.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        pitch_team::ActiveModel {
            pitch_id: Set(saved.pitch_id),
            user_id: Set(me.user_id),
            designation: Set(req
                .designation
                .unwrap_or_else(|| DEFAULT_FOUNDER_DESIGNATION.to_string())),
            status: Set(TeamMemberStatus::Active),
            invited_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(pitch_id = saved.pitch_id, created_by = me.user_id, "Pitch created");
        Ok(saved.into())
    }

    /// 내가 팀 멤버인 피치 목록
    pub async fn list_my_pitches<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<Vec<PitchResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Founder)?;

        let pitches = pitch::Entity::find()
            .join(JoinType::InnerJoin, pitch::Relation::PitchTeam.def())
            .filter(pitch_team::Column::UserId.eq(me.user_id))
            .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Active))
            .filter(pitch::Column::Status.ne(PitchStatus::Deleted))
            .order_by_desc(pitch::Column::UpdatedAt)
            .all(conn)
            .await?;

        Ok(pitches.into_iter().map(PitchResponse::from).collect())
    }

    /// 피치 상세 (답변, 팀 포함)
    pub async fn get_pitch<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<PitchDetailResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_viewer(conn, &me, pitch_id).await?;

        let answers = found
            .find_related(pitch_answer::Entity)
            .order_by_asc(pitch_answer::Column::QuestionId)
            .all(conn)
            .await?
            .into_iter()
            .map(PitchAnswerItem::from)
            .collect();
        let team = Self::team_of(conn, pitch_id).await?;

        Ok(PitchDetailResponse {
            pitch: found.into(),
            answers,
            team,
        })
    }

    async fn team_of<C: ConnectionTrait>(
        conn: &C,
        pitch_id: i64,
    ) -> Result<Vec<TeamMemberItem>, AppError> {
        let rows = pitch_team::Entity::find()
            .filter(pitch_team::Column::PitchId.eq(pitch_id))
            .find_also_related(user::Entity)
            .order_by_asc(pitch_team::Column::InvitedAt)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(member, founder)| {
                founder
                    .filter(|u| !u.is_deleted())
                    .map(|u| TeamMemberItem::from_parts(member, u))
            })
            .collect())
    }

    /// 질문별 영상 답변 저장 (DRAFT일 때만)
    pub async fn save_answer<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        req: SaveAnswerRequest,
    ) -> Result<PitchAnswerItem, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_founder(conn, &me, pitch_id).await?;
        if found.status != PitchStatus::Draft {
            return Err(AppError::invalid_transition(
                "제출된 피치의 답변은 수정할 수 없습니다.",
            ));
        }

        match found.scout_id {
            Some(scout_id) => {
                ScoutService::ensure_question_of(conn, scout_id, req.question_id).await?;
            }
            None => {
                scout_question::Entity::find_by_id(req.question_id)
                    .one(conn)
                    .await?
                    .ok_or_else(|| AppError::not_found("존재하지 않는 질문입니다."))?;
            }
        }

        let now = Utc::now().naive_utc();
        let existing = pitch_answer::Entity::find()
            .filter(pitch_answer::Column::PitchId.eq(pitch_id))
            .filter(pitch_answer::Column::QuestionId.eq(req.question_id))
            .one(conn)
            .await?;

        let saved = match existing {
            Some(answer) => {
                let mut active: pitch_answer::ActiveModel = answer.into();
                active.video_url = Set(req.video_url);
                active.updated_at = Set(now);
                active.update(conn).await?
            }
            None => {
                pitch_answer::ActiveModel {
                    pitch_id: Set(pitch_id),
                    question_id: Set(req.question_id),
                    video_url: Set(req.video_url),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?
            }
        };

        Ok(saved.into())
    }

    /// 피치 제출 (DRAFT → INBOX)
    ///
    /// 스카우트가 모집 중이고 모든 질문에 답변했을 때만 제출할 수 있습니다.
    /// 제출과 투자자 알림 큐 적재는 하나의 트랜잭션입니다.
    pub async fn submit_pitch<C>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        scout_id: i64,
    ) -> Result<PitchResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_founder(conn, &me, pitch_id).await?;

        if found.scout_id.is_some_and(|current| current != scout_id) {
            return Err(AppError::bad_request(
                "다른 스카우트를 대상으로 작성된 피치입니다.",
            ));
        }

        let scout = ScoutService::find_scout(conn, scout_id).await?;
        if !scout.is_open_for_pitches(Utc::now().date_naive()) {
            return Err(AppError::bad_request("피치를 받지 않는 스카우트입니다."));
        }

        let question_ids: HashSet<i64> = scout_question::Entity::find()
            .select_only()
            .column(scout_question::Column::ScoutQuestionId)
            .filter(scout_question::Column::ScoutId.eq(scout_id))
            .into_tuple::<i64>()
            .all(conn)
            .await?
            .into_iter()
            .collect();
        let answered: HashSet<i64> = pitch_answer::Entity::find()
            .select_only()
            .column(pitch_answer::Column::QuestionId)
            .filter(pitch_answer::Column::PitchId.eq(pitch_id))
            .into_tuple::<i64>()
            .all(conn)
            .await?
            .into_iter()
            .collect();
        if !question_ids.is_subset(&answered) {
            return Err(AppError::bad_request("모든 질문에 답변해야 제출할 수 있습니다."));
        }

        let next = found.status.apply(PitchAction::Submit)?;
        let recipients = ScoutService::investor_ids(conn, scout_id).await?;

        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        Self::compare_and_set(
            &txn,
            &found,
            pitch::ActiveModel {
                scout_id: Set(Some(scout_id)),
                status: Set(next),
                is_completed: Set(true),
                is_locked: Set(true),
                updated_at: Set(now),
                ..Default::default()
            },
        )
        .await?;
        let updated = pitch::Model {
            scout_id: Some(scout_id),
            status: next,
            is_completed: true,
            is_locked: true,
            updated_at: now,
            ..found
        };

        NotificationService::dispatch(
            &txn,
            NotificationKind::PitchSubmitted,
            NotificationRole::Investor,
            &recipients,
            json!({
                "pitchId": pitch_id,
                "pitchName": updated.pitch_name,
                "scoutId": scout_id,
                "scoutName": scout.name,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(pitch_id, scout_id, "Pitch submitted");
        Ok(updated.into())
    }

    /// 피치 철회 (창업자)
    pub async fn withdraw_pitch<C>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<PitchResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_founder(conn, &me, pitch_id).await?;

        let was_visible = found.status.is_visible_to_investors();
        let scout_id = found.scout_id;
        let scout_name = Self::scout_name(conn, scout_id).await?;
        let recipients = match scout_id {
            Some(id) if was_visible => ScoutService::investor_ids(conn, id).await?,
            _ => Vec::new(),
        };

        let txn = conn.begin().await?;
        let updated = Self::apply_action(&txn, found, PitchAction::Withdraw).await?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::PitchWithdrawn,
            NotificationRole::Investor,
            &recipients,
            json!({
                "pitchId": pitch_id,
                "pitchName": updated.pitch_name,
                "scoutName": scout_name,
            }),
        )
        .await?;

        txn.commit().await?;
        Ok(updated.into())
    }

    /// 피치 삭제 (창업자, DRAFT/WITHDRAWN/DECLINED에서만)
    pub async fn delete_pitch<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<(), AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_founder(conn, &me, pitch_id).await?;

        Self::apply_action(conn, found, PitchAction::Delete).await?;
        Ok(())
    }

    /// 피치 수락/거절 (투자자)
    pub async fn decide_pitch<C>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        accept: bool,
    ) -> Result<PitchResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_investor(conn, &me, pitch_id).await?;

        let (action, kind) = if accept {
            (PitchAction::Accept, NotificationKind::PitchAccepted)
        } else {
            (PitchAction::Decline, NotificationKind::PitchDeclined)
        };
        let scout_name = Self::scout_name(conn, found.scout_id).await?;
        let recipients = Self::founder_ids(conn, pitch_id).await?;

        let txn = conn.begin().await?;
        let updated = Self::apply_action(&txn, found, action).await?;

        NotificationService::dispatch(
            &txn,
            kind,
            NotificationRole::Founder,
            &recipients,
            json!({
                "pitchId": pitch_id,
                "pitchName": updated.pitch_name,
                "scoutName": scout_name,
                "actorName": me.name,
            }),
        )
        .await?;

        txn.commit().await?;
        Ok(updated.into())
    }

    /// 스카우트에 제출된 피치 목록 (투자자)
    pub async fn list_scout_pitches<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        scout_id: i64,
        status: Option<PitchStatus>,
    ) -> Result<Vec<PitchResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Investor)?;
        ScoutService::ensure_investor_access(conn, scout_id, me.user_id).await?;

        let statuses: Vec<PitchStatus> = match status {
            Some(s) if s.is_visible_to_investors() => vec![s],
            Some(_) => return Ok(Vec::new()),
            None => vec![PitchStatus::Inbox, PitchStatus::Accepted, PitchStatus::Declined],
        };

        let pitches = pitch::Entity::find()
            .filter(pitch::Column::ScoutId.eq(scout_id))
            .filter(pitch::Column::Status.is_in(statuses))
            .order_by_desc(pitch::Column::UpdatedAt)
            .all(conn)
            .await?;

        Ok(pitches.into_iter().map(PitchResponse::from).collect())
    }

    /// 팀원 초대
    ///
    /// PENDING 팀 행을 만들고, 수락/거절 서명 링크를 담은 `team/invite` 메일을 큐에 넣습니다.
    pub async fn invite_member<C>(
        conn: &C,
        signer: &ActionTokenSigner,
        app_base_url: &str,
        user_id: i64,
        pitch_id: i64,
        req: InviteMemberRequest,
    ) -> Result<InviteMemberResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::authorize_founder(conn, &me, pitch_id).await?;

        let target = UserService::find_by_email(conn, &req.email).await?;
        if target.role != UserRole::Founder {
            return Err(AppError::bad_request("창업자만 피치 팀에 초대할 수 있습니다."));
        }

        let existing = pitch_team::Entity::find()
            .filter(pitch_team::Column::PitchId.eq(pitch_id))
            .filter(pitch_team::Column::UserId.eq(target.user_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("이미 초대되었거나 팀에 속한 사용자입니다."));
        }

        let issued_at = Utc::now().timestamp();
        let sign = |action| {
            signer
                .sign(target.user_id, pitch_id, action, issued_at)
                .map_err(|e| AppError::internal_error(format!("초대 토큰 생성 실패: {}", e)))
        };
        let accept_url = invite_link(app_base_url, &sign(InviteAction::Accept)?);
        let decline_url = invite_link(app_base_url, &sign(InviteAction::Decline)?);

        let txn = conn.begin().await?;

        let saved = pitch_team::ActiveModel {
            pitch_id: Set(pitch_id),
            user_id: Set(target.user_id),
            designation: Set(req.designation.trim().to_string()),
            status: Set(TeamMemberStatus::Pending),
            invited_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::TeamInvite,
            NotificationRole::Founder,
            &[target.user_id],
            json!({
                "pitchId": pitch_id,
                "pitchName": found.pitch_name,
                "actorName": me.name,
                "designation": saved.designation,
                "acceptUrl": accept_url,
                "declineUrl": decline_url,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(pitch_id, invitee = target.user_id, "Team member invited");

        Ok(InviteMemberResponse {
            pitch_team_id: saved.pitch_team_id,
            user_id: target.user_id,
            status: saved.status,
        })
    }

    /// 서명된 링크 토큰으로 팀 초대 응답
    ///
    /// 수락은 PENDING → ACTIVE, 거절은 팀 행 삭제입니다. 이미 처리된 초대는 다시 처리할 수 없습니다.
    pub async fn respond_via_token<C: ConnectionTrait>(
        conn: &C,
        signer: &ActionTokenSigner,
        token: &str,
        now: i64,
    ) -> Result<TeamInviteResult, AppError> {
        let claims = signer.verify(token, now).map_err(|e| {
            warn!(error = %e, "Rejected team invite token");
            AppError::bad_request("유효하지 않거나 만료된 초대 링크입니다.")
        })?;

        UserService::find_active_user(conn, claims.user_id).await?;
        Self::find_pitch(conn, claims.pitch_id).await?;

        let member = pitch_team::Entity::find()
            .filter(pitch_team::Column::PitchId.eq(claims.pitch_id))
            .filter(pitch_team::Column::UserId.eq(claims.user_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("처리할 팀 초대가 없습니다."))?;
        member.status.ensure_pending()?;

        // 같은 링크를 두 번 눌러도 PENDING 행만 한 번 바뀝니다.
        let rows_affected = match claims.action {
            InviteAction::Accept => {
                pitch_team::Entity::update_many()
                    .set(pitch_team::ActiveModel {
                        status: Set(TeamMemberStatus::Active),
                        ..Default::default()
                    })
                    .filter(pitch_team::Column::PitchTeamId.eq(member.pitch_team_id))
                    .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Pending))
                    .exec(conn)
                    .await?
                    .rows_affected
            }
            InviteAction::Decline => {
                pitch_team::Entity::delete_many()
                    .filter(pitch_team::Column::PitchTeamId.eq(member.pitch_team_id))
                    .filter(pitch_team::Column::Status.eq(TeamMemberStatus::Pending))
                    .exec(conn)
                    .await?
                    .rows_affected
            }
        };
        if rows_affected == 0 {
            return Err(AppError::stale_status());
        }

        info!(
            pitch_id = claims.pitch_id,
            user_id = claims.user_id,
            action = %claims.action,
            "Team invite answered"
        );

        Ok(TeamInviteResult::new(
            claims.pitch_id,
            claims.user_id,
            claims.action,
        ))
    }

    /// 피치 팀 목록
    pub async fn list_team<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<Vec<TeamMemberItem>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        Self::authorize_viewer(conn, &me, pitch_id).await?;

        Self::team_of(conn, pitch_id).await
    }
}
