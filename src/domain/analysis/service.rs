use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde_json::json;
use tracing::{debug, info};

use crate::domain::notification::entity::notification::NotificationRole;
use crate::domain::notification::service::NotificationService;
use crate::domain::notification::template::NotificationKind;
use crate::domain::pitch::entity::pitch::{self, InvestorStatus};
use crate::domain::pitch::service::PitchService;
use crate::domain::scout::service::ScoutService;
use crate::domain::user::entity::user;
use crate::domain::user::service::UserService;
use crate::utils::error::AppError;

use super::dto::{AnalysisResponse, SaveAnalysisDraftRequest, SubmitAnalysisRequest};
use super::entity::investor_pitch::{self, AnalysisStatus};

const ALREADY_SUBMITTED: &str = "이미 분석을 제출한 피치입니다.";

pub struct AnalysisService;

impl AnalysisService {
    async fn find_own<C: ConnectionTrait>(
        conn: &C,
        pitch_id: i64,
        investor_id: i64,
    ) -> Result<Option<investor_pitch::Model>, AppError> {
        let found = investor_pitch::Entity::find()
            .filter(investor_pitch::Column::PitchId.eq(pitch_id))
            .filter(investor_pitch::Column::InvestorId.eq(investor_id))
            .one(conn)
            .await?;
        Ok(found)
    }

    /// 분석 임시 저장 (투자자)
    ///
    /// 제출 전까지 DRAFT 행 하나를 덮어씁니다. 알림도, 피치 상태 변경도 없습니다.
    pub async fn save_draft<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        req: SaveAnalysisDraftRequest,
    ) -> Result<AnalysisResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_investor(conn, &me, pitch_id).await?;

        let now = Utc::now().naive_utc();
        let saved = match Self::find_own(conn, pitch_id, me.user_id).await? {
            Some(own) if own.status == AnalysisStatus::Submitted => {
                return Err(AppError::conflict(ALREADY_SUBMITTED));
            }
            Some(draft) => {
                let mut active: investor_pitch::ActiveModel = draft.into();
                active.believe_rating = Set(req.believe_rating);
                active.should_meet = Set(req.should_meet);
                active.analysis = Set(req.analysis);
                active.updated_at = Set(now);
                active.update(conn).await?
            }
            None => {
                investor_pitch::ActiveModel {
                    pitch_id: Set(pitch_id),
                    investor_id: Set(me.user_id),
                    believe_rating: Set(req.believe_rating),
                    should_meet: Set(req.should_meet),
                    analysis: Set(req.analysis),
                    status: Set(AnalysisStatus::Draft),
                    is_submitted: Set(false),
                    submitted_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(conn)
                .await?
            }
        };

        debug!(investor_pitch_id = saved.investor_pitch_id, pitch_id, "Analysis draft saved");
        Ok(AnalysisResponse::from_parts(saved, Some(me)))
    }

    /// 분석 제출 (투자자)
    ///
    /// 투자자-피치 쌍마다 분석은 하나입니다. DRAFT가 남아 있으면 그 행을 제출 상태로 바꾸고,
    /// 이미 제출했다면 Conflict입니다. 피치의 투자자 상태(REVIEW) 갱신과 같은 트랜잭션입니다.
    pub async fn submit_analysis<C>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        req: SubmitAnalysisRequest,
    ) -> Result<AnalysisResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = PitchService::authorize_investor(conn, &me, pitch_id).await?;

        let existing = Self::find_own(conn, pitch_id, me.user_id).await?;
        if existing
            .as_ref()
            .is_some_and(|a| a.status == AnalysisStatus::Submitted)
        {
            return Err(AppError::conflict(ALREADY_SUBMITTED));
        }

        let recipients: Vec<i64> = match found.scout_id {
            Some(scout_id) => ScoutService::investor_ids(conn, scout_id)
                .await?
                .into_iter()
                .filter(|id| *id != me.user_id)
                .collect(),
            None => Vec::new(),
        };

        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let saved = match existing {
            Some(draft) => {
                let mut active: investor_pitch::ActiveModel = draft.into();
                active.believe_rating = Set(req.believe_rating);
                active.should_meet = Set(req.should_meet);
                active.analysis = Set(req.analysis);
                active.status = Set(AnalysisStatus::Submitted);
                active.is_submitted = Set(true);
                active.submitted_at = Set(Some(now));
                active.updated_at = Set(now);
                active.update(&txn).await?
            }
            None => {
                investor_pitch::ActiveModel {
                    pitch_id: Set(pitch_id),
                    investor_id: Set(me.user_id),
                    believe_rating: Set(req.believe_rating),
                    should_meet: Set(req.should_meet),
                    analysis: Set(req.analysis),
                    status: Set(AnalysisStatus::Submitted),
                    is_submitted: Set(true),
                    submitted_at: Set(Some(now)),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?
            }
        };

        let pitch_name = found.pitch_name.clone();
        if found.investor_status != InvestorStatus::Review {
            let mut active: pitch::ActiveModel = found.into();
            active.investor_status = Set(InvestorStatus::Review);
            active.updated_at = Set(now);
            active.update(&txn).await?;

            info!(pitch_id, "Pitch moved to investor review");
        }

        NotificationService::dispatch(
            &txn,
            NotificationKind::AnalysisSubmitted,
            NotificationRole::Investor,
            &recipients,
            json!({
                "pitchId": pitch_id,
                "pitchName": pitch_name,
                "actorName": me.name,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(
            investor_pitch_id = saved.investor_pitch_id,
            pitch_id,
            investor_id = me.user_id,
            rating = saved.believe_rating,
            "Analysis submitted"
        );
        Ok(AnalysisResponse::from_parts(saved, Some(me)))
    }

    /// 내 분석 조회
    pub async fn get_my_analysis<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<AnalysisResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_investor(conn, &me, pitch_id).await?;

        let own = Self::find_own(conn, pitch_id, me.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("작성한 분석이 없습니다."))?;

        Ok(AnalysisResponse::from_parts(own, Some(me)))
    }

    /// 팀 분석 목록
    ///
    /// 본인 분석을 제출하기 전에는 다른 투자자의 분석을 볼 수 없습니다.
    pub async fn list_team_analyses<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<Vec<AnalysisResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_investor(conn, &me, pitch_id).await?;

        let submitted_own = Self::find_own(conn, pitch_id, me.user_id)
            .await?
            .is_some_and(|a| a.status == AnalysisStatus::Submitted);
        if !submitted_own {
            return Err(AppError::forbidden(
                "본인 분석을 제출한 후에 팀 분석을 볼 수 있습니다.",
            ));
        }

        let rows = investor_pitch::Entity::find()
            .filter(investor_pitch::Column::PitchId.eq(pitch_id))
            .filter(investor_pitch::Column::Status.eq(AnalysisStatus::Submitted))
            .find_also_related(user::Entity)
            .order_by_asc(investor_pitch::Column::SubmittedAt)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(model, investor)| AnalysisResponse::from_parts(model, investor))
            .collect())
    }
}
