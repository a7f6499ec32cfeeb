use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use tracing::info;

use crate::domain::notification::entity::notification::NotificationRole;
use crate::domain::notification::service::NotificationService;
use crate::domain::notification::template::NotificationKind;
use crate::domain::pitch::service::PitchService;
use crate::domain::user::entity::user::{self, UserRole};
use crate::domain::user::service::UserService;
use crate::utils::error::AppError;

use super::dto::{CreateOfferRequest, OfferResponse};
use super::entity::offer::{self, OfferAction, OfferStatus};

const PENDING_OFFER_EXISTS: &str = "이미 대기 중인 오퍼가 있는 피치입니다.";

pub struct OfferService;

impl OfferService {
    async fn find_offer<C: ConnectionTrait>(
        conn: &C,
        offer_id: i64,
    ) -> Result<offer::Model, AppError> {
        offer::Entity::find_by_id(offer_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 오퍼입니다."))
    }

    /// 상태 전이 적용 후 저장
    ///
    /// 읽은 시점의 상태가 그대로일 때만 갱신합니다. 그사이 다른 요청이 상태를
    /// 바꿨다면 0행이 갱신되고 `stale_status`로 실패합니다.
    async fn apply_action<C: ConnectionTrait>(
        conn: &C,
        found: offer::Model,
        action: OfferAction,
    ) -> Result<offer::Model, AppError> {
        let next = found.offer_status.apply(action)?;
        let now = Utc::now().naive_utc();

        let result = offer::Entity::update_many()
            .set(offer::ActiveModel {
                offer_status: Set(next),
                updated_at: Set(now),
                ..Default::default()
            })
            .filter(offer::Column::OfferId.eq(found.offer_id))
            .filter(offer::Column::OfferStatus.eq(found.offer_status))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::stale_status());
        }

        info!(offer_id = found.offer_id, from = ?found.offer_status, to = ?next, ?action, "Offer status changed");
        Ok(offer::Model {
            offer_status: next,
            updated_at: now,
            ..found
        })
    }

    /// 오퍼 생성 (투자자)
    ///
    /// 피치당 PENDING 오퍼는 하나뿐입니다. 트랜잭션 안에서 먼저 확인하고,
    /// 동시 요청은 부분 유니크 인덱스 위반이 같은 Conflict로 변환됩니다.
    pub async fn create_offer<C>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
        req: CreateOfferRequest,
    ) -> Result<OfferResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = PitchService::authorize_investor(conn, &me, pitch_id).await?;
        if !found.status.accepts_offers() {
            return Err(AppError::invalid_transition(format!(
                "{:?} 상태의 피치에는 오퍼를 보낼 수 없습니다.",
                found.status
            )));
        }

        let recipients = PitchService::founder_ids(conn, pitch_id).await?;
        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let pending = offer::Entity::find()
            .filter(offer::Column::PitchId.eq(pitch_id))
            .filter(offer::Column::OfferStatus.eq(OfferStatus::Pending))
            .count(&txn)
            .await?;
        if pending > 0 {
            return Err(AppError::conflict(PENDING_OFFER_EXISTS));
        }

        let saved = offer::ActiveModel {
            pitch_id: Set(pitch_id),
            offer_by: Set(me.user_id),
            offer_status: Set(OfferStatus::Pending),
            description: Set(req.description.trim().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict(PENDING_OFFER_EXISTS),
            other => other,
        })?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::OfferCreated,
            NotificationRole::Founder,
            &recipients,
            json!({
                "pitchId": pitch_id,
                "pitchName": found.pitch_name,
                "offerId": saved.offer_id,
                "actorName": me.name,
                "description": saved.description,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(offer_id = saved.offer_id, pitch_id, offer_by = me.user_id, "Offer created");
        Ok(OfferResponse::from_parts(saved, Some(me)))
    }

    /// 오퍼 수락/거절 (피치 팀 창업자)
    pub async fn respond_to_offer<C>(
        conn: &C,
        user_id: i64,
        offer_id: i64,
        accept: bool,
    ) -> Result<OfferResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        let found = Self::find_offer(conn, offer_id).await?;
        let pitch = PitchService::authorize_founder(conn, &me, found.pitch_id).await?;

        let (action, kind) = if accept {
            (OfferAction::Accept, NotificationKind::OfferAccepted)
        } else {
            (OfferAction::Decline, NotificationKind::OfferDeclined)
        };
        let investor = user::Entity::find_by_id(found.offer_by).one(conn).await?;
        let recipients = vec![found.offer_by];

        let txn = conn.begin().await?;
        let updated = Self::apply_action(&txn, found, action).await?;

        NotificationService::dispatch(
            &txn,
            kind,
            NotificationRole::Investor,
            &recipients,
            json!({
                "pitchId": pitch.pitch_id,
                "pitchName": pitch.pitch_name,
                "offerId": offer_id,
                "actorName": me.name,
            }),
        )
        .await?;

        txn.commit().await?;
        Ok(OfferResponse::from_parts(updated, investor))
    }

    /// 오퍼 철회 (오퍼를 낸 투자자만)
    pub async fn withdraw_offer<C>(
        conn: &C,
        user_id: i64,
        offer_id: i64,
    ) -> Result<OfferResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Investor)?;

        let found = Self::find_offer(conn, offer_id).await?;
        if found.offer_by != me.user_id {
            return Err(AppError::forbidden("오퍼를 낸 투자자만 철회할 수 있습니다."));
        }
        let pitch = PitchService::find_pitch(conn, found.pitch_id).await?;
        let recipients = PitchService::founder_ids(conn, pitch.pitch_id).await?;

        let txn = conn.begin().await?;
        let updated = Self::apply_action(&txn, found, OfferAction::Withdraw).await?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::OfferWithdrawn,
            NotificationRole::Founder,
            &recipients,
            json!({
                "pitchId": pitch.pitch_id,
                "pitchName": pitch.pitch_name,
                "offerId": offer_id,
                "actorName": me.name,
            }),
        )
        .await?;

        txn.commit().await?;
        Ok(OfferResponse::from_parts(updated, Some(me)))
    }

    /// 피치의 오퍼 목록 (최신순)
    pub async fn list_offers<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        pitch_id: i64,
    ) -> Result<Vec<OfferResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        PitchService::authorize_viewer(conn, &me, pitch_id).await?;

        let rows = offer::Entity::find()
            .filter(offer::Column::PitchId.eq(pitch_id))
            .find_also_related(user::Entity)
            .order_by_desc(offer::Column::CreatedAt)
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(model, investor)| OfferResponse::from_parts(model, investor))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    use crate::domain::pitch::entity::pitch::{self, InvestorStatus, PitchStatus};
    use crate::domain::pitch::entity::pitch_team::{self, TeamMemberStatus};
    use crate::domain::scout::entity::daftar_scout;
    use crate::domain::scout::entity::scout::{self, ScoutStatus};
    use crate::domain::user::entity::user::Gender;

    fn timestamp() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 1, 10)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("datetime")
    }

    fn founder(user_id: i64) -> user::Model {
        user::Model {
            user_id,
            email: format!("founder{}@daftar.os", user_id),
            name: "Asha".to_string(),
            role: UserRole::Founder,
            phone: None,
            gender: Some(Gender::Female),
            date_of_birth: None,
            location: None,
            preferred_languages: serde_json::json!([]),
            deleted_on: None,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn investor(user_id: i64) -> user::Model {
        user::Model {
            role: UserRole::Investor,
            ..founder(user_id)
        }
    }

    fn inbox_pitch() -> pitch::Model {
        pitch::Model {
            pitch_id: 5,
            pitch_name: "Chai Point".to_string(),
            scout_id: Some(4),
            status: PitchStatus::Inbox,
            investor_status: InvestorStatus::New,
            is_completed: true,
            is_paid: false,
            is_locked: true,
            created_by: 1,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn pending_offer() -> offer::Model {
        offer::Model {
            offer_id: 10,
            pitch_id: 5,
            offer_by: 2,
            offer_status: OfferStatus::Pending,
            description: "term sheet".to_string(),
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn open_scout() -> scout::Model {
        scout::Model {
            scout_id: 4,
            name: "Agritech 2025".to_string(),
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
            status: ScoutStatus::Active,
            is_locked: false,
            is_archived: false,
            created_at: timestamp(),
            updated_at: timestamp(),
        }
    }

    fn id_row(column: &str, id: i64) -> BTreeMap<String, Value> {
        BTreeMap::from([(column.to_string(), Value::from(id))])
    }

    #[tokio::test]
    async fn second_pending_offer_should_conflict() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor(2)]])
            .append_query_results([vec![inbox_pitch()]])
            .append_query_results([vec![id_row("daftar_id", 3)]])
            .append_query_results([vec![daftar_scout::Model {
                daftar_scout_id: 1,
                daftar_id: 3,
                scout_id: 4,
                is_pending: false,
                is_owner: true,
                created_at: timestamp(),
            }]])
            .append_query_results([vec![open_scout()]])
            .append_query_results([vec![id_row("user_id", 1)]])
            .append_query_results([vec![id_row("num_items", 1)]])
            .into_connection();
        let req = CreateOfferRequest {
            description: "20% for 1 crore".to_string(),
        };

        // Act
        let result = OfferService::create_offer(&db, 2, 5, req).await;

        // Assert
        match result {
            Err(AppError::Conflict(msg)) => assert_eq!(msg, PENDING_OFFER_EXISTS),
            other => panic!("expected conflict, got {:?}", other.map(|o| o.offer_id)),
        }
    }

    #[tokio::test]
    async fn offer_settled_concurrently_should_report_stale_status() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![founder(1)]])
            .append_query_results([vec![pending_offer()]])
            .append_query_results([vec![inbox_pitch()]])
            .append_query_results([vec![pitch_team::Model {
                pitch_team_id: 1,
                pitch_id: 5,
                user_id: 1,
                designation: "Founder".to_string(),
                status: TeamMemberStatus::Active,
                invited_at: timestamp(),
            }]])
            .append_query_results([vec![investor(2)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        // Act
        let result = OfferService::respond_to_offer(&db, 1, 10, true).await;

        // Assert
        assert!(matches!(result, Err(AppError::InvalidStatusTransition(_))));
    }

    #[tokio::test]
    async fn founder_should_not_withdraw_offer() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![founder(1)]])
            .into_connection();

        // Act
        let result = OfferService::withdraw_offer(&db, 1, 10).await;

        // Assert
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn missing_offer_should_be_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor(2)]])
            .append_query_results([Vec::<offer::Model>::new()])
            .into_connection();

        let result = OfferService::withdraw_offer(&db, 2, 10).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn other_investor_should_not_withdraw_offer() {
        let offer = offer::Model {
            offer_by: 99,
            ..pending_offer()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![investor(2)]])
            .append_query_results([vec![offer]])
            .into_connection();

        let result = OfferService::withdraw_offer(&db, 2, 10).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
