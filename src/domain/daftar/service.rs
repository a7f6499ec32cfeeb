use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::JoinType;
use serde_json::json;
use tracing::info;

use crate::domain::notification::entity::notification::NotificationRole;
use crate::domain::notification::service::NotificationService;
use crate::domain::notification::template::NotificationKind;
use crate::domain::user::entity::user::{self, UserRole};
use crate::domain::user::service::UserService;
use crate::utils::error::AppError;

use super::dto::{
    CreateDaftarRequest, DaftarDetailResponse, DaftarMemberItem, DaftarResponse,
    InviteInvestorRequest, InviteInvestorResponse,
};
use super::entity::daftar;
use super::entity::daftar_investor::{self, DaftarMemberStatus};

const DEFAULT_OWNER_DESIGNATION: &str = "Owner";

pub struct DaftarService;

impl DaftarService {
    /// 다프타의 ACTIVE 멤버인지 확인
    ///
    /// 멤버가 아니면 다프타 존재 여부를 숨기기 위해 404를 반환합니다.
    pub async fn ensure_active_member<C: ConnectionTrait>(
        conn: &C,
        daftar_id: i64,
        investor_id: i64,
    ) -> Result<daftar_investor::Model, AppError> {
        daftar_investor::Entity::find()
            .filter(daftar_investor::Column::DaftarId.eq(daftar_id))
            .filter(daftar_investor::Column::InvestorId.eq(investor_id))
            .filter(daftar_investor::Column::Status.eq(DaftarMemberStatus::Active))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 다프타입니다."))
    }

    /// 투자자가 ACTIVE로 소속된 다프타 ID 목록
    pub async fn active_daftar_ids<C: ConnectionTrait>(
        conn: &C,
        investor_id: i64,
    ) -> Result<Vec<i64>, AppError> {
        let ids = daftar_investor::Entity::find()
            .select_only()
            .column(daftar_investor::Column::DaftarId)
            .filter(daftar_investor::Column::InvestorId.eq(investor_id))
            .filter(daftar_investor::Column::Status.eq(DaftarMemberStatus::Active))
            .into_tuple::<i64>()
            .all(conn)
            .await?;
        Ok(ids)
    }

    /// 여러 다프타의 ACTIVE 멤버 ID 목록 (알림 수신자)
    pub async fn active_member_ids<C: ConnectionTrait>(
        conn: &C,
        daftar_ids: &[i64],
    ) -> Result<Vec<i64>, AppError> {
        if daftar_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids = daftar_investor::Entity::find()
            .select_only()
            .column(daftar_investor::Column::InvestorId)
            .filter(daftar_investor::Column::DaftarId.is_in(daftar_ids.to_vec()))
            .filter(daftar_investor::Column::Status.eq(DaftarMemberStatus::Active))
            .into_tuple::<i64>()
            .all(conn)
            .await?;
        Ok(ids)
    }

    /// 다프타 생성
    ///
    /// 다프타와 생성자의 ACTIVE 멤버십을 하나의 트랜잭션으로 저장합니다.
    pub async fn create_daftar<C>(
        conn: &C,
        user_id: i64,
        req: CreateDaftarRequest,
    ) -> Result<DaftarResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Investor)?;

        let now = Utc::now().naive_utc();
        let txn = conn.begin().await?;

        let saved = daftar::ActiveModel {
            name: Set(req.name.trim().to_string()),
            structure: Set(req.structure.trim().to_string()),
            website: Set(req.website),
            location: Set(req.location),
            created_by: Set(me.user_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        daftar_investor::ActiveModel {
            daftar_id: Set(saved.daftar_id),
            investor_id: Set(me.user_id),
            designation: Set(req
                .designation
                .unwrap_or_else(|| DEFAULT_OWNER_DESIGNATION.to_string())),
            status: Set(DaftarMemberStatus::Active),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        info!(daftar_id = saved.daftar_id, created_by = me.user_id, "Daftar created");
        Ok(saved.into())
    }

    /// 내가 ACTIVE 멤버인 다프타 목록
    pub async fn list_my_daftars<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<Vec<DaftarResponse>, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        UserService::require_role(&me, UserRole::Investor)?;

        let daftars = daftar::Entity::find()
            .join(JoinType::InnerJoin, daftar::Relation::DaftarInvestor.def())
            .filter(daftar_investor::Column::InvestorId.eq(me.user_id))
            .filter(daftar_investor::Column::Status.eq(DaftarMemberStatus::Active))
            .order_by_desc(daftar::Column::CreatedAt)
            .all(conn)
            .await?;

        Ok(daftars.into_iter().map(DaftarResponse::from).collect())
    }

    /// 다프타 상세 (멤버 포함)
    pub async fn get_daftar<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        daftar_id: i64,
    ) -> Result<DaftarDetailResponse, AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;
        Self::ensure_active_member(conn, daftar_id, me.user_id).await?;

        let found = daftar::Entity::find_by_id(daftar_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 다프타입니다."))?;

        let members = found
            .find_related(daftar_investor::Entity)
            .find_also_related(user::Entity)
            .order_by_asc(daftar_investor::Column::CreatedAt)
            .all(conn)
            .await?
            .into_iter()
            .filter_map(|(membership, investor)| {
                investor
                    .filter(|u| !u.is_deleted())
                    .map(|u| DaftarMemberItem::from_parts(membership, u))
            })
            .collect();

        Ok(DaftarDetailResponse {
            daftar: found.into(),
            members,
        })
    }

    /// 투자자 초대
    ///
    /// PENDING 멤버십을 만들고 `daftar/invite` 알림을 같은 트랜잭션에서 큐에 넣습니다.
    pub async fn invite_investor<C>(
        conn: &C,
        user_id: i64,
        daftar_id: i64,
        req: InviteInvestorRequest,
    ) -> Result<InviteInvestorResponse, AppError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let me = UserService::find_active_user(conn, user_id).await?;
        Self::ensure_active_member(conn, daftar_id, me.user_id).await?;

        let target = UserService::find_by_email(conn, &req.email).await?;
        if target.role != UserRole::Investor {
            return Err(AppError::bad_request("투자자만 다프타에 초대할 수 있습니다."));
        }

        let existing = daftar_investor::Entity::find()
            .filter(daftar_investor::Column::DaftarId.eq(daftar_id))
            .filter(daftar_investor::Column::InvestorId.eq(target.user_id))
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("이미 초대되었거나 소속된 투자자입니다."));
        }

        let found = daftar::Entity::find_by_id(daftar_id)
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("존재하지 않는 다프타입니다."))?;

        let txn = conn.begin().await?;

        let saved = daftar_investor::ActiveModel {
            daftar_id: Set(daftar_id),
            investor_id: Set(target.user_id),
            designation: Set(req.designation.trim().to_string()),
            status: Set(DaftarMemberStatus::Pending),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        NotificationService::dispatch(
            &txn,
            NotificationKind::DaftarInvite,
            NotificationRole::Investor,
            &[target.user_id],
            json!({
                "daftarId": daftar_id,
                "daftarName": found.name,
                "actorName": me.name,
                "designation": saved.designation,
            }),
        )
        .await?;

        txn.commit().await?;

        info!(daftar_id, invitee = target.user_id, "Investor invited to daftar");

        Ok(InviteInvestorResponse {
            daftar_investor_id: saved.daftar_investor_id,
            investor_id: target.user_id,
            status: saved.status,
        })
    }

    /// 초대 수락/거절
    ///
    /// 수락하면 ACTIVE로 바뀌고, 거절하면 멤버십 행이 삭제됩니다.
    pub async fn respond_to_invite<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        daftar_id: i64,
        accept: bool,
    ) -> Result<(), AppError> {
        let me = UserService::find_active_user(conn, user_id).await?;

        let membership = daftar_investor::Entity::find()
            .filter(daftar_investor::Column::DaftarId.eq(daftar_id))
            .filter(daftar_investor::Column::InvestorId.eq(me.user_id))
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("받은 다프타 초대가 없습니다."))?;

        let rows_affected = if accept {
            let next = membership.status.accept()?;
            daftar_investor::Entity::update_many()
                .set(daftar_investor::ActiveModel {
                    status: Set(next),
                    ..Default::default()
                })
                .filter(daftar_investor::Column::DaftarInvestorId.eq(membership.daftar_investor_id))
                .filter(daftar_investor::Column::Status.eq(membership.status))
                .exec(conn)
                .await?
                .rows_affected
        } else {
            membership.status.ensure_declinable()?;
            daftar_investor::Entity::delete_many()
                .filter(daftar_investor::Column::DaftarInvestorId.eq(membership.daftar_investor_id))
                .filter(daftar_investor::Column::Status.eq(membership.status))
                .exec(conn)
                .await?
                .rows_affected
        };
        if rows_affected == 0 {
            return Err(AppError::stale_status());
        }

        info!(daftar_id, investor_id = me.user_id, accept, "Daftar invite answered");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn founder() -> user::Model {
        let now = Utc::now().naive_utc();
        user::Model {
            user_id: 1,
            name: "Ravi".to_string(),
            email: "ravi@daftar.os".to_string(),
            role: UserRole::Founder,
            phone: None,
            gender: None,
            date_of_birth: None,
            location: None,
            preferred_languages: json!([]),
            deleted_on: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn founder_should_not_create_daftar() {
        // Arrange
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![founder()]])
            .into_connection();
        let req = CreateDaftarRequest {
            name: "Blume".to_string(),
            structure: "VC".to_string(),
            website: None,
            location: None,
            designation: None,
        };

        // Act
        let result = DaftarService::create_daftar(&db, 1, req).await;

        // Assert
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn non_member_should_see_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<daftar_investor::Model>::new()])
            .into_connection();

        let result = DaftarService::ensure_active_member(&db, 3, 1).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn invite_accepted_elsewhere_should_report_stale_status() {
        // Arrange
        let invited = user::Model {
            user_id: 2,
            role: UserRole::Investor,
            ..founder()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![invited]])
            .append_query_results([vec![daftar_investor::Model {
                daftar_investor_id: 8,
                daftar_id: 3,
                investor_id: 2,
                designation: "Partner".to_string(),
                status: DaftarMemberStatus::Pending,
                created_at: Utc::now().naive_utc(),
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        // Act
        let result = DaftarService::respond_to_invite(&db, 2, 3, true).await;

        // Assert
        assert!(matches!(result, Err(AppError::InvalidStatusTransition(_))));
    }
}
