use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde_json::Value;
use tracing::info;

use crate::config::AppConfig;
use crate::utils::age::calculate_age;
use crate::utils::error::AppError;
use crate::utils::jwt::{decode_signup_token, encode_token};

use super::dto::{ProfileResponse, SignupRequest, SignupResponse, UpdateProfileRequest};
use super::entity::user::{self, UserRole};

pub struct UserService;

impl UserService {
    /// 탈퇴하지 않은 사용자 조회
    ///
    /// 토큰은 유효하지만 탈퇴했거나 존재하지 않는 사용자는 401로 처리합니다.
    pub async fn find_active_user<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<user::Model, AppError> {
        user::Entity::find_by_id(user_id)
            .one(conn)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| AppError::unauthorized("탈퇴했거나 존재하지 않는 사용자입니다."))
    }

    /// 역할 확인
    pub fn require_role(user: &user::Model, role: UserRole) -> Result<(), AppError> {
        if user.role == role {
            return Ok(());
        }
        let message = match role {
            UserRole::Founder => "창업자만 사용할 수 있는 기능입니다.",
            UserRole::Investor => "투자자만 사용할 수 있는 기능입니다.",
        };
        Err(AppError::forbidden(message))
    }

    /// 이메일로 활성 사용자 조회 (초대 대상 확인용)
    pub async fn find_by_email<C: ConnectionTrait>(
        conn: &C,
        email: &str,
    ) -> Result<user::Model, AppError> {
        user::Entity::find()
            .filter(user::Column::Email.eq(email.trim().to_lowercase()))
            .filter(user::Column::DeletedOn.is_null())
            .one(conn)
            .await?
            .ok_or_else(|| AppError::not_found("해당 이메일의 사용자가 없습니다."))
    }

    /// 가입 완료
    ///
    /// 외부 로그인 제공자가 발급한 Signup Token의 이메일로 사용자를 생성하고
    /// Access Token을 발급합니다.
    pub async fn complete_signup<C: ConnectionTrait>(
        conn: &C,
        config: &AppConfig,
        signup_token: &str,
        req: SignupRequest,
    ) -> Result<SignupResponse, AppError> {
        let email = decode_signup_token(signup_token, &config.jwt_secret)?
            .trim()
            .to_lowercase();

        let today = Utc::now().date_naive();
        if let Some(dob) = req.date_of_birth {
            calculate_age(dob, today)?;
        }

        let existing = user::Entity::find()
            .filter(user::Column::Email.eq(&email))
            .filter(user::Column::DeletedOn.is_null())
            .one(conn)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict("이미 가입된 이메일입니다."));
        }

        let now = Utc::now().naive_utc();
        let saved = user::ActiveModel {
            name: Set(req.name.trim().to_string()),
            email: Set(email),
            role: Set(req.role),
            phone: Set(req.phone),
            gender: Set(req.gender),
            date_of_birth: Set(req.date_of_birth),
            location: Set(req.location),
            preferred_languages: Set(Value::from(req.preferred_languages)),
            deleted_on: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|err| match AppError::from(err) {
            // 동시 가입은 uq_user_active_email 인덱스에서 걸러집니다.
            AppError::Conflict(_) => AppError::conflict("이미 가입된 이메일입니다."),
            other => other,
        })?;

        let access_token = encode_token(
            saved.user_id.to_string(),
            &config.jwt_secret,
            config.jwt_expiration,
        )?;

        info!(user_id = saved.user_id, role = ?saved.role, "User signed up");

        Ok(SignupResponse {
            user_id: saved.user_id,
            access_token,
        })
    }

    /// 내 프로필 조회
    pub async fn get_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
    ) -> Result<ProfileResponse, AppError> {
        let me = Self::find_active_user(conn, user_id).await?;
        Self::to_profile(&me)
    }

    /// 프로필 수정
    pub async fn update_profile<C: ConnectionTrait>(
        conn: &C,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<ProfileResponse, AppError> {
        let me = Self::find_active_user(conn, user_id).await?;

        if let Some(dob) = req.date_of_birth {
            calculate_age(dob, Utc::now().date_naive())?;
        }

        let mut active: user::ActiveModel = me.into();
        if let Some(name) = req.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(phone) = req.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(gender) = req.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(dob) = req.date_of_birth {
            active.date_of_birth = Set(Some(dob));
        }
        if let Some(location) = req.location {
            active.location = Set(Some(location));
        }
        if let Some(languages) = req.preferred_languages {
            active.preferred_languages = Set(Value::from(languages));
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let updated = active.update(conn).await?;
        Self::to_profile(&updated)
    }

    /// 회원 탈퇴 (soft delete)
    pub async fn withdraw<C: ConnectionTrait>(conn: &C, user_id: i64) -> Result<(), AppError> {
        let me = Self::find_active_user(conn, user_id).await?;

        let now = Utc::now().naive_utc();
        let mut active: user::ActiveModel = me.into();
        active.deleted_on = Set(Some(now));
        active.updated_at = Set(now);
        active.update(conn).await?;

        info!(user_id, "User withdrew");
        Ok(())
    }

    fn to_profile(model: &user::Model) -> Result<ProfileResponse, AppError> {
        let age = model
            .date_of_birth
            .map(|dob| calculate_age(dob, Utc::now().date_naive()))
            .transpose()?;
        Ok(ProfileResponse::from_model(model, age))
    }
}
