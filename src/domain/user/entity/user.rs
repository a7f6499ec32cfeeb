use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 사용자 역할
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[sea_orm(string_value = "FOUNDER")]
    Founder,
    #[sea_orm(string_value = "INVESTOR")]
    Investor,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
    #[sea_orm(string_value = "OTHER")]
    Other,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<Date>,
    pub location: Option<String>,
    /// 선호 언어 목록 (JSON 문자열 배열)
    pub preferred_languages: Json,
    /// soft delete 시각
    pub deleted_on: Option<DateTime>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Model {
    pub fn is_deleted(&self) -> bool {
        self.deleted_on.is_some()
    }

    pub fn languages(&self) -> Vec<String> {
        serde_json::from_value(self.preferred_languages.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::domain::pitch::entity::pitch_team::Entity")]
    PitchTeam,
    #[sea_orm(has_many = "crate::domain::daftar::entity::daftar_investor::Entity")]
    DaftarInvestor,
}

impl Related<crate::domain::pitch::entity::pitch_team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PitchTeam.def()
    }
}

impl Related<crate::domain::daftar::entity::daftar_investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DaftarInvestor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
