use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::user::entity::user::UserRole;

/// Which side of the platform a notification is meant for
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationRole {
    #[sea_orm(string_value = "FOUNDER")]
    Founder,
    #[sea_orm(string_value = "INVESTOR")]
    Investor,
    #[sea_orm(string_value = "BOTH")]
    Both,
}

impl NotificationRole {
    pub fn matches(self, role: UserRole) -> bool {
        match self {
            NotificationRole::Both => true,
            NotificationRole::Founder => role == UserRole::Founder,
            NotificationRole::Investor => role == UserRole::Investor,
        }
    }
}

impl From<UserRole> for NotificationRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Founder => NotificationRole::Founder,
            UserRole::Investor => NotificationRole::Investor,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub notification_id: i64,
    pub notification_type: String,
    pub subtype: String,
    pub role: NotificationRole,
    /// Recipient user ids (JSON array)
    pub targeted_users: Json,
    pub payload: Json,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification_delivery::Entity")]
    NotificationDelivery,
}

impl Related<super::notification_delivery::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationDelivery.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
