use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daftar")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub daftar_id: i64,
    pub name: String,
    /// 조직 구조 (예: Angel Network, VC Fund)
    pub structure: String,
    pub website: Option<String>,
    pub location: Option<String>,
    pub created_by: i64,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::user::entity::user::Entity",
        from = "Column::CreatedBy",
        to = "crate::domain::user::entity::user::Column::UserId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Creator,
    #[sea_orm(has_many = "super::daftar_investor::Entity")]
    DaftarInvestor,
    #[sea_orm(has_many = "crate::domain::scout::entity::daftar_scout::Entity")]
    DaftarScout,
}

impl Related<crate::domain::user::entity::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::daftar_investor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DaftarInvestor.def()
    }
}

impl Related<crate::domain::scout::entity::daftar_scout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DaftarScout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
