use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 다프타-스카우트 공동 소유 관계
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daftar_scout")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub daftar_scout_id: i64,
    pub daftar_id: i64,
    pub scout_id: i64,
    /// 공동 운영 초대를 아직 수락하지 않은 상태
    pub is_pending: bool,
    /// 스카우트를 만든 다프타
    pub is_owner: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::domain::daftar::entity::daftar::Entity",
        from = "Column::DaftarId",
        to = "crate::domain::daftar::entity::daftar::Column::DaftarId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Daftar,
    #[sea_orm(
        belongs_to = "super::scout::Entity",
        from = "Column::ScoutId",
        to = "super::scout::Column::ScoutId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Scout,
}

impl Related<crate::domain::daftar::entity::daftar::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Daftar.def()
    }
}

impl Related<super::scout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
