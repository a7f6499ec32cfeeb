use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::user::entity::user::UserRole;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pitch_document")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pitch_document_id: i64,
    pub pitch_id: i64,
    pub uploaded_by: i64,
    /// 업로드한 쪽 (창업자/투자자)
    pub uploader_role: UserRole,
    pub file_name: String,
    pub file_url: String,
    pub is_private: bool,
    pub uploaded_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pitch::Entity",
        from = "Column::PitchId",
        to = "super::pitch::Column::PitchId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Pitch,
}

impl Related<super::pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitch.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
