use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "scout_question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub scout_question_id: i64,
    pub scout_id: i64,
    pub question: String,
    pub position: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::scout::Entity",
        from = "Column::ScoutId",
        to = "super::scout::Column::ScoutId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Scout,
}

impl Related<super::scout::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Scout.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
