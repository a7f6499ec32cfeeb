use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 스카우트 질문에 대한 영상 답변
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pitch_answer")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub pitch_answer_id: i64,
    pub pitch_id: i64,
    pub question_id: i64,
    pub video_url: String,
    pub updated_at: DateTime,
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
    #[sea_orm(
        belongs_to = "crate::domain::scout::entity::scout_question::Entity",
        from = "Column::QuestionId",
        to = "crate::domain::scout::entity::scout_question::Column::ScoutQuestionId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Question,
}

impl Related<super::pitch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pitch.def()
    }
}

impl Related<crate::domain::scout::entity::scout_question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
