use crate::schema::{Constrained, Constraint, Rule};
use sea_orm::entity::prelude::*;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub submission_id: i32,
    pub rating: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub reviewed_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::video_submission::Entity",
        from = "Column::SubmissionId",
        to = "crate::video_submission::Column::Id"
    )]
    VideoSubmission,
}

impl Related<crate::video_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoSubmission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const CONSTRAINTS: &[Constraint<Column>] = &[
    Constraint::new(Column::SubmissionId, Rule::References("video_submissions")),
    Constraint::new(
        Column::Rating,
        Rule::Between(MIN_RATING as i64, MAX_RATING as i64),
    ),
    Constraint::new(Column::ReviewedAt, Rule::Required),
];

impl Constrained for Entity {
    fn constraints() -> &'static [Constraint<Column>] {
        CONSTRAINTS
    }
}
