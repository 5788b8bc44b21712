use crate::schema::{Constrained, Constraint, Rule};
use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Status {
    #[sea_orm(string_value = "submitted")]
    Submitted,
    #[sea_orm(string_value = "reviewed")]
    Reviewed,
    #[sea_orm(string_value = "revised")]
    Revised,
}

pub const STATUS_VALUES: &[&str] = &["submitted", "reviewed", "revised"];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "video_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub lesson_id: i32,
    pub title: String,
    #[sea_orm(nullable)]
    pub video_url: Option<String>,
    pub submitted_at: DateTime,
    pub status: Status,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::lesson::Entity",
        from = "Column::LessonId",
        to = "crate::lesson::Column::Id"
    )]
    Lesson,
    #[sea_orm(has_many = "crate::review::Entity")]
    Review,
}

impl Related<crate::lesson::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lesson.def()
    }
}

impl Related<crate::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const CONSTRAINTS: &[Constraint<Column>] = &[
    Constraint::new(Column::LessonId, Rule::References("lessons")),
    Constraint::new(Column::Title, Rule::Required),
    Constraint::new(Column::SubmittedAt, Rule::Required),
    Constraint::new(Column::Status, Rule::Required),
    Constraint::new(Column::Status, Rule::OneOf(STATUS_VALUES)),
];

impl Constrained for Entity {
    fn constraints() -> &'static [Constraint<Column>] {
        CONSTRAINTS
    }
}
