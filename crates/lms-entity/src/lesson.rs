use crate::schema::{Constrained, Constraint, Rule};
use sea_orm::entity::prelude::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum Status {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

pub const STATUS_VALUES: &[&str] = &["scheduled", "completed", "cancelled"];

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "lessons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub enrollment_id: i32,
    pub scheduled_at: DateTime,
    pub duration_minutes: i32,
    pub status: Status,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "crate::enrollment::Entity",
        from = "Column::EnrollmentId",
        to = "crate::enrollment::Column::Id"
    )]
    Enrollment,
    #[sea_orm(has_many = "crate::video_submission::Entity")]
    VideoSubmission,
}

impl Related<crate::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl Related<crate::video_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VideoSubmission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const CONSTRAINTS: &[Constraint<Column>] = &[
    Constraint::new(Column::EnrollmentId, Rule::References("enrollments")),
    Constraint::new(Column::ScheduledAt, Rule::Required),
    Constraint::new(Column::DurationMinutes, Rule::AtLeast(1)),
    Constraint::new(Column::Status, Rule::Required),
    Constraint::new(Column::Status, Rule::OneOf(STATUS_VALUES)),
];

impl Constrained for Entity {
    fn constraints() -> &'static [Constraint<Column>] {
        CONSTRAINTS
    }
}
