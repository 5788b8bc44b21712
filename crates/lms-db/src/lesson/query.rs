use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::RequireRecord;
use lms_entity::lesson::{Column, Entity as LessonEntity, Model as Lesson, Status};
use sea_orm::prelude::DateTime;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonFilter {
    pub enrollment_id: Option<i32>,
    pub status: Option<Status>,
    /// Scheduled on or after.
    pub scheduled_from: Option<DateTime>,
    /// Scheduled strictly before.
    pub scheduled_before: Option<DateTime>,
}

impl LessonFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.enrollment_id.map(|id| Column::EnrollmentId.eq(id)))
            .add_option(self.status.map(|status| Column::Status.eq(status)))
            .add_option(self.scheduled_from.map(|from| Column::ScheduledAt.gte(from)))
            .add_option(self.scheduled_before.map(|before| Column::ScheduledAt.lt(before)))
    }
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Lesson, AccessError> {
        LessonEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load lesson");
            })
            .require("lessons", id)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &LessonFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<Lesson>, AccessError> {
        fetch_page(
            conn,
            LessonEntity::find().filter(filter.condition()),
            Column::Id,
            Column::ScheduledAt,
            order,
            page,
        )
        .await
    }
}
