use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::RequireRecord;
use lms_entity::video_submission::{Column, Entity as SubmissionEntity, Model as VideoSubmission, Status};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSubmissionFilter {
    pub lesson_id: Option<i32>,
    pub status: Option<Status>,
}

impl VideoSubmissionFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.lesson_id.map(|id| Column::LessonId.eq(id)))
            .add_option(self.status.map(|status| Column::Status.eq(status)))
    }
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<VideoSubmission, AccessError> {
        SubmissionEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load video submission");
            })
            .require("video_submissions", id)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &VideoSubmissionFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<VideoSubmission>, AccessError> {
        fetch_page(
            conn,
            SubmissionEntity::find().filter(filter.condition()),
            Column::Id,
            Column::SubmittedAt,
            order,
            page,
        )
        .await
    }
}
