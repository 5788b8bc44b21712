use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::{FlattenTransactionResultExt, RequireRecord};
use futures_util::try_join;
use indexmap::IndexMap;
use lms_entity::enrollment::{Column, Entity as EnrollmentEntity, Model as Enrollment, Status};
use lms_entity::lesson::{self, Status as LessonStatus};
use sea_orm::prelude::DateTime;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QuerySelect, TransactionTrait,
};
use std::collections::HashMap;
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentFilter {
    pub student_id: Option<i32>,
    pub course_id: Option<i32>,
    pub status: Option<Status>,
    /// Enrolled on or after.
    pub enrolled_from: Option<DateTime>,
    /// Enrolled strictly before.
    pub enrolled_before: Option<DateTime>,
}

impl EnrollmentFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.student_id.map(|id| Column::StudentId.eq(id)))
            .add_option(self.course_id.map(|id| Column::CourseId.eq(id)))
            .add_option(self.status.map(|status| Column::Status.eq(status)))
            .add_option(self.enrolled_from.map(|from| Column::EnrolledAt.gte(from)))
            .add_option(self.enrolled_before.map(|before| Column::EnrolledAt.lt(before)))
    }
}

/// Completed and total lesson counts of one enrollment.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

#[derive(Debug, FromQueryResult)]
struct LessonCount {
    enrollment_id: i32,
    count: i64,
}

async fn lesson_counts<C: ConnectionTrait>(
    conn: &C,
    ids: &[i32],
    status: Option<LessonStatus>,
) -> Result<HashMap<i32, u64>, AccessError> {
    let rows = lesson::Entity::find()
        .select_only()
        .column(lesson::Column::EnrollmentId)
        .column_as(lesson::Column::Id.count(), "count")
        .filter(
            Condition::all()
                .add(lesson::Column::EnrollmentId.is_in(ids.iter().copied()))
                .add_option(status.map(|status| lesson::Column::Status.eq(status))),
        )
        .group_by(lesson::Column::EnrollmentId)
        .into_model::<LessonCount>()
        .all(conn)
        .await
        .inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, enrollments = ids.len(), "failed to count lessons");
        })?;
    Ok(rows
        .into_iter()
        .map(|row| (row.enrollment_id, u64::try_from(row.count).unwrap_or_default()))
        .collect())
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Enrollment, AccessError> {
        EnrollmentEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load enrollment");
            })
            .require("enrollments", id)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &EnrollmentFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<Enrollment>, AccessError> {
        fetch_page(
            conn,
            EnrollmentEntity::find().filter(filter.condition()),
            Column::Id,
            Column::EnrolledAt,
            order,
            page,
        )
        .await
    }

    /// Lesson counts of an enrollment. An unknown enrollment has no lessons.
    pub async fn progress<C>(conn: &C, id: i32) -> Result<Progress, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let progress = Self::progress_of(conn, &[id]).await?;
        Ok(progress.get(&id).copied().unwrap_or_default())
    }

    /// Lesson counts of several enrollments, keyed by enrollment id in ascending order.
    ///
    /// Two grouped statements in one transaction. Every requested id is present, unknown ones
    /// with zero counts.
    pub async fn progress_of<C>(conn: &C, ids: &[i32]) -> Result<IndexMap<i32, Progress>, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(IndexMap::new());
        }

        conn.transaction::<_, IndexMap<i32, Progress>, AccessError>(|txn| {
            Box::pin(async move {
                let (completed, total) = try_join!(
                    lesson_counts(txn, &ids, Some(LessonStatus::Completed)),
                    lesson_counts(txn, &ids, None)
                )?;
                Ok(ids
                    .iter()
                    .map(|id| {
                        let progress = Progress {
                            completed: completed.get(id).copied().unwrap_or_default(),
                            total: total.get(id).copied().unwrap_or_default(),
                        };
                        (*id, progress)
                    })
                    .collect())
            })
        })
        .await
        .flatten_res()
    }
}
