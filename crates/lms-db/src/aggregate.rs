//! Scalar and grouped aggregates.
//!
//! Grouped results keep the order in which their groups first appear, that is by the lowest
//! primary key inside each group.

use crate::error::AccessError;
use crate::validate::table;
use indexmap::IndexMap;
use lms_entity::{course, enrollment, lesson, review};
use sea_orm::prelude::Decimal;
use sea_orm::sea_query::{Expr, Func, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};
use std::error::Error;

fn average(column: impl ColumnTrait) -> SimpleExpr {
    SimpleExpr::from(Func::avg(Expr::col((column.entity_name(), column))))
}

pub struct Query;

impl Query {
    /// Number of rows in the table of `E`.
    pub async fn count<E, C>(conn: &C) -> Result<u64, AccessError>
    where
        E: EntityTrait,
        E::Model: Sync,
        C: ConnectionTrait,
    {
        let count = E::find().count(conn).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, table = %table::<E>(), "failed to count rows");
        })?;
        Ok(count)
    }

    /// Mean monthly price over all courses, `None` without courses.
    pub async fn average_monthly_price<C: ConnectionTrait>(conn: &C) -> Result<Option<Decimal>, AccessError> {
        let average = course::Entity::find()
            .select_only()
            .column_as(average(course::Column::MonthlyPrice), "average")
            .into_tuple::<Option<Decimal>>()
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to average course prices");
            })?;
        Ok(average.flatten())
    }

    pub async fn enrollments_by_status<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<IndexMap<enrollment::Status, i64>, AccessError> {
        let rows: Vec<(enrollment::Status, i64)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::Status)
            .column_as(enrollment::Column::Id.count(), "count")
            .group_by(enrollment::Column::Status)
            .order_by_asc(enrollment::Column::Id.min())
            .into_tuple()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count enrollments by status");
            })?;
        Ok(rows.into_iter().collect())
    }

    pub async fn enrollments_by_course<C: ConnectionTrait>(conn: &C) -> Result<IndexMap<i32, i64>, AccessError> {
        let rows: Vec<(i32, i64)> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::CourseId)
            .column_as(enrollment::Column::Id.count(), "count")
            .group_by(enrollment::Column::CourseId)
            .order_by_asc(enrollment::Column::Id.min())
            .into_tuple()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count enrollments by course");
            })?;
        Ok(rows.into_iter().collect())
    }

    /// Completed lessons per enrollment. Enrollments without a completed lesson are absent.
    pub async fn completed_lessons_by_enrollment<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<IndexMap<i32, i64>, AccessError> {
        let rows: Vec<(i32, i64)> = lesson::Entity::find()
            .select_only()
            .column(lesson::Column::EnrollmentId)
            .column_as(lesson::Column::Id.count(), "count")
            .filter(lesson::Column::Status.eq(lesson::Status::Completed))
            .group_by(lesson::Column::EnrollmentId)
            .order_by_asc(lesson::Column::Id.min())
            .into_tuple()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to count completed lessons");
            })?;
        Ok(rows.into_iter().collect())
    }

    /// Mean rating per reviewed submission. Unrated reviews do not count; a submission whose
    /// reviews are all unrated maps to `None`.
    pub async fn average_rating_by_submission<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<IndexMap<i32, Option<Decimal>>, AccessError> {
        let rows: Vec<(i32, Option<Decimal>)> = review::Entity::find()
            .select_only()
            .column(review::Column::SubmissionId)
            .column_as(average(review::Column::Rating), "average")
            .group_by(review::Column::SubmissionId)
            .order_by_asc(review::Column::Id.min())
            .into_tuple()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to average ratings");
            })?;
        Ok(rows.into_iter().collect())
    }
}
