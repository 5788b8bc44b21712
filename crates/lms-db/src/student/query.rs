use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::RequireRecord;
use lms_entity::enrollment::{self, Status as EnrollmentStatus};
use lms_entity::student::{Column, Entity as StudentEntity, Model as Student};
use sea_orm::prelude::DateTime;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use std::collections::HashSet;
use std::error::Error;

/// Student list filter. Unset fields match every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentFilter {
    pub name: Option<String>,
    /// Enrolled on or after.
    pub enrolled_from: Option<DateTime>,
    /// Enrolled strictly before.
    pub enrolled_before: Option<DateTime>,
}

impl StudentFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.name.as_deref().map(|name| Column::Name.eq(name)))
            .add_option(self.enrolled_from.map(|from| Column::EnrollmentDate.gte(from)))
            .add_option(self.enrolled_before.map(|before| Column::EnrollmentDate.lt(before)))
    }
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Student, AccessError> {
        StudentEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load student");
            })
            .require("students", id)
    }

    pub async fn find_by_email<C: ConnectionTrait>(conn: &C, email: &str) -> Result<Option<Student>, AccessError> {
        let student = StudentEntity::find()
            .filter(Column::Email.eq(email))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to load student by email");
            })?;
        Ok(student)
    }

    /// Students matching `filter`, ordered by key or by enrollment date.
    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &StudentFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<Student>, AccessError> {
        fetch_page(
            conn,
            StudentEntity::find().filter(filter.condition()),
            Column::Id,
            Column::EnrollmentDate,
            order,
            page,
        )
        .await
    }

    /// Whether the student holds at least one active enrollment. Unknown students have none.
    pub async fn has_active_enrollment<C: ConnectionTrait>(conn: &C, id: i32) -> Result<bool, AccessError> {
        let enrollment = enrollment::Entity::find()
            .filter(enrollment::Column::StudentId.eq(id))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Active))
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to look up active enrollment");
            })?;
        Ok(enrollment.is_some())
    }

    /// The subset of `ids` holding at least one active enrollment, in one statement.
    pub async fn with_active_enrollment<C: ConnectionTrait>(
        conn: &C,
        ids: &[i32],
    ) -> Result<HashSet<i32>, AccessError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let active: Vec<i32> = enrollment::Entity::find()
            .select_only()
            .column(enrollment::Column::StudentId)
            .filter(enrollment::Column::StudentId.is_in(ids.iter().copied()))
            .filter(enrollment::Column::Status.eq(EnrollmentStatus::Active))
            .distinct()
            .into_tuple()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(
                    error = error as &dyn Error,
                    students = ids.len(),
                    "failed to look up active enrollments"
                );
            })?;
        Ok(active.into_iter().collect())
    }
}
