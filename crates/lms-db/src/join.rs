//! Inner joins along the declared foreign keys, returned as typed rows.

use crate::error::AccessError;
use lms_entity::{course, enrollment, lesson, review, student, video_submission};
use sea_orm::prelude::DateTime;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait,
};
use std::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct StudentEnrollmentRow {
    pub student_id: i32,
    pub name: String,
    pub enrollment_id: i32,
    pub course_id: i32,
    pub status: enrollment::Status,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct StudentCourseRow {
    pub student_id: i32,
    pub name: String,
    pub enrollment_id: i32,
    pub course_id: i32,
    pub title: String,
    pub status: enrollment::Status,
}

#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct EnrollmentLessonRow {
    pub enrollment_id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub lesson_id: i32,
    pub scheduled_at: DateTime,
    pub duration_minutes: i32,
    pub lesson_status: lesson::Status,
}

pub struct Query;

impl Query {
    /// Students joined with their enrollments, optionally only enrollments in `status`.
    pub async fn student_enrollments<C: ConnectionTrait>(
        conn: &C,
        status: Option<enrollment::Status>,
    ) -> Result<Vec<StudentEnrollmentRow>, AccessError> {
        let rows = student::Entity::find()
            .select_only()
            .column_as(student::Column::Id, "student_id")
            .column(student::Column::Name)
            .column_as(enrollment::Column::Id, "enrollment_id")
            .column(enrollment::Column::CourseId)
            .column(enrollment::Column::Status)
            .inner_join(enrollment::Entity)
            .filter(Condition::all().add_option(status.map(|status| enrollment::Column::Status.eq(status))))
            .order_by_asc(student::Column::Id)
            .order_by_asc(enrollment::Column::Id)
            .into_model::<StudentEnrollmentRow>()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to join students with enrollments");
            })?;
        Ok(rows)
    }

    /// Students, their enrollments and the enrolled courses.
    pub async fn student_courses<C: ConnectionTrait>(
        conn: &C,
        status: Option<enrollment::Status>,
    ) -> Result<Vec<StudentCourseRow>, AccessError> {
        let rows = student::Entity::find()
            .select_only()
            .column_as(student::Column::Id, "student_id")
            .column(student::Column::Name)
            .column_as(enrollment::Column::Id, "enrollment_id")
            .column_as(course::Column::Id, "course_id")
            .column(course::Column::Title)
            .column(enrollment::Column::Status)
            .join(JoinType::InnerJoin, student::Relation::Enrollment.def())
            .join(JoinType::InnerJoin, enrollment::Relation::Course.def())
            .filter(Condition::all().add_option(status.map(|status| enrollment::Column::Status.eq(status))))
            .order_by_asc(student::Column::Id)
            .order_by_asc(enrollment::Column::Id)
            .into_model::<StudentCourseRow>()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to join students with courses");
            })?;
        Ok(rows)
    }

    /// Courses a student is enrolled in, each listed once.
    pub async fn courses_of_student<C: ConnectionTrait>(
        conn: &C,
        student_id: i32,
    ) -> Result<Vec<course::Model>, AccessError> {
        let courses = course::Entity::find()
            .join(JoinType::InnerJoin, course::Relation::Enrollment.def())
            .filter(enrollment::Column::StudentId.eq(student_id))
            .distinct()
            .order_by_asc(course::Column::Id)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %student_id, "failed to load courses of student");
            })?;
        Ok(courses)
    }

    /// Enrollments joined with their lessons, optionally only lessons in `lesson_status`.
    pub async fn enrollment_lessons<C: ConnectionTrait>(
        conn: &C,
        lesson_status: Option<lesson::Status>,
    ) -> Result<Vec<EnrollmentLessonRow>, AccessError> {
        let rows = enrollment::Entity::find()
            .select_only()
            .column_as(enrollment::Column::Id, "enrollment_id")
            .column(enrollment::Column::StudentId)
            .column(enrollment::Column::CourseId)
            .column_as(lesson::Column::Id, "lesson_id")
            .column(lesson::Column::ScheduledAt)
            .column(lesson::Column::DurationMinutes)
            .column_as(lesson::Column::Status, "lesson_status")
            .inner_join(lesson::Entity)
            .filter(Condition::all().add_option(lesson_status.map(|status| lesson::Column::Status.eq(status))))
            .order_by_asc(enrollment::Column::Id)
            .order_by_asc(lesson::Column::Id)
            .into_model::<EnrollmentLessonRow>()
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, "failed to join enrollments with lessons");
            })?;
        Ok(rows)
    }

    /// Submissions with at least one review rated `min_rating` or higher, each listed once.
    pub async fn submissions_rated_at_least<C: ConnectionTrait>(
        conn: &C,
        min_rating: i32,
    ) -> Result<Vec<video_submission::Model>, AccessError> {
        let submissions = video_submission::Entity::find()
            .inner_join(review::Entity)
            .filter(review::Column::Rating.gte(min_rating))
            .distinct()
            .order_by_asc(video_submission::Column::Id)
            .all(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %min_rating, "failed to load rated submissions");
            })?;
        Ok(submissions)
    }
}
