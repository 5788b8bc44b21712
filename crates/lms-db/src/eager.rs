//! Eager loading of related rows.
//!
//! Every relationship level costs exactly one `IN (parent ids)` statement, however many parents
//! are passed in. Children are grouped in memory and keep primary key order. A parent without
//! children gets an empty `Vec`, and an empty parent set issues no statement at all.

use crate::error::AccessError;
use crate::join;
use crate::util::FlattenTransactionResultExt;
use crate::validate::table;
use futures_util::try_join;
use lms_entity::{course, enrollment, lesson, review, student, video_submission};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use std::collections::HashMap;
use std::error::Error;

/// A parent row together with its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithChildren<P, C> {
    pub parent: P,
    pub children: Vec<C>,
}

/// An enrollment with the student and course it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSummary {
    pub enrollment: enrollment::Model,
    pub student: student::Model,
    pub course: course::Model,
}

pub type StudentEnrollments = WithChildren<student::Model, enrollment::Model>;
pub type CourseEnrollments = WithChildren<course::Model, enrollment::Model>;
pub type EnrollmentLessons = WithChildren<enrollment::Model, lesson::Model>;
pub type LessonSubmissions = WithChildren<lesson::Model, video_submission::Model>;
pub type SubmissionReviews = WithChildren<video_submission::Model, review::Model>;
pub type StudentLessons = WithChildren<student::Model, EnrollmentLessons>;

async fn load_by_ids<E, C>(conn: &C, column: E::Column, key: E::Column, ids: Vec<i32>) -> Result<Vec<E::Model>, AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let parents = ids.len();
    let rows = E::find()
        .filter(column.is_in(ids))
        .order_by_asc(key)
        .all(conn)
        .await
        .inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, table = %table::<E>(), "failed to batch load rows");
        })?;
    tracing::trace!(table = %table::<E>(), parents, count = rows.len(), "batch loaded rows");
    Ok(rows)
}

fn ids<T>(rows: &[T], id: impl Fn(&T) -> i32) -> Vec<i32> {
    let mut ids: Vec<i32> = rows.iter().map(id).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Hands every parent the children pointing at it. Children are cloned when a parent is passed twice.
fn attach<P, C>(
    parents: Vec<P>,
    parent_id: impl Fn(&P) -> i32,
    children: Vec<C>,
    child_parent_id: impl Fn(&C) -> i32,
) -> Vec<WithChildren<P, C>>
where
    C: Clone,
{
    let mut grouped: HashMap<i32, Vec<C>> = HashMap::new();
    for child in children {
        grouped.entry(child_parent_id(&child)).or_default().push(child);
    }
    parents
        .into_iter()
        .map(|parent| {
            let children = grouped.get(&parent_id(&parent)).cloned().unwrap_or_default();
            WithChildren { parent, children }
        })
        .collect()
}

async fn enrollments_of_students<C: ConnectionTrait>(
    conn: &C,
    students: Vec<student::Model>,
) -> Result<Vec<StudentEnrollments>, AccessError> {
    let enrollments = load_by_ids::<enrollment::Entity, C>(
        conn,
        enrollment::Column::StudentId,
        enrollment::Column::Id,
        ids(&students, |student| student.id),
    )
    .await?;
    Ok(attach(students, |student| student.id, enrollments, |enrollment| enrollment.student_id))
}

async fn lessons_of_enrollments<C: ConnectionTrait>(
    conn: &C,
    enrollments: Vec<enrollment::Model>,
) -> Result<Vec<EnrollmentLessons>, AccessError> {
    let lessons = load_by_ids::<lesson::Entity, C>(
        conn,
        lesson::Column::EnrollmentId,
        lesson::Column::Id,
        ids(&enrollments, |enrollment| enrollment.id),
    )
    .await?;
    Ok(attach(enrollments, |enrollment| enrollment.id, lessons, |lesson| lesson.enrollment_id))
}

async fn reviews_of_submissions<C: ConnectionTrait>(
    conn: &C,
    submissions: Vec<video_submission::Model>,
) -> Result<Vec<SubmissionReviews>, AccessError> {
    let reviews = load_by_ids::<review::Entity, C>(
        conn,
        review::Column::SubmissionId,
        review::Column::Id,
        ids(&submissions, |submission| submission.id),
    )
    .await?;
    Ok(attach(submissions, |submission| submission.id, reviews, |review| review.submission_id))
}

pub struct Query;

impl Query {
    pub async fn students_with_enrollments<C: ConnectionTrait>(
        conn: &C,
        students: Vec<student::Model>,
    ) -> Result<Vec<StudentEnrollments>, AccessError> {
        enrollments_of_students(conn, students).await
    }

    pub async fn courses_with_enrollments<C: ConnectionTrait>(
        conn: &C,
        courses: Vec<course::Model>,
    ) -> Result<Vec<CourseEnrollments>, AccessError> {
        let enrollments = load_by_ids::<enrollment::Entity, C>(
            conn,
            enrollment::Column::CourseId,
            enrollment::Column::Id,
            ids(&courses, |course| course.id),
        )
        .await?;
        Ok(attach(courses, |course| course.id, enrollments, |enrollment| enrollment.course_id))
    }

    pub async fn enrollments_with_lessons<C: ConnectionTrait>(
        conn: &C,
        enrollments: Vec<enrollment::Model>,
    ) -> Result<Vec<EnrollmentLessons>, AccessError> {
        lessons_of_enrollments(conn, enrollments).await
    }

    pub async fn lessons_with_submissions<C: ConnectionTrait>(
        conn: &C,
        lessons: Vec<lesson::Model>,
    ) -> Result<Vec<LessonSubmissions>, AccessError> {
        let submissions = load_by_ids::<video_submission::Entity, C>(
            conn,
            video_submission::Column::LessonId,
            video_submission::Column::Id,
            ids(&lessons, |lesson| lesson.id),
        )
        .await?;
        Ok(attach(lessons, |lesson| lesson.id, submissions, |submission| submission.lesson_id))
    }

    pub async fn submissions_with_reviews<C: ConnectionTrait>(
        conn: &C,
        submissions: Vec<video_submission::Model>,
    ) -> Result<Vec<SubmissionReviews>, AccessError> {
        reviews_of_submissions(conn, submissions).await
    }

    /// Students with their enrollments and each enrollment's lessons. Two statements in one transaction.
    pub async fn students_with_lessons<C>(
        conn: &C,
        students: Vec<student::Model>,
    ) -> Result<Vec<StudentLessons>, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Vec<StudentLessons>, AccessError>(|txn| {
            Box::pin(async move {
                let enrollments = load_by_ids::<enrollment::Entity, _>(
                    txn,
                    enrollment::Column::StudentId,
                    enrollment::Column::Id,
                    ids(&students, |student| student.id),
                )
                .await?;
                let enrollments = lessons_of_enrollments(txn, enrollments).await?;
                Ok(attach(students, |student| student.id, enrollments, |enrollment| {
                    enrollment.parent.student_id
                }))
            })
        })
        .await
        .flatten_res()
    }

    /// Enrollments with their student and course, loaded with one statement per parent table.
    pub async fn enrollment_summaries<C>(
        conn: &C,
        enrollments: Vec<enrollment::Model>,
    ) -> Result<Vec<EnrollmentSummary>, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Vec<EnrollmentSummary>, AccessError>(|txn| {
            Box::pin(async move {
                let (students, courses) = try_join!(
                    load_by_ids::<student::Entity, _>(
                        txn,
                        student::Column::Id,
                        student::Column::Id,
                        ids(&enrollments, |enrollment| enrollment.student_id),
                    ),
                    load_by_ids::<course::Entity, _>(
                        txn,
                        course::Column::Id,
                        course::Column::Id,
                        ids(&enrollments, |enrollment| enrollment.course_id),
                    )
                )?;
                let students: HashMap<i32, student::Model> =
                    students.into_iter().map(|student| (student.id, student)).collect();
                let courses: HashMap<i32, course::Model> =
                    courses.into_iter().map(|course| (course.id, course)).collect();

                enrollments
                    .into_iter()
                    .map(|enrollment| -> Result<EnrollmentSummary, AccessError> {
                        let student = students
                            .get(&enrollment.student_id)
                            .cloned()
                            .ok_or_else(|| AccessError::not_found("students", enrollment.student_id))?;
                        let course = courses
                            .get(&enrollment.course_id)
                            .cloned()
                            .ok_or_else(|| AccessError::not_found("courses", enrollment.course_id))?;
                        Ok(EnrollmentSummary {
                            enrollment,
                            student,
                            course,
                        })
                    })
                    .collect()
            })
        })
        .await
        .flatten_res()
    }

    /// Submissions with a review rated `min_rating` or higher, together with all their reviews.
    pub async fn rated_submissions_with_reviews<C>(
        conn: &C,
        min_rating: i32,
    ) -> Result<Vec<SubmissionReviews>, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Vec<SubmissionReviews>, AccessError>(|txn| {
            Box::pin(async move {
                let submissions = join::Query::submissions_rated_at_least(txn, min_rating).await?;
                reviews_of_submissions(txn, submissions).await
            })
        })
        .await
        .flatten_res()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Row {
        id: i32,
        parent: i32,
    }

    fn row(id: i32, parent: i32) -> Row {
        Row { id, parent }
    }

    #[test]
    fn attach_groups_in_order() {
        let children = vec![row(1, 20), row(2, 10), row(3, 20), row(4, 30)];
        let loaded = attach(vec![10, 20, 40], |id| *id, children, |child| child.parent);
        assert_eq!(
            loaded,
            [
                WithChildren {
                    parent: 10,
                    children: vec![row(2, 10)]
                },
                WithChildren {
                    parent: 20,
                    children: vec![row(1, 20), row(3, 20)]
                },
                WithChildren {
                    parent: 40,
                    children: vec![]
                },
            ]
        );
    }

    #[test]
    fn repeated_parents_share_children() {
        let loaded = attach(vec![7, 7], |id| *id, vec![row(1, 7)], |child| child.parent);
        assert_eq!(loaded[0].children, loaded[1].children);
        assert_eq!(loaded[1].children, [row(1, 7)]);
    }

    #[test]
    fn ids_are_unique_and_sorted() {
        assert_eq!(ids(&[3, 1, 3, 2], |id| *id), [1, 2, 3]);
        assert!(ids::<i32>(&[], |id| *id).is_empty());
    }
}
