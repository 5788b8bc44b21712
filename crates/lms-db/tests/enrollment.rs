mod common;

use crate::common::{at, connect, enrollment, lesson, seed_taro};
use lms_db::enrollment::{EnrollmentFilter, EnrollmentPatch, Mutation, Progress, Query};
use lms_db::{AccessError, ErrorKind, Page, SortOrder, lesson as lessons};
use lms_entity::enrollment::{self as entity, Status};
use lms_entity::lesson::Status as LessonStatus;
use sea_orm::{EntityTrait, IntoActiveModel};
use test_log::test;

#[test(tokio::test)]
async fn test_create_and_get() {
    let conn = &connect().await;
    let (_, _, active) = seed_taro(conn).await;

    assert_eq!(Query::get_by_id(conn, 301).await.unwrap(), active);
    assert_eq!(active.status, Status::Active);
}

#[test(tokio::test)]
async fn test_missing_student() {
    let conn = &connect().await;
    seed_taro(conn).await;

    let error = Mutation::create(conn, enrollment(302, 999, 201, Status::Active))
        .await
        .unwrap_err();
    assert!(matches!(error, AccessError::ForeignKeyViolation(ref detail) if detail.contains("students")));
    assert_eq!(error.kind().response_class(), lms_db::ResponseClass::ClientError);

    let error = Mutation::create(conn, enrollment(302, 101, 999, Status::Active))
        .await
        .unwrap_err();
    assert_eq!(error.kind(), ErrorKind::ForeignKeyViolation);
    assert_eq!(Query::get_by_id(conn, 302).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test(tokio::test)]
async fn test_store_rejects_missing_parent() {
    let conn = &connect().await;

    let result = entity::Entity::insert(enrollment(302, 999, 999, Status::Active).into_active_model())
        .exec(conn)
        .await;
    assert_eq!(
        AccessError::from(result.unwrap_err()).kind(),
        ErrorKind::ForeignKeyViolation
    );
}

#[test(tokio::test)]
async fn test_status_transitions() {
    let conn = &connect().await;
    seed_taro(conn).await;

    for status in [Status::Completed, Status::Cancelled, Status::Active] {
        let patch = EnrollmentPatch {
            status: Some(status),
            ..Default::default()
        };
        assert_eq!(Mutation::update(conn, 301, patch).await.unwrap().status, status);
    }

    let moved = EnrollmentPatch {
        student_id: Some(999),
        ..Default::default()
    };
    assert_eq!(
        Mutation::update(conn, 301, moved).await.unwrap_err().kind(),
        ErrorKind::ForeignKeyViolation
    );
}

#[test(tokio::test)]
async fn test_list_by_status() {
    let conn = &connect().await;
    seed_taro(conn).await;
    let mut completed = enrollment(302, 101, 201, Status::Completed);
    completed.enrolled_at = at(2023, 6, 1);
    Mutation::create(conn, completed).await.unwrap();

    let filter = EnrollmentFilter {
        student_id: Some(101),
        status: Some(Status::Completed),
        ..Default::default()
    };
    let found = Query::list(conn, &filter, SortOrder::Key, Page::default()).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 302);

    let oldest = Query::list(conn, &EnrollmentFilter::default(), SortOrder::Oldest, Page::default())
        .await
        .unwrap();
    assert_eq!(oldest.iter().map(|e| e.id).collect::<Vec<_>>(), [302, 301]);
}

#[test(tokio::test)]
async fn test_progress() {
    let conn = &connect().await;
    seed_taro(conn).await;
    assert_eq!(Query::progress(conn, 301).await.unwrap(), Progress::default());

    for (id, status) in [
        (401, LessonStatus::Completed),
        (402, LessonStatus::Completed),
        (403, LessonStatus::Scheduled),
    ] {
        lessons::Mutation::create(conn, lesson(id, 301, status)).await.unwrap();
    }
    assert_eq!(
        Query::progress(conn, 301).await.unwrap(),
        Progress {
            completed: 2,
            total: 3
        }
    );
}

#[test(tokio::test)]
async fn test_progress_of_several_enrollments() {
    let conn = &connect().await;
    seed_taro(conn).await;
    Mutation::create(conn, enrollment(302, 101, 201, Status::Completed))
        .await
        .unwrap();
    for (id, enrollment_id, status) in [
        (401, 301, LessonStatus::Completed),
        (402, 301, LessonStatus::Scheduled),
        (403, 302, LessonStatus::Cancelled),
    ] {
        lessons::Mutation::create(conn, lesson(id, enrollment_id, status)).await.unwrap();
    }

    let progress = Query::progress_of(conn, &[302, 999, 301, 302]).await.unwrap();
    assert_eq!(
        progress.into_iter().collect::<Vec<_>>(),
        [
            (301, Progress { completed: 1, total: 2 }),
            (302, Progress { completed: 0, total: 1 }),
            (999, Progress::default()),
        ]
    );
    assert!(Query::progress_of(conn, &[]).await.unwrap().is_empty());
}

#[test(tokio::test)]
async fn test_delete_with_lessons() {
    let conn = &connect().await;
    seed_taro(conn).await;
    lessons::Mutation::create(conn, lesson(401, 301, LessonStatus::Scheduled))
        .await
        .unwrap();

    assert_eq!(
        Mutation::delete(conn, 301).await.unwrap_err().kind(),
        ErrorKind::ReferentialIntegrity
    );
    lessons::Mutation::delete(conn, 401).await.unwrap();
    Mutation::delete(conn, 301).await.unwrap();
}
