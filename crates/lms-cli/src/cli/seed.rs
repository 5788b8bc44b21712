use anyhow::{Context, Error};
use chrono::NaiveDate;
use lms_db::schema::setup_schema;
use lms_db::store::Store;
use lms_db::{course, enrollment, lesson, review, student, video_submission};
use lms_entity::enrollment::Status as EnrollmentStatus;
use lms_entity::lesson::Status as LessonStatus;
use lms_entity::sea_orm::prelude::{DateTime, Decimal};
use lms_entity::sea_orm::{DatabaseTransaction, TransactionTrait};
use lms_entity::video_submission::Status as SubmissionStatus;

const STUDENTS: &[(i32, &str, &str, (u32, u32))] = &[
    (101, "Taro Yamada", "taro@example.com", (1, 10)),
    (102, "Hanako Suzuki", "hanako@example.com", (1, 15)),
    (103, "Jiro Sato", "jiro@example.com", (2, 1)),
    (104, "Yuki Tanaka", "yuki@example.com", (2, 20)),
    (105, "Ken Ito", "ken@example.com", (3, 5)),
    (106, "Mei Kobayashi", "mei@example.com", (3, 18)),
    (107, "Sora Watanabe", "sora@example.com", (4, 2)),
];

const COURSES: &[(i32, &str, Option<&str>, i64)] = &[
    (201, "Algebra", Some("Equations, functions and graphs"), 5000),
    (202, "English Conversation", Some("Speaking practice with a tutor"), 8000),
    (203, "Programming Basics", None, 12000),
];

const ENROLLMENTS: &[(i32, i32, i32, EnrollmentStatus)] = &[
    (301, 101, 201, EnrollmentStatus::Active),
    (302, 101, 203, EnrollmentStatus::Completed),
    (303, 102, 202, EnrollmentStatus::Active),
    (304, 103, 201, EnrollmentStatus::Cancelled),
    (305, 104, 203, EnrollmentStatus::Active),
    (306, 105, 202, EnrollmentStatus::Completed),
    (307, 106, 201, EnrollmentStatus::Active),
];

const LESSONS: &[(i32, i32, i32, LessonStatus)] = &[
    (401, 301, 60, LessonStatus::Completed),
    (402, 301, 60, LessonStatus::Completed),
    (403, 301, 60, LessonStatus::Scheduled),
    (404, 302, 90, LessonStatus::Completed),
    (405, 303, 45, LessonStatus::Completed),
    (406, 303, 45, LessonStatus::Cancelled),
    (407, 305, 90, LessonStatus::Scheduled),
];

const SUBMISSIONS: &[(i32, i32, &str, SubmissionStatus)] = &[
    (501, 401, "Linear equations practice", SubmissionStatus::Reviewed),
    (502, 404, "Hello world walkthrough", SubmissionStatus::Reviewed),
    (503, 405, "Self introduction", SubmissionStatus::Submitted),
];

const REVIEWS: &[(i32, i32, Option<i32>, &str)] = &[
    (601, 501, Some(5), "Clear explanation of every step"),
    (602, 501, Some(3), "Check the sign in the last equation"),
    (603, 502, Some(4), "Good pacing"),
    (604, 503, None, "Rating after the next lesson"),
];

fn at(month: u32, day: u32, hour: u32) -> Result<DateTime, Error> {
    NaiveDate::from_ymd_opt(2024, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .with_context(|| format!("invalid sample date 2024-{month:02}-{day:02}"))
}

/// Creates the tables and inserts the sample data set through the validated mutations.
///
/// All rows go in through one transaction. A failure leaves the tables as they were.
pub(crate) async fn seed(store: &Store) -> Result<(), Error> {
    setup_schema(store.connection()).await?;

    let txn = store.connection().begin().await?;
    insert_sample(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        students = STUDENTS.len(),
        courses = COURSES.len(),
        enrollments = ENROLLMENTS.len(),
        lessons = LESSONS.len(),
        "sample data inserted"
    );
    Ok(())
}

async fn insert_sample(conn: &DatabaseTransaction) -> Result<(), Error> {
    for &(id, name, email, (month, day)) in STUDENTS {
        let model = lms_entity::student::Model {
            id,
            name: name.to_owned(),
            email: email.to_owned(),
            enrollment_date: at(month, day, 0)?,
        };
        student::Mutation::create(conn, model).await?;
    }

    for &(id, title, description, price) in COURSES {
        let model = lms_entity::course::Model {
            id,
            title: title.to_owned(),
            description: description.map(str::to_owned),
            monthly_price: Decimal::new(price * 100, 2),
            created_at: at(1, 1, 0)?,
        };
        course::Mutation::create(conn, model).await?;
    }

    for &(id, student_id, course_id, status) in ENROLLMENTS {
        let model = lms_entity::enrollment::Model {
            id,
            student_id,
            course_id,
            enrolled_at: at(4, 1, 10)?,
            status,
        };
        enrollment::Mutation::create(conn, model).await?;
    }

    for (day, &(id, enrollment_id, duration_minutes, status)) in (1..).zip(LESSONS) {
        let model = lms_entity::lesson::Model {
            id,
            enrollment_id,
            scheduled_at: at(5, day, 18)?,
            duration_minutes,
            status,
            notes: None,
        };
        lesson::Mutation::create(conn, model).await?;
    }

    for &(id, lesson_id, title, status) in SUBMISSIONS {
        let model = lms_entity::video_submission::Model {
            id,
            lesson_id,
            title: title.to_owned(),
            video_url: Some(format!("https://videos.example.com/{id}")),
            submitted_at: at(6, 1, 12)?,
            status,
        };
        video_submission::Mutation::create(conn, model).await?;
    }

    for &(id, submission_id, rating, feedback) in REVIEWS {
        let model = lms_entity::review::Model {
            id,
            submission_id,
            rating,
            feedback: Some(feedback.to_owned()),
            reviewed_at: at(6, 3, 9)?,
        };
        review::Mutation::create(conn, model).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_db::aggregate::Query as Aggregate;
    use lms_db::store::StoreConfig;
    use test_log::test;

    async fn memory_store() -> Store {
        Store::connect(&StoreConfig::new("sqlite::memory:")).await.unwrap()
    }

    #[test(tokio::test)]
    async fn seeds_sample_data() {
        let store = memory_store().await;
        seed(&store).await.unwrap();

        let conn = store.connection();
        let students = Aggregate::count::<lms_entity::student::Entity, _>(conn).await.unwrap();
        let reviews = Aggregate::count::<lms_entity::review::Entity, _>(conn).await.unwrap();
        assert_eq!(students, STUDENTS.len() as u64);
        assert_eq!(reviews, REVIEWS.len() as u64);
    }

    #[test(tokio::test)]
    async fn failed_seed_inserts_nothing() {
        let store = memory_store().await;
        setup_schema(store.connection()).await.unwrap();
        let taken = lms_entity::student::Model {
            id: 199,
            name: "Sora Watanabe".to_owned(),
            email: "sora@example.com".to_owned(),
            enrollment_date: at(1, 1, 0).unwrap(),
        };
        student::Mutation::create(store.connection(), taken).await.unwrap();

        assert!(seed(&store).await.is_err());
        let conn = store.connection();
        assert_eq!(Aggregate::count::<lms_entity::student::Entity, _>(conn).await.unwrap(), 1);
        assert_eq!(Aggregate::count::<lms_entity::course::Entity, _>(conn).await.unwrap(), 0);
    }
}
