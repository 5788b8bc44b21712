#![allow(dead_code)]

use lms_db::schema::setup_schema;
use lms_db::{course as courses, enrollment as enrollments, student as students};
use lms_entity::{course, enrollment, lesson, review, student, video_submission};
use sea_orm::prelude::{DateTime, Decimal};
use sea_orm::{Database, DatabaseConnection};

pub async fn connect() -> DatabaseConnection {
    let conn = Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(&conn).await.unwrap();
    conn
}

pub fn at(year: i32, month: u32, day: u32) -> DateTime {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(9, 0, 0))
        .unwrap()
}

pub fn yen(amount: i64) -> Decimal {
    Decimal::new(amount * 100, 2)
}

pub fn student(id: i32, name: &str, email: &str) -> student::Model {
    student::Model {
        id,
        name: name.to_owned(),
        email: email.to_owned(),
        enrollment_date: at(2024, 1, 10),
    }
}

pub fn course(id: i32, title: &str, monthly_price: Decimal) -> course::Model {
    course::Model {
        id,
        title: title.to_owned(),
        description: None,
        monthly_price,
        created_at: at(2023, 12, 1),
    }
}

pub fn enrollment(id: i32, student_id: i32, course_id: i32, status: enrollment::Status) -> enrollment::Model {
    enrollment::Model {
        id,
        student_id,
        course_id,
        enrolled_at: at(2024, 1, 15),
        status,
    }
}

pub fn lesson(id: i32, enrollment_id: i32, status: lesson::Status) -> lesson::Model {
    lesson::Model {
        id,
        enrollment_id,
        scheduled_at: at(2024, 2, 1),
        duration_minutes: 60,
        status,
        notes: None,
    }
}

pub fn submission(id: i32, lesson_id: i32, title: &str) -> video_submission::Model {
    video_submission::Model {
        id,
        lesson_id,
        title: title.to_owned(),
        video_url: None,
        submitted_at: at(2024, 2, 2),
        status: video_submission::Status::Submitted,
    }
}

pub fn review(id: i32, submission_id: i32, rating: Option<i32>) -> review::Model {
    review::Model {
        id,
        submission_id,
        rating,
        feedback: None,
        reviewed_at: at(2024, 2, 3),
    }
}

/// Student 101 "Taro" actively enrolled (301) in course 201 "Algebra".
pub async fn seed_taro(conn: &DatabaseConnection) -> (student::Model, course::Model, enrollment::Model) {
    let taro = students::Mutation::create(conn, student(101, "Taro", "taro@example.com"))
        .await
        .unwrap();
    let algebra = courses::Mutation::create(conn, course(201, "Algebra", yen(5000)))
        .await
        .unwrap();
    let active = enrollments::Mutation::create(conn, enrollment(301, 101, 201, enrollment::Status::Active))
        .await
        .unwrap();
    (taro, algebra, active)
}
