use crate::opt::Report;
use anyhow::{Context, Error};
use chrono::NaiveDate;
use lms_db::aggregate::Query as Aggregate;
use lms_db::eager::Query as Eager;
use lms_db::join::Query as Join;
use lms_db::store::Store;
use lms_db::{Page, SortOrder, enrollment, student};
use lms_entity::enrollment::Status;

fn heading(title: &str) {
    println!("\n=== {title} ===");
}

pub(crate) async fn report(store: &Store, opt: &Report) -> Result<(), Error> {
    let conn = store.connection();

    heading("Students");
    let students = student::Query::list(conn, &student::StudentFilter::default(), SortOrder::Key, Page::default()).await?;
    for student in &students {
        println!("{:>4}  {:<16} {}", student.id, student.name, student.email);
    }

    heading("Students enrolled since 2024-03-01");
    let since = student::StudentFilter {
        enrolled_from: NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|date| date.and_hms_opt(0, 0, 0)),
        ..Default::default()
    };
    for student in student::Query::list(conn, &since, SortOrder::Oldest, Page::default()).await? {
        println!("{:>4}  {:<16} {}", student.id, student.name, student.enrollment_date.date());
    }

    heading("Active enrollments");
    for row in Join::student_enrollments(conn, Some(Status::Active)).await? {
        println!("{:<16} enrollment {} in course {}", row.name, row.enrollment_id, row.course_id);
    }

    heading("Courses per student");
    for row in Join::student_courses(conn, None).await? {
        println!("{:<16} {:<22} {:?}", row.name, row.title, row.status);
    }

    heading("Average monthly price");
    match Aggregate::average_monthly_price(conn).await? {
        Some(average) => println!("{}", average.round_dp(2)),
        None => println!("no courses"),
    }

    heading("Enrollments by status");
    for (status, count) in Aggregate::enrollments_by_status(conn).await? {
        println!("{:<10} {count}", format!("{status:?}"));
    }

    heading("Enrollments by course");
    for (course_id, count) in Aggregate::enrollments_by_course(conn).await? {
        println!("{course_id:<10} {count}");
    }

    heading("Average rating by submission");
    for (submission_id, average) in Aggregate::average_rating_by_submission(conn).await? {
        match average {
            Some(average) => println!("{submission_id:<10} {}", average.round_dp(2)),
            None => println!("{submission_id:<10} unrated"),
        }
    }

    heading("Students with enrollments");
    for loaded in Eager::students_with_enrollments(conn, students.clone()).await? {
        println!("{:<16} {} enrollment(s)", loaded.parent.name, loaded.children.len());
    }

    heading("Lessons per student");
    for loaded in Eager::students_with_lessons(conn, students).await? {
        let lessons: usize = loaded.children.iter().map(|enrollment| enrollment.children.len()).sum();
        println!("{:<16} {lessons} lesson(s)", loaded.parent.name);
    }

    heading(&format!("Submissions rated {} or higher", opt.min_rating));
    for loaded in Eager::rated_submissions_with_reviews(conn, opt.min_rating).await? {
        println!("{} (lesson {})", loaded.parent.title, loaded.parent.lesson_id);
        for review in loaded.children.iter().filter(|review| review.rating >= Some(opt.min_rating)) {
            let rating = review.rating.context("filtered reviews carry a rating")?;
            println!("  {rating}: {}", review.feedback.as_deref().unwrap_or_default());
        }
    }

    heading("Enrollment progress");
    let enrollments = enrollment::Query::list(
        conn,
        &enrollment::EnrollmentFilter::default(),
        SortOrder::Key,
        Page::new(0, 5),
    )
    .await?;
    let ids: Vec<i32> = enrollments.iter().map(|enrollment| enrollment.id).collect();
    let progress = enrollment::Query::progress_of(conn, &ids).await?;
    let summaries = Eager::enrollment_summaries(conn, enrollments).await?;
    let student_ids: Vec<i32> = summaries.iter().map(|summary| summary.student.id).collect();
    let active = student::Query::with_active_enrollment(conn, &student_ids).await?;
    for summary in summaries {
        let progress = progress.get(&summary.enrollment.id).copied().unwrap_or_default();
        println!(
            "{:<16} {:<22} {}/{} lessons completed{}",
            summary.student.name,
            summary.course.title,
            progress.completed,
            progress.total,
            if active.contains(&summary.student.id) { "" } else { " (no active enrollment)" }
        );
    }

    Ok(())
}
