mod common;

use crate::common::{connect, course, enrollment, student, yen};
use lms_db::course::{CourseFilter, CoursePatch, Mutation, Query};
use lms_db::{AccessError, ErrorKind, Page, SortOrder, enrollment as enrollments, student as students};
use lms_entity::enrollment::Status;
use sea_orm::prelude::Decimal;
use test_log::test;

#[test(tokio::test)]
async fn test_create_and_get() {
    let conn = &connect().await;
    let mut algebra = course(201, "Algebra", yen(5000));
    algebra.description = Some("Linear equations and beyond".to_owned());

    assert_eq!(Mutation::create(conn, algebra.clone()).await.unwrap(), algebra);
    assert_eq!(Query::get_by_id(conn, 201).await.unwrap(), algebra);
    assert_eq!(Query::get_by_id(conn, 202).await.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test(tokio::test)]
async fn test_price_must_not_be_negative() {
    let conn = &connect().await;

    let error = Mutation::create(conn, course(201, "Algebra", Decimal::new(-1, 2)))
        .await
        .unwrap_err();
    assert!(matches!(error, AccessError::Validation(ref error) if error.column == "monthly_price"));

    assert!(Mutation::create(conn, course(202, "Free trial", Decimal::ZERO)).await.is_ok());
}

#[test(tokio::test)]
async fn test_price_fits_fixed_point() {
    let conn = &connect().await;

    for (id, price) in [(201, Decimal::new(12_345, 3)), (202, Decimal::new(123_456_789_012, 2))] {
        let error = Mutation::create(conn, course(id, "Algebra", price)).await.unwrap_err();
        assert!(
            matches!(error, AccessError::Validation(ref error) if error.column == "monthly_price"),
            "{price}: {error}"
        );
        assert_eq!(Query::get_by_id(conn, id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    let largest = Decimal::new(9_999_999_999, 2);
    assert!(Mutation::create(conn, course(203, "Tutoring", largest)).await.is_ok());

    Mutation::create(conn, course(204, "Geometry", yen(3000))).await.unwrap();
    let patch = CoursePatch {
        monthly_price: Some(Decimal::new(300_005, 3)),
        ..Default::default()
    };
    assert_eq!(
        Mutation::update(conn, 204, patch).await.unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(Query::get_by_id(conn, 204).await.unwrap().monthly_price, yen(3000));
}

#[test(tokio::test)]
async fn test_list_by_price() {
    let conn = &connect().await;
    for (id, title, price) in [(201, "Algebra", 5000), (202, "Geometry", 3000), (203, "Calculus", 8000)] {
        Mutation::create(conn, course(id, title, yen(price))).await.unwrap();
    }

    let affordable = CourseFilter {
        max_price: Some(yen(5000)),
        ..Default::default()
    };
    let titles: Vec<_> = Query::list(conn, &affordable, SortOrder::Key, Page::default())
        .await
        .unwrap()
        .into_iter()
        .map(|course| course.title)
        .collect();
    assert_eq!(titles, ["Algebra", "Geometry"]);
}

#[test(tokio::test)]
async fn test_update_clears_description() {
    let conn = &connect().await;
    let mut algebra = course(201, "Algebra", yen(5000));
    algebra.description = Some("draft".to_owned());
    Mutation::create(conn, algebra).await.unwrap();

    let patch = CoursePatch {
        description: Some(None),
        monthly_price: Some(yen(4500)),
        ..Default::default()
    };
    let updated = Mutation::update(conn, 201, patch).await.unwrap();
    assert_eq!(updated.description, None);
    assert_eq!(updated.monthly_price, yen(4500));
    assert_eq!(updated.title, "Algebra");

    let negative = CoursePatch {
        monthly_price: Some(Decimal::new(-500, 2)),
        ..Default::default()
    };
    assert_eq!(
        Mutation::update(conn, 201, negative).await.unwrap_err().kind(),
        ErrorKind::Validation
    );
    assert_eq!(Query::get_by_id(conn, 201).await.unwrap().monthly_price, yen(4500));
}

#[test(tokio::test)]
async fn test_delete_with_enrollments() {
    let conn = &connect().await;
    Mutation::create(conn, course(201, "Algebra", yen(5000))).await.unwrap();
    students::Mutation::create(conn, student(101, "Taro", "taro@example.com"))
        .await
        .unwrap();
    enrollments::Mutation::create(conn, enrollment(301, 101, 201, Status::Active))
        .await
        .unwrap();

    assert_eq!(
        Mutation::delete(conn, 201).await.unwrap_err().kind(),
        ErrorKind::ReferentialIntegrity
    );
    enrollments::Mutation::delete(conn, 301).await.unwrap();
    Mutation::delete(conn, 201).await.unwrap();
}
