mod common;

use crate::common::{connect, seed_taro, yen};
use lms_db::aggregate::Query as Aggregate;
use lms_db::join::Query as Join;
use lms_entity::enrollment::Status;
use test_log::test;

#[test(tokio::test)]
async fn test_active_enrollment_scenario() {
    let conn = &connect().await;
    let (taro, algebra, active) = seed_taro(conn).await;
    assert_eq!(algebra.monthly_price, yen(5000));

    let rows = Join::student_enrollments(conn, Some(Status::Active)).await.unwrap();
    let pairs: Vec<_> = rows.iter().map(|row| (row.name.as_str(), row.status)).collect();
    assert_eq!(pairs, [("Taro", Status::Active)]);
    assert_eq!(rows[0].student_id, taro.id);
    assert_eq!(rows[0].enrollment_id, active.id);

    assert_eq!(Aggregate::average_monthly_price(conn).await.unwrap(), Some(yen(5000)));
}
