use lms_db::schema::setup_schema;
use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
use test_log::test;

#[test(tokio::test)]
async fn test_setup_creates_six_tables() {
    let conn = &Database::connect("sqlite::memory:").await.unwrap();
    setup_schema(conn).await.unwrap();

    let rows = conn
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await
        .unwrap();
    let tables: Vec<String> = rows.iter().map(|row| row.try_get("", "name").unwrap()).collect();
    assert_eq!(
        tables,
        ["courses", "enrollments", "lessons", "reviews", "students", "video_submissions"]
    );

    setup_schema(conn).await.unwrap();
}
