//! Table bootstrap for an empty store. Creates the six tables once; there is no versioning.

use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr};

const SQLITE: &str = include_str!("../schema/sqlite.sql");
const POSTGRES: &str = include_str!("../schema/postgres.sql");

pub async fn setup_schema<C: ConnectionTrait>(conn: &C) -> Result<(), DbErr> {
    let ddl = match conn.get_database_backend() {
        DatabaseBackend::Sqlite => SQLITE,
        DatabaseBackend::Postgres => POSTGRES,
        DatabaseBackend::MySql => return Err(DbErr::Custom("MySQL is not supported".to_owned())),
    };

    tracing::debug!(backend = ?conn.get_database_backend(), "creating tables");
    conn.execute_unprepared(ddl).await.inspect_err(|error| {
        tracing::error!(error = error as &dyn std::error::Error, "failed to create tables");
    })?;
    Ok(())
}
