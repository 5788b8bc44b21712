//! Checks that need the store: key collisions, unique columns, parent rows and dependents.
//!
//! They run inside the caller's transaction so that the check and the write see the same
//! snapshot. The store's own constraints stay authoritative; a violation surfacing at
//! write or commit time is classified the same way (see [`AccessError`]'s `From<DbErr>`).

use crate::error::AccessError;
use lms_entity::schema::Constrained;
use lms_entity::{course, enrollment, lesson, student, video_submission};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityName, EntityTrait, IdenStatic,
    ModelTrait, QueryFilter, Value,
};
use std::error::Error;

pub(crate) fn table<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

async fn find_any<E, C>(conn: &C, filter: Condition) -> Result<Option<E::Model>, AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let row = E::find().filter(filter).one(conn).await;
    Ok(row.inspect_err(|error| {
        tracing::error!(error = error as &dyn Error, table = %table::<E>(), "failed to look up row");
    })?)
}

async fn exists<E, C>(conn: &C, column: E::Column, id: i32) -> Result<bool, AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let row = find_any::<E, C>(conn, Condition::all().add(column.eq(id))).await?;
    Ok(row.is_some())
}

async fn parent_exists<C: ConnectionTrait>(conn: &C, table: &str, id: i32) -> Result<bool, AccessError> {
    match table {
        "students" => exists::<student::Entity, C>(conn, student::Column::Id, id).await,
        "courses" => exists::<course::Entity, C>(conn, course::Column::Id, id).await,
        "enrollments" => exists::<enrollment::Entity, C>(conn, enrollment::Column::Id, id).await,
        "lessons" => exists::<lesson::Entity, C>(conn, lesson::Column::Id, id).await,
        "video_submissions" => {
            exists::<video_submission::Entity, C>(conn, video_submission::Column::Id, id).await
        }
        other => Err(AccessError::Store(DbErr::Custom(format!("unknown parent table {other}")))),
    }
}

/// Values of every column of a model.
pub(crate) fn model_values<M: ModelTrait>(
    model: &M,
) -> impl Fn(<M::Entity as EntityTrait>::Column) -> Option<Value> + '_ {
    |column| Some(model.get(column))
}

/// Values of the columns a patch sets.
pub(crate) fn changed_values<A: ActiveModelTrait>(
    model: &A,
) -> impl Fn(<A::Entity as EntityTrait>::Column) -> Option<Value> + '_ {
    |column| match model.get(column) {
        ActiveValue::Set(value) => Some(value),
        ActiveValue::Unchanged(_) | ActiveValue::NotSet => None,
    }
}

/// Fails with [`AccessError::DuplicateKey`] when a row with this key already exists.
pub(crate) async fn ensure_key_free<E, C>(conn: &C, key: E::Column, id: i32) -> Result<(), AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if exists::<E, C>(conn, key, id).await? {
        tracing::debug!(table = %table::<E>(), %id, "primary key already taken");
        return Err(AccessError::DuplicateKey(format!("{}.{} {id}", table::<E>(), key.as_str())));
    }
    Ok(())
}

/// Fails with [`AccessError::DuplicateKey`] when a row other than `own_id` already holds a value
/// of one of the unique columns of `E`. Columns for which `value_of` yields nothing are skipped.
pub(crate) async fn ensure_unique<E, C>(
    conn: &C,
    key: E::Column,
    own_id: i32,
    value_of: impl Fn(E::Column) -> Option<Value>,
) -> Result<(), AccessError>
where
    E: Constrained,
    C: ConnectionTrait,
{
    for column in E::unique_columns() {
        let Some(value) = value_of(column) else {
            continue;
        };
        let filter = Condition::all().add(column.eq(value.clone())).add(key.ne(own_id));
        if find_any::<E, C>(conn, filter).await?.is_some() {
            tracing::debug!(table = %table::<E>(), column = column.as_str(), "unique value already taken");
            return Err(AccessError::DuplicateKey(format!(
                "{}.{} {value}",
                table::<E>(),
                column.as_str()
            )));
        }
    }
    Ok(())
}

/// Fails with [`AccessError::ForeignKeyViolation`] when a foreign key column of `E` points at a
/// missing parent row. Columns for which `value_of` yields nothing are skipped.
pub(crate) async fn ensure_parents<E, C>(
    conn: &C,
    value_of: impl Fn(E::Column) -> Option<Value>,
) -> Result<(), AccessError>
where
    E: Constrained,
    C: ConnectionTrait,
{
    for (column, parent) in E::references() {
        let Some(Value::Int(Some(id))) = value_of(column) else {
            continue;
        };
        if !parent_exists(conn, parent, id).await? {
            let reference = format!("{}.{}", table::<E>(), column.as_str());
            tracing::debug!(%reference, %id, "referenced row is missing");
            return Err(AccessError::ForeignKeyViolation(format!(
                "{reference} references missing {parent} {id}"
            )));
        }
    }
    Ok(())
}

/// Fails with [`AccessError::NotFound`] when the row is missing.
pub(crate) async fn ensure_exists<E, C>(conn: &C, key: E::Column, id: i32) -> Result<(), AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if !exists::<E, C>(conn, key, id).await? {
        return Err(AccessError::not_found(table::<E>(), id));
    }
    Ok(())
}

/// Fails with [`AccessError::ReferentialIntegrity`] when rows of `E` still point at `entity` `id`.
pub(crate) async fn ensure_no_dependents<E, C>(
    conn: &C,
    foreign_key: E::Column,
    entity: &str,
    id: i32,
) -> Result<(), AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if exists::<E, C>(conn, foreign_key, id).await? {
        tracing::debug!(%entity, %id, dependent = %table::<E>(), "delete blocked by dependents");
        return Err(AccessError::ReferentialIntegrity {
            entity: entity.to_owned(),
            id,
            dependent: table::<E>(),
        });
    }
    Ok(())
}

/// Maps a foreign key failure raised by the store while deleting `entity` `id`.
pub(crate) fn delete_blocked(entity: &str, id: i32) -> impl FnOnce(AccessError) -> AccessError + '_ {
    move |error| match error {
        AccessError::ForeignKeyViolation(detail) => AccessError::ReferentialIntegrity {
            entity: entity.to_owned(),
            id,
            dependent: detail,
        },
        error => error,
    }
}
