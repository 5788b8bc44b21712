use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, changed_values, delete_blocked, model_values};
use lms_entity::schema::Constrained;
use lms_entity::student::{ActiveModel, Column, Entity as StudentEntity, Model as Student};
use lms_entity::enrollment;
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

/// Fields to change. `None` leaves the stored value as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: Option<DateTime>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, student: Student) -> Result<Student, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        StudentEntity::validate_model(&student)?;
        let id = student.id;

        let student = conn
            .transaction::<_, Student, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<StudentEntity, _>(txn, Column::Id, id).await?;
                    validate::ensure_unique::<StudentEntity, _>(txn, Column::Id, id, model_values(&student)).await?;
                    let student = StudentEntity::insert(student.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert student");
                        })?;
                    Ok(student)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, "created student");
        Ok(student)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: StudentPatch) -> Result<Student, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Student, AccessError>(|txn| {
            Box::pin(async move {
                let student = StudentEntity::find_by_id(id).one(txn).await.require("students", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    name: set_if_some(patch.name),
                    email: set_if_some(patch.email),
                    enrollment_date: set_if_some(patch.enrollment_date),
                };
                if !changes.is_changed() {
                    return Ok(student);
                }

                StudentEntity::validate_changes(&changes)?;
                validate::ensure_unique::<StudentEntity, _>(txn, Column::Id, id, changed_values(&changes)).await?;
                let student = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update student");
                })?;
                tracing::debug!(%id, "updated student");
                Ok(student)
            })
        })
        .await
        .flatten_res()
    }

    /// Deletes a student without enrollments.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                validate::ensure_exists::<StudentEntity, _>(txn, Column::Id, id).await?;
                validate::ensure_no_dependents::<enrollment::Entity, _>(
                    txn,
                    enrollment::Column::StudentId,
                    "students",
                    id,
                )
                .await?;
                StudentEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .inspect_err(|error| {
                        tracing::error!(error = error as &dyn Error, %id, "failed to delete student");
                    })
                    .map_err(AccessError::from)
                    .map_err(delete_blocked("students", id))?;
                tracing::debug!(%id, "deleted student");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
