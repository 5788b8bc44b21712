use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, changed_values, delete_blocked, model_values};
use lms_entity::enrollment::{ActiveModel, Column, Entity as EnrollmentEntity, Model as Enrollment, Status};
use lms_entity::lesson;
use lms_entity::schema::Constrained;
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentPatch {
    pub student_id: Option<i32>,
    pub course_id: Option<i32>,
    pub enrolled_at: Option<DateTime>,
    pub status: Option<Status>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, enrollment: Enrollment) -> Result<Enrollment, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        EnrollmentEntity::validate_model(&enrollment)?;
        let id = enrollment.id;

        let enrollment = conn
            .transaction::<_, Enrollment, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<EnrollmentEntity, _>(txn, Column::Id, id).await?;
                    validate::ensure_parents::<EnrollmentEntity, _>(txn, model_values(&enrollment)).await?;
                    let enrollment = EnrollmentEntity::insert(enrollment.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert enrollment");
                        })?;
                    Ok(enrollment)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, student_id = enrollment.student_id, course_id = enrollment.course_id, "created enrollment");
        Ok(enrollment)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: EnrollmentPatch) -> Result<Enrollment, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Enrollment, AccessError>(|txn| {
            Box::pin(async move {
                let enrollment = EnrollmentEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .require("enrollments", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    student_id: set_if_some(patch.student_id),
                    course_id: set_if_some(patch.course_id),
                    enrolled_at: set_if_some(patch.enrolled_at),
                    status: set_if_some(patch.status),
                };
                if !changes.is_changed() {
                    return Ok(enrollment);
                }

                EnrollmentEntity::validate_changes(&changes)?;
                validate::ensure_parents::<EnrollmentEntity, _>(txn, changed_values(&changes)).await?;
                let enrollment = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update enrollment");
                })?;
                tracing::debug!(%id, "updated enrollment");
                Ok(enrollment)
            })
        })
        .await
        .flatten_res()
    }

    /// Deletes an enrollment without lessons.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                validate::ensure_exists::<EnrollmentEntity, _>(txn, Column::Id, id).await?;
                validate::ensure_no_dependents::<lesson::Entity, _>(txn, lesson::Column::EnrollmentId, "enrollments", id)
                    .await?;
                EnrollmentEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .inspect_err(|error| {
                        tracing::error!(error = error as &dyn Error, %id, "failed to delete enrollment");
                    })
                    .map_err(AccessError::from)
                    .map_err(delete_blocked("enrollments", id))?;
                tracing::debug!(%id, "deleted enrollment");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
