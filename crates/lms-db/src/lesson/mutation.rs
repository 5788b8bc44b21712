use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, changed_values, delete_blocked, model_values};
use lms_entity::lesson::{ActiveModel, Column, Entity as LessonEntity, Model as Lesson, Status};
use lms_entity::schema::Constrained;
use lms_entity::video_submission;
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

/// Fields to change. `notes: Some(None)` clears the notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonPatch {
    pub enrollment_id: Option<i32>,
    pub scheduled_at: Option<DateTime>,
    pub duration_minutes: Option<i32>,
    pub status: Option<Status>,
    pub notes: Option<Option<String>>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, lesson: Lesson) -> Result<Lesson, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        LessonEntity::validate_model(&lesson)?;
        let id = lesson.id;

        let lesson = conn
            .transaction::<_, Lesson, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<LessonEntity, _>(txn, Column::Id, id).await?;
                    validate::ensure_parents::<LessonEntity, _>(txn, model_values(&lesson)).await?;
                    let lesson = LessonEntity::insert(lesson.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert lesson");
                        })?;
                    Ok(lesson)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, enrollment_id = lesson.enrollment_id, "created lesson");
        Ok(lesson)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: LessonPatch) -> Result<Lesson, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Lesson, AccessError>(|txn| {
            Box::pin(async move {
                let lesson = LessonEntity::find_by_id(id).one(txn).await.require("lessons", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    enrollment_id: set_if_some(patch.enrollment_id),
                    scheduled_at: set_if_some(patch.scheduled_at),
                    duration_minutes: set_if_some(patch.duration_minutes),
                    status: set_if_some(patch.status),
                    notes: set_if_some(patch.notes),
                };
                if !changes.is_changed() {
                    return Ok(lesson);
                }

                LessonEntity::validate_changes(&changes)?;
                validate::ensure_parents::<LessonEntity, _>(txn, changed_values(&changes)).await?;
                let lesson = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update lesson");
                })?;
                tracing::debug!(%id, "updated lesson");
                Ok(lesson)
            })
        })
        .await
        .flatten_res()
    }

    /// Deletes a lesson without video submissions.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                validate::ensure_exists::<LessonEntity, _>(txn, Column::Id, id).await?;
                validate::ensure_no_dependents::<video_submission::Entity, _>(
                    txn,
                    video_submission::Column::LessonId,
                    "lessons",
                    id,
                )
                .await?;
                LessonEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .inspect_err(|error| {
                        tracing::error!(error = error as &dyn Error, %id, "failed to delete lesson");
                    })
                    .map_err(AccessError::from)
                    .map_err(delete_blocked("lessons", id))?;
                tracing::debug!(%id, "deleted lesson");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
