use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, changed_values, delete_blocked, model_values};
use lms_entity::review;
use lms_entity::schema::Constrained;
use lms_entity::video_submission::{ActiveModel, Column, Entity as SubmissionEntity, Model as VideoSubmission, Status};
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

/// Fields to change. `video_url: Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoSubmissionPatch {
    pub lesson_id: Option<i32>,
    pub title: Option<String>,
    pub video_url: Option<Option<String>>,
    pub submitted_at: Option<DateTime>,
    pub status: Option<Status>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, submission: VideoSubmission) -> Result<VideoSubmission, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        SubmissionEntity::validate_model(&submission)?;
        let id = submission.id;

        let submission = conn
            .transaction::<_, VideoSubmission, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<SubmissionEntity, _>(txn, Column::Id, id).await?;
                    validate::ensure_parents::<SubmissionEntity, _>(txn, model_values(&submission)).await?;
                    let submission = SubmissionEntity::insert(submission.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert video submission");
                        })?;
                    Ok(submission)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, lesson_id = submission.lesson_id, "created video submission");
        Ok(submission)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: VideoSubmissionPatch) -> Result<VideoSubmission, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, VideoSubmission, AccessError>(|txn| {
            Box::pin(async move {
                let submission = SubmissionEntity::find_by_id(id)
                    .one(txn)
                    .await
                    .require("video_submissions", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    lesson_id: set_if_some(patch.lesson_id),
                    title: set_if_some(patch.title),
                    video_url: set_if_some(patch.video_url),
                    submitted_at: set_if_some(patch.submitted_at),
                    status: set_if_some(patch.status),
                };
                if !changes.is_changed() {
                    return Ok(submission);
                }

                SubmissionEntity::validate_changes(&changes)?;
                validate::ensure_parents::<SubmissionEntity, _>(txn, changed_values(&changes)).await?;
                let submission = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update video submission");
                })?;
                tracing::debug!(%id, "updated video submission");
                Ok(submission)
            })
        })
        .await
        .flatten_res()
    }

    /// Deletes a submission without reviews.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                validate::ensure_exists::<SubmissionEntity, _>(txn, Column::Id, id).await?;
                validate::ensure_no_dependents::<review::Entity, _>(
                    txn,
                    review::Column::SubmissionId,
                    "video_submissions",
                    id,
                )
                .await?;
                SubmissionEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .inspect_err(|error| {
                        tracing::error!(error = error as &dyn Error, %id, "failed to delete video submission");
                    })
                    .map_err(AccessError::from)
                    .map_err(delete_blocked("video_submissions", id))?;
                tracing::debug!(%id, "deleted video submission");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
