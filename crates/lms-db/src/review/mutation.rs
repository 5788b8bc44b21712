use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, changed_values, model_values};
use lms_entity::review::{ActiveModel, Column, Entity as ReviewEntity, Model as Review};
use lms_entity::schema::Constrained;
use sea_orm::prelude::DateTime;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

/// Fields to change. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPatch {
    pub submission_id: Option<i32>,
    pub rating: Option<Option<i32>>,
    pub feedback: Option<Option<String>>,
    pub reviewed_at: Option<DateTime>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, review: Review) -> Result<Review, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        ReviewEntity::validate_model(&review)?;
        let id = review.id;

        let review = conn
            .transaction::<_, Review, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<ReviewEntity, _>(txn, Column::Id, id).await?;
                    validate::ensure_parents::<ReviewEntity, _>(txn, model_values(&review)).await?;
                    let review = ReviewEntity::insert(review.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert review");
                        })?;
                    Ok(review)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, submission_id = review.submission_id, "created review");
        Ok(review)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: ReviewPatch) -> Result<Review, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Review, AccessError>(|txn| {
            Box::pin(async move {
                let review = ReviewEntity::find_by_id(id).one(txn).await.require("reviews", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    submission_id: set_if_some(patch.submission_id),
                    rating: set_if_some(patch.rating),
                    feedback: set_if_some(patch.feedback),
                    reviewed_at: set_if_some(patch.reviewed_at),
                };
                if !changes.is_changed() {
                    return Ok(review);
                }

                ReviewEntity::validate_changes(&changes)?;
                validate::ensure_parents::<ReviewEntity, _>(txn, changed_values(&changes)).await?;
                let review = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update review");
                })?;
                tracing::debug!(%id, "updated review");
                Ok(review)
            })
        })
        .await
        .flatten_res()
    }

    /// Reviews have no dependents, so only a missing row stops the delete.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                let result = ReviewEntity::delete_by_id(id).exec(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to delete review");
                })?;
                if result.rows_affected == 0 {
                    return Err(AccessError::not_found("reviews", id));
                }
                tracing::debug!(%id, "deleted review");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
