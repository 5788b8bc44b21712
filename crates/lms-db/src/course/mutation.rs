use crate::error::AccessError;
use crate::util::{FlattenTransactionResultExt, RequireRecord, set_if_some};
use crate::validate::{self, delete_blocked};
use lms_entity::course::{ActiveModel, Column, Entity as CourseEntity, Model as Course};
use lms_entity::enrollment;
use lms_entity::schema::Constrained;
use sea_orm::prelude::{DateTime, Decimal};
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, IntoActiveModel, TransactionTrait};
use std::error::Error;

/// Fields to change. `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub monthly_price: Option<Decimal>,
    pub created_at: Option<DateTime>,
}

pub struct Mutation;

impl Mutation {
    pub async fn create<C>(conn: &C, course: Course) -> Result<Course, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        CourseEntity::validate_model(&course)?;
        let id = course.id;

        let course = conn
            .transaction::<_, Course, AccessError>(|txn| {
                Box::pin(async move {
                    validate::ensure_key_free::<CourseEntity, _>(txn, Column::Id, id).await?;
                    let course = CourseEntity::insert(course.into_active_model())
                        .exec_with_returning(txn)
                        .await
                        .inspect_err(|error| {
                            tracing::error!(error = error as &dyn Error, %id, "failed to insert course");
                        })?;
                    Ok(course)
                })
            })
            .await
            .flatten_res()?;

        tracing::debug!(%id, "created course");
        Ok(course)
    }

    pub async fn update<C>(conn: &C, id: i32, patch: CoursePatch) -> Result<Course, AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, Course, AccessError>(|txn| {
            Box::pin(async move {
                let course = CourseEntity::find_by_id(id).one(txn).await.require("courses", id)?;
                let changes = ActiveModel {
                    id: ActiveValue::Unchanged(id),
                    title: set_if_some(patch.title),
                    description: set_if_some(patch.description),
                    monthly_price: set_if_some(patch.monthly_price),
                    created_at: set_if_some(patch.created_at),
                };
                if !changes.is_changed() {
                    return Ok(course);
                }

                CourseEntity::validate_changes(&changes)?;
                let course = changes.update(txn).await.inspect_err(|error| {
                    tracing::error!(error = error as &dyn Error, %id, "failed to update course");
                })?;
                tracing::debug!(%id, "updated course");
                Ok(course)
            })
        })
        .await
        .flatten_res()
    }

    /// Deletes a course nobody is enrolled in.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<(), AccessError>
    where
        C: ConnectionTrait + TransactionTrait,
    {
        conn.transaction::<_, (), AccessError>(|txn| {
            Box::pin(async move {
                validate::ensure_exists::<CourseEntity, _>(txn, Column::Id, id).await?;
                validate::ensure_no_dependents::<enrollment::Entity, _>(
                    txn,
                    enrollment::Column::CourseId,
                    "courses",
                    id,
                )
                .await?;
                CourseEntity::delete_by_id(id)
                    .exec(txn)
                    .await
                    .inspect_err(|error| {
                        tracing::error!(error = error as &dyn Error, %id, "failed to delete course");
                    })
                    .map_err(AccessError::from)
                    .map_err(delete_blocked("courses", id))?;
                tracing::debug!(%id, "deleted course");
                Ok(())
            })
        })
        .await
        .flatten_res()
    }
}
