use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::RequireRecord;
use lms_entity::review::{Column, Entity as ReviewEntity, Model as Review};
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewFilter {
    pub submission_id: Option<i32>,
    /// Reviews rated at least this. Unrated reviews never match.
    pub min_rating: Option<i32>,
}

impl ReviewFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.submission_id.map(|id| Column::SubmissionId.eq(id)))
            .add_option(self.min_rating.map(|min| Column::Rating.gte(min)))
    }
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Review, AccessError> {
        ReviewEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load review");
            })
            .require("reviews", id)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &ReviewFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<Review>, AccessError> {
        fetch_page(
            conn,
            ReviewEntity::find().filter(filter.condition()),
            Column::Id,
            Column::ReviewedAt,
            order,
            page,
        )
        .await
    }
}
