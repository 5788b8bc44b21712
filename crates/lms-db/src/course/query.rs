use crate::error::AccessError;
use crate::page::{Page, SortOrder, fetch_page};
use crate::util::RequireRecord;
use lms_entity::course::{Column, Entity as CourseEntity, Model as Course};
use sea_orm::prelude::Decimal;
use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter};
use std::error::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub title: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound.
    pub max_price: Option<Decimal>,
}

impl CourseFilter {
    fn condition(&self) -> Condition {
        Condition::all()
            .add_option(self.title.as_deref().map(|title| Column::Title.eq(title)))
            .add_option(self.min_price.map(|min| Column::MonthlyPrice.gte(min)))
            .add_option(self.max_price.map(|max| Column::MonthlyPrice.lte(max)))
    }
}

pub struct Query;

impl Query {
    pub async fn get_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> Result<Course, AccessError> {
        CourseEntity::find_by_id(id)
            .one(conn)
            .await
            .inspect_err(|error| {
                tracing::error!(error = error as &dyn Error, %id, "failed to load course");
            })
            .require("courses", id)
    }

    pub async fn list<C: ConnectionTrait>(
        conn: &C,
        filter: &CourseFilter,
        order: SortOrder,
        page: Page,
    ) -> Result<Vec<Course>, AccessError> {
        fetch_page(
            conn,
            CourseEntity::find().filter(filter.condition()),
            Column::Id,
            Column::CreatedAt,
            order,
            page,
        )
        .await
    }
}
