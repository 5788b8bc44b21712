use crate::error::AccessError;
use crate::validate::table;
use lms_entity::schema::{ValidationError, Violation};
use sea_orm::{ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Select};
use std::error::Error;

pub const DEFAULT_LIMIT: i64 = 100;

/// Offset/limit window for list queries. Signed so that negative input from a caller is
/// reported as a validation failure instead of wrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Page {
    pub offset: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    #[must_use]
    pub const fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    pub(crate) fn bounds(self, table: &str) -> Result<(u64, u64), ValidationError> {
        let bound = |column: &str, value: i64| {
            u64::try_from(value)
                .map_err(|_| ValidationError::new(table, column, Violation::BelowMinimum { value, min: 0 }))
        };
        Ok((bound("offset", self.offset)?, bound("limit", self.limit)?))
    }
}

/// Row order of list queries.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Primary key ascending.
    #[default]
    Key,
    /// Timestamp column ascending, ties broken by key.
    Oldest,
    /// Timestamp column descending, ties broken by key.
    Newest,
}

/// Runs a filtered select in `order` and returns the rows inside `page`.
///
/// A zero limit yields no rows without touching the store.
pub(crate) async fn fetch_page<E, C>(
    conn: &C,
    select: Select<E>,
    key: E::Column,
    timestamp: E::Column,
    order: SortOrder,
    page: Page,
) -> Result<Vec<E::Model>, AccessError>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let (offset, limit) = page.bounds(&table::<E>())?;
    if limit == 0 {
        return Ok(Vec::new());
    }
    let select = match order {
        SortOrder::Key => select.order_by_asc(key),
        SortOrder::Oldest => select.order_by_asc(timestamp).order_by_asc(key),
        SortOrder::Newest => select.order_by_desc(timestamp).order_by_asc(key),
    };
    let rows = select.offset(offset).limit(limit).all(conn).await.inspect_err(|error| {
        tracing::error!(error = error as &dyn Error, table = %table::<E>(), "failed to list rows");
    })?;
    tracing::trace!(table = %table::<E>(), count = rows.len(), "listed rows");
    Ok(rows)
}
