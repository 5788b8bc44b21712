use crate::error::AccessError;
use sea_orm::{ActiveValue, DbErr, TransactionError, Value};
use std::error::Error;

pub trait FlattenTransactionResultExt<T> {
    fn flatten_res(self) -> T;
}

impl<T, E> FlattenTransactionResultExt<Result<T, E>> for Result<T, TransactionError<E>>
where
    E: From<DbErr> + Error,
{
    fn flatten_res(self) -> Result<T, E> {
        self.map_err(|err| match err {
            TransactionError::Connection(err) => err.into(),
            TransactionError::Transaction(err) => err,
        })
    }
}

pub trait RequireRecord<T> {
    /// Turns a missing row into [`AccessError::NotFound`].
    fn require(self, entity: &str, id: i32) -> Result<T, AccessError>;
}

impl<T> RequireRecord<T> for Result<Option<T>, DbErr> {
    fn require(self, entity: &str, id: i32) -> Result<T, AccessError> {
        self?.ok_or_else(|| AccessError::not_found(entity, id))
    }
}

/// `Set` for patched fields, `NotSet` for the rest.
pub(crate) fn set_if_some<V>(value: Option<V>) -> ActiveValue<V>
where
    V: Into<Value>,
{
    value.map_or(ActiveValue::NotSet, ActiveValue::Set)
}
