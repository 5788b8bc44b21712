use lms_entity::schema::ValidationError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("{entity} {id} is still referenced by {dependent}")]
    ReferentialIntegrity { entity: String, id: i32, dependent: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: i32 },

    #[error("store unavailable")]
    StoreUnavailable(#[source] DbErr),

    #[error("store error")]
    Store(#[source] DbErr),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    DuplicateKey,
    ForeignKeyViolation,
    ReferentialIntegrity,
    NotFound,
    StoreUnavailable,
    Store,
}

/// Response class a request layer reports for an [`ErrorKind`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ResponseClass {
    ClientError,
    NotFound,
    Conflict,
    ServerError,
}

impl ErrorKind {
    #[must_use]
    pub fn response_class(self) -> ResponseClass {
        match self {
            Self::Validation | Self::ForeignKeyViolation => ResponseClass::ClientError,
            Self::NotFound => ResponseClass::NotFound,
            Self::DuplicateKey => ResponseClass::Conflict,
            Self::ReferentialIntegrity | Self::StoreUnavailable | Self::Store => ResponseClass::ServerError,
        }
    }
}

impl AccessError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::ForeignKeyViolation(_) => ErrorKind::ForeignKeyViolation,
            Self::ReferentialIntegrity { .. } => ErrorKind::ReferentialIntegrity,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::StoreUnavailable(_) => ErrorKind::StoreUnavailable,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Nothing was committed, so the caller may run the operation again unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    pub(crate) fn not_found(entity: impl Into<String>, id: i32) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id,
        }
    }
}

impl From<DbErr> for AccessError {
    fn from(error: DbErr) -> Self {
        match error.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => return Self::DuplicateKey(detail),
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => return Self::ForeignKeyViolation(detail),
            _ => {}
        }
        match error {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Self::StoreUnavailable(error),
            error => Self::Store(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnAcquireErr, RuntimeErr};

    #[test]
    fn connection_failures_are_retryable() {
        let error = AccessError::from(DbErr::ConnectionAcquire(ConnAcquireErr::Timeout));
        assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
        assert!(error.is_retryable());

        let error = AccessError::from(DbErr::Conn(RuntimeErr::Internal("connection reset".to_owned())));
        assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn other_store_errors_are_terminal() {
        let error = AccessError::from(DbErr::Custom("boom".to_owned()));
        assert_eq!(error.kind(), ErrorKind::Store);
        assert!(!error.is_retryable());
        assert_eq!(error.kind().response_class(), ResponseClass::ServerError);
    }

    #[test]
    fn response_classes() {
        assert_eq!(ErrorKind::Validation.response_class(), ResponseClass::ClientError);
        assert_eq!(ErrorKind::ForeignKeyViolation.response_class(), ResponseClass::ClientError);
        assert_eq!(ErrorKind::NotFound.response_class(), ResponseClass::NotFound);
        assert_eq!(ErrorKind::DuplicateKey.response_class(), ResponseClass::Conflict);
        assert_eq!(ErrorKind::StoreUnavailable.response_class(), ResponseClass::ServerError);
    }

    #[test]
    fn not_found_message() {
        assert_eq!(
            AccessError::not_found("students", 7).to_string(),
            "students 7 not found"
        );
    }
}
