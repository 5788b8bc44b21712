use crate::error::AccessError;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::error::Error;
use std::time::Duration;

/// Connection settings. Unset pool sizes and timeouts keep the driver defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub url: String,
    pub min_connections: Option<u32>,
    pub max_connections: Option<u32>,
    pub connect_timeout: Option<Duration>,
    pub acquire_timeout: Option<Duration>,
    /// Log every statement at debug level.
    pub sqlx_logging: bool,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            min_connections: None,
            max_connections: None,
            connect_timeout: None,
            acquire_timeout: None,
            sqlx_logging: false,
        }
    }

    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.clone());
        if let Some(min_connections) = self.min_connections {
            options.min_connections(min_connections);
        }
        if let Some(max_connections) = self.max_connections {
            options.max_connections(max_connections);
        }
        if let Some(timeout) = self.connect_timeout {
            options.connect_timeout(timeout);
        }
        if let Some(timeout) = self.acquire_timeout {
            options.acquire_timeout(timeout);
        }
        options.sqlx_logging(self.sqlx_logging);
        options
    }
}

/// Owns the connection pool. Access functions borrow [`Store::connection`].
#[derive(Debug)]
pub struct Store {
    connection: DatabaseConnection,
}

impl Store {
    pub async fn connect(config: &StoreConfig) -> Result<Self, AccessError> {
        tracing::info!("connecting to database");
        let connection = Database::connect(config.connect_options()).await.inspect_err(|error| {
            tracing::error!(error = error as &dyn Error, "failed to connect to database");
        })?;
        Ok(Self { connection })
    }

    #[must_use]
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    #[must_use]
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_options_carry_pool_settings() {
        let config = StoreConfig {
            min_connections: Some(1),
            max_connections: Some(8),
            acquire_timeout: Some(Duration::from_secs(3)),
            ..StoreConfig::new("sqlite::memory:")
        };
        let options = config.connect_options();
        assert_eq!(options.get_url(), "sqlite::memory:");
        assert_eq!(options.get_min_connections(), Some(1));
        assert_eq!(options.get_max_connections(), Some(8));
        assert_eq!(options.get_acquire_timeout(), Some(Duration::from_secs(3)));
        assert_eq!(options.get_connect_timeout(), None);
    }
}
