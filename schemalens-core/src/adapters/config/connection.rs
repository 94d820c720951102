//! Database connection configuration.
//!
//! `ConnectionConfig` carries everything needed to build one connection
//! resource for a `SchemaExtractor`. The password is held in a zeroizing
//! container and is never displayed, logged or serialized.

use super::ConnectionProperties;
use crate::models::DatabaseFamily;
use std::time::Duration;
use zeroize::Zeroizing;

/// Configuration for one extractor's database connection.
///
/// # Example
/// ```rust
/// use schemalens_core::{ConnectionConfig, DatabaseFamily};
///
/// let config = ConnectionConfig::new(
///     DatabaseFamily::PostgreSql,
///     "localhost",
///     5432,
///     "reader",
///     "secret",
///     "shop",
/// )
/// .with_properties_str("sslmode=disable")
/// .unwrap();
///
/// assert!(config.validate().is_ok());
/// assert!(!config.to_string().contains("secret"));
/// ```
#[derive(Clone)]
pub struct ConnectionConfig {
    /// Database family
    pub family: DatabaseFamily,
    /// Database host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Login user (also the Oracle owner for catalog lookups)
    pub username: String,
    password: Zeroizing<String>,
    /// Database (Oracle: service name)
    pub database: String,
    /// Extra driver properties
    pub properties: ConnectionProperties,
    /// Connection timeout duration
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("family", &self.family)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("properties", &self.properties)
            .field("connect_timeout", &self.connect_timeout)
            // username and password omitted
            .finish_non_exhaustive()
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}://{}:{}/{}",
            self.family.as_str(),
            self.host,
            self.port,
            self.database
        )
        // Intentionally omit username and never include credentials
    }
}

impl ConnectionConfig {
    /// Creates a new connection config with default timeout and no properties.
    pub fn new(
        family: DatabaseFamily,
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            family,
            host: host.into(),
            port,
            username: username.into(),
            password: Zeroizing::new(password.into()),
            database: database.into(),
            properties: ConnectionProperties::default(),
            connect_timeout: Duration::from_secs(30),
        }
    }

    /// Builder method to set driver properties.
    pub fn with_properties(mut self, properties: ConnectionProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Builder method to parse and set driver properties.
    ///
    /// # Errors
    /// Returns a configuration error if the properties string is malformed.
    pub fn with_properties_str(self, properties: &str) -> crate::Result<Self> {
        Ok(self.with_properties(ConnectionProperties::parse(properties)?))
    }

    /// Builder method to set the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Password for driver setup only.
    #[cfg_attr(not(any(feature = "mssql", feature = "oracle")), allow(dead_code))]
    pub(crate) fn password(&self) -> &str {
        &self.password
    }

    /// Validates connection configuration parameters.
    ///
    /// # Errors
    /// Returns error if configuration values are invalid
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::error::ExtractorError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::ExtractorError::configuration(
                "port must be greater than 0",
            ));
        }

        if self.connect_timeout.is_zero() {
            return Err(crate::error::ExtractorError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Builds the sqlx connection URL for URL-configured families.
    ///
    /// Properties are appended as query pairs. Doris uses the MySQL scheme.
    ///
    /// # Errors
    /// Returns a configuration error for Oracle/SQL Server or if a URL part
    /// cannot be set.
    pub fn connection_url(&self) -> crate::Result<url::Url> {
        let scheme = match self.family.wire_family() {
            DatabaseFamily::MySql => "mysql",
            DatabaseFamily::PostgreSql => "postgres",
            other => {
                return Err(crate::error::ExtractorError::configuration(format!(
                    "{} connections are not configured through a URL",
                    other
                )));
            }
        };

        let mut url = url::Url::parse(&format!("{}://localhost", scheme)).map_err(|e| {
            crate::error::ExtractorError::configuration(format!(
                "Failed to build connection URL: {}",
                e
            ))
        })?;

        url.set_host(Some(self.host.trim())).map_err(|e| {
            crate::error::ExtractorError::configuration(format!("Invalid host: {}", e))
        })?;
        url.set_port(Some(self.port)).map_err(|()| {
            crate::error::ExtractorError::configuration("Invalid port for connection URL")
        })?;
        if !self.username.is_empty() {
            url.set_username(&self.username).map_err(|()| {
                crate::error::ExtractorError::configuration("Invalid username for connection URL")
            })?;
        }
        if !self.password.is_empty() {
            url.set_password(Some(self.password.as_str())).map_err(|()| {
                crate::error::ExtractorError::configuration("Invalid password for connection URL")
            })?;
        }
        if !self.database.is_empty() {
            url.set_path(&format!("/{}", self.database));
        }
        if !self.properties.is_empty() {
            url.query_pairs_mut().extend_pairs(self.properties.iter());
        }

        Ok(url)
    }
}
