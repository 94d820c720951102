//! Metadata adapter trait and factory for uniform catalog access.
//!
//! Each database family gets one `MetadataAdapter` implementation. The
//! factory picks it once, when an extractor is built, so no operation has to
//! branch on the family again.
//!
//! # Module Structure
//! - `config`: Connection configuration and driver properties
//! - `helpers`: Shared comment, quoting and row-decoding utilities
//! - Family-specific modules (mysql, doris, postgres, mssql, oracle)
//!
//! # Security Guarantees
//! - All operations are read-only catalog queries
//! - Table, schema and owner names are bound parameters
//! - Credentials are never logged

use crate::{
    Result,
    models::{DatabaseFamily, TableSchema},
};
use async_trait::async_trait;

pub mod config;
pub mod helpers;

pub use config::{ConnectionConfig, ConnectionProperties};

/// Family-specific catalog access.
///
/// # Object Safety
/// This trait is object-safe, allowing for dynamic dispatch through
/// `Box<dyn MetadataAdapter>`.
#[async_trait]
pub trait MetadataAdapter: Send + Sync {
    /// Returns the database family this adapter handles.
    fn family(&self) -> DatabaseFamily;

    /// Runs a trivial round trip to verify connectivity and credentials.
    ///
    /// # Errors
    /// Returns a connection error if the database is unreachable
    async fn test_connection(&self) -> Result<()>;

    /// Lists base tables of the connection's default schema in catalog order.
    async fn discover_tables(&self) -> Result<Vec<String>>;

    /// Looks up the table-level comment.
    ///
    /// Families differ in what a missing comment becomes; see the adapter.
    async fn table_comment(&self, table_name: &str) -> Result<String>;

    /// Collects the table comment and its columns in ordinal order.
    async fn table_schema(&self, table_name: &str) -> Result<TableSchema>;

    /// Releases the connection resource. Safe to call more than once.
    async fn close(&self);
}

/// Creates the metadata adapter for the configured family.
///
/// sqlx-backed adapters connect lazily and the SQL Server client is
/// established on first use, so this performs no network I/O for them.
/// The Oracle session pool is created eagerly.
///
/// # Errors
/// Returns error if:
/// - The configuration is invalid
/// - The family's driver is not compiled in
/// - The Oracle session pool cannot be created
pub async fn connect_adapter(config: &ConnectionConfig) -> Result<Box<dyn MetadataAdapter>> {
    config.validate()?;

    tracing::debug!("Creating {} metadata adapter for {}", config.family, config);

    match config.family {
        #[cfg(feature = "mysql")]
        DatabaseFamily::MySql => Ok(Box::new(mysql::MySqlAdapter::new(config)?)),
        #[cfg(not(feature = "mysql"))]
        DatabaseFamily::MySql => Err(crate::error::ExtractorError::unsupported_feature(
            "MySQL adapter (compile with --features mysql)",
            "mysql",
        )),
        #[cfg(feature = "mysql")]
        DatabaseFamily::Doris => Ok(Box::new(doris::DorisAdapter::new(config)?)),
        #[cfg(not(feature = "mysql"))]
        DatabaseFamily::Doris => Err(crate::error::ExtractorError::unsupported_feature(
            "Doris adapter (compile with --features mysql)",
            "doris",
        )),
        #[cfg(feature = "postgresql")]
        DatabaseFamily::PostgreSql => Ok(Box::new(postgres::PostgresAdapter::new(config)?)),
        #[cfg(not(feature = "postgresql"))]
        DatabaseFamily::PostgreSql => Err(crate::error::ExtractorError::unsupported_feature(
            "PostgreSQL adapter (compile with --features postgresql)",
            "postgresql",
        )),
        #[cfg(feature = "mssql")]
        DatabaseFamily::SqlServer => Ok(Box::new(mssql::SqlServerAdapter::new(config)?)),
        #[cfg(not(feature = "mssql"))]
        DatabaseFamily::SqlServer => Err(crate::error::ExtractorError::unsupported_feature(
            "SQL Server adapter (compile with --features mssql)",
            "mssql",
        )),
        #[cfg(feature = "oracle")]
        DatabaseFamily::Oracle => Ok(Box::new(oracle::OracleAdapter::new(config).await?)),
        #[cfg(not(feature = "oracle"))]
        DatabaseFamily::Oracle => Err(crate::error::ExtractorError::unsupported_feature(
            "Oracle adapter (compile with --features oracle)",
            "oracle",
        )),
    }
}

// Database-specific adapter modules
#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "mysql")]
pub mod doris;

#[cfg(feature = "postgresql")]
pub mod postgres;

#[cfg(feature = "mssql")]
pub mod mssql;

#[cfg(feature = "oracle")]
pub mod oracle;
