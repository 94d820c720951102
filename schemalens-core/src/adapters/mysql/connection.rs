//! MySQL-protocol connection resource, shared by the MySQL and Doris adapters.
//!
//! # Security Features
//! - One connection per extractor, checked out per unit of work
//! - Acquire timeout from the connection configuration
//! - Connection URL redacted in every error message

use super::ConnectionConfig;
use crate::Result;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use std::str::FromStr;

/// Creates a lazily-connecting single-connection MySQL pool.
///
/// # Arguments
/// * `config` - Connection configuration (MySQL or Doris family)
/// * `read_only` - Put each session into read-only transaction mode
///
/// # Errors
/// Returns a configuration error if the connection URL or its properties
/// are rejected by the driver.
pub(crate) fn create_mysql_connection_pool(
    config: &ConnectionConfig,
    read_only: bool,
) -> Result<MySqlPool> {
    use sqlx::Executor;

    let url = config.connection_url()?;
    let options = MySqlConnectOptions::from_str(url.as_str()).map_err(|e| {
        crate::error::ExtractorError::configuration(format!(
            "Invalid MySQL connection options for {}: {}",
            crate::error::redact_database_url(url.as_str()),
            e
        ))
    })?;

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .min_connections(0)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                if read_only {
                    conn.execute("SET SESSION TRANSACTION READ ONLY").await?;
                }
                Ok(())
            })
        })
        .connect_lazy_with(options);

    tracing::debug!(
        "Prepared MySQL-protocol connection to {}",
        crate::error::redact_database_url(url.as_str())
    );

    Ok(pool)
}

/// Decodes a text column that MySQL may report as either text or binary.
///
/// `SHOW` statements return identifiers as VARBINARY on some server
/// versions, which sqlx will not decode straight into `String`.
pub(crate) fn get_text(row: &sqlx::mysql::MySqlRow, index: usize) -> Result<Option<String>> {
    use sqlx::Row;

    match row.try_get::<Option<String>, _>(index) {
        Ok(value) => Ok(value),
        Err(_) => row
            .try_get::<Option<Vec<u8>>, _>(index)
            .map(|bytes| bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
            .map_err(|e| {
                crate::error::ExtractorError::parse_field(&format!("#{}", index), None, e)
            }),
    }
}
