//! PostgreSQL connection resource.
//!
//! # Security Features
//! - One connection per extractor
//! - Every session defaults to read-only transactions
//! - Connection URL redacted in every error message

use super::ConnectionConfig;
use crate::Result;
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;

/// Application name reported to the server unless the caller sets one.
const DEFAULT_APPLICATION_NAME: &str = concat!("schemalens-", env!("CARGO_PKG_VERSION"));

/// Creates a lazily-connecting single-connection PostgreSQL pool.
///
/// Driver properties travel as URL query parameters, so `sslmode`,
/// `application_name` and friends are understood by sqlx directly.
///
/// # Errors
/// Returns a configuration error if the connection URL or its properties
/// are rejected by the driver.
pub(crate) fn create_postgres_connection_pool(config: &ConnectionConfig) -> Result<PgPool> {
    use sqlx::Executor;

    let url = config.connection_url()?;
    let mut options = PgConnectOptions::from_str(url.as_str()).map_err(|e| {
        crate::error::ExtractorError::configuration(format!(
            "Invalid PostgreSQL connection options for {}: {}",
            crate::error::redact_database_url(url.as_str()),
            e
        ))
    })?;

    if config.properties.get("application_name").is_none() {
        options = options.application_name(DEFAULT_APPLICATION_NAME);
    }

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(0)
        .acquire_timeout(config.connect_timeout)
        .test_before_acquire(true)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET default_transaction_read_only = on")
                    .await?;
                conn.execute("SET lock_timeout = '30s'").await?;
                Ok(())
            })
        })
        .connect_lazy_with(options);

    tracing::debug!(
        "Prepared PostgreSQL connection to {}",
        crate::error::redact_database_url(url.as_str())
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_application_name_carries_version() {
        assert!(DEFAULT_APPLICATION_NAME.starts_with("schemalens-"));
        assert!(DEFAULT_APPLICATION_NAME.len() > "schemalens-".len());
    }
}
