//! Apache Doris metadata adapter.
//!
//! Doris speaks the MySQL wire protocol, so the connection resource is
//! shared with the MySQL adapter. Catalog access differs in two places:
//!
//! - Tables are listed with `SHOW TABLES`
//! - The table comment comes from the `COMMENT='...'` clause of
//!   `SHOW CREATE TABLE`, falling back to the table name when absent
//!
//! Schema extraction reads the comment from `information_schema.tables`
//! instead, where a missing comment stays empty. Column types are returned
//! exactly as the server reports them.

use super::helpers::{RowExt, extract_create_table_comment, quote_mysql_identifier};
use super::mysql::connection::{create_mysql_connection_pool, get_text};
use super::{ConnectionConfig, MetadataAdapter};
use crate::Result;
use crate::error::ExtractorError;
use crate::models::{ColumnInfo, DatabaseFamily, TableSchema};
use async_trait::async_trait;
use sqlx::MySqlPool;

const TABLE_COMMENT_QUERY: &str = r#"
    SELECT table_comment
    FROM information_schema.tables
    WHERE table_schema = ?
    AND table_name = ?
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT column_name, column_type, column_comment
    FROM information_schema.columns
    WHERE table_schema = ?
    AND table_name = ?
    ORDER BY ordinal_position
"#;

/// Doris metadata adapter over a single MySQL-protocol connection
pub struct DorisAdapter {
    pool: MySqlPool,
    database: String,
}

impl std::fmt::Debug for DorisAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DorisAdapter")
            .field("database", &self.database)
            .field("pool_size", &self.pool.size())
            .finish_non_exhaustive()
    }
}

impl DorisAdapter {
    /// Creates a Doris adapter. No connection is opened until first use.
    ///
    /// Sessions are not switched to read-only mode because Doris frontends
    /// reject `SET SESSION TRANSACTION`.
    ///
    /// # Errors
    /// Returns a configuration error if the driver rejects the options
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let pool = create_mysql_connection_pool(config, false)?;
        Ok(Self {
            pool,
            database: config.database.clone(),
        })
    }

    /// Comment as stored in `information_schema.tables`, empty when missing.
    async fn information_schema_comment(&self, table_name: &str) -> Result<String> {
        let row = sqlx::query(TABLE_COMMENT_QUERY)
            .bind(&self.database)
            .bind(table_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                ExtractorError::from_sqlx(
                    format!("Failed to read comment for table '{}'", table_name),
                    e,
                )
            })?;

        let stored = match row {
            Some(row) => Some(get_text(&row, 0)?),
            None => None,
        };
        Ok(stored_comment(stored))
    }

    async fn collect_columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(&self.database)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                ExtractorError::from_sqlx(
                    format!("Failed to collect columns for table '{}'", table_name),
                    e,
                )
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = get_text(row, 0)?.unwrap_or_default();
            let column_type = get_text(row, 1)?.unwrap_or_default();
            let comment = get_text(row, 2)?;
            columns.push(ColumnInfo::new(name, column_type, comment.as_deref()));
        }

        Ok(columns)
    }
}

/// `information_schema` comment: no row and NULL both become `""`.
fn stored_comment(value: Option<Option<String>>) -> String {
    value.flatten().unwrap_or_default()
}

/// Table comment from the `SHOW CREATE TABLE` output, or the table name
/// when the statement has no `COMMENT='...'` clause.
fn comment_from_create_statement(create_statement: Option<&str>, table_name: &str) -> String {
    create_statement
        .and_then(extract_create_table_comment)
        .map_or_else(|| table_name.to_string(), str::to_string)
}

#[async_trait]
impl MetadataAdapter for DorisAdapter {
    fn family(&self) -> DatabaseFamily {
        DatabaseFamily::Doris
    }

    async fn test_connection(&self) -> Result<()> {
        let row = sqlx::query("SELECT 1 AS probe")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExtractorError::from_sqlx("Doris connectivity test", e))?;
        let _: i64 = row.get_field("probe", None)?;
        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExtractorError::from_sqlx("Failed to enumerate tables", e))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = get_text(row, 0)? {
                tables.push(name);
            }
        }
        Ok(tables)
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        let statement = format!("SHOW CREATE TABLE {}", quote_mysql_identifier(table_name));
        let row = sqlx::query(&statement)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                ExtractorError::from_sqlx(
                    format!("Failed to read CREATE statement for table '{}'", table_name),
                    e,
                )
            })?;

        let create_statement = match row {
            Some(row) => get_text(&row, 1)?,
            None => None,
        };

        Ok(comment_from_create_statement(
            create_statement.as_deref(),
            table_name,
        ))
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let comment = self.information_schema_comment(table_name).await?;
        let columns = self.collect_columns(table_name).await?;

        tracing::debug!(
            "Collected Doris table '{}' with {} columns",
            table_name,
            columns.len()
        );

        Ok(TableSchema {
            table_name: table_name.to_string(),
            comment,
            columns,
        })
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
