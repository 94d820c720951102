//! MySQL metadata adapter.
//!
//! # Module Structure
//! - `connection`: Single-connection pool shared with the Doris adapter
//! - `type_mapping`: `COLUMN_TYPE` rendering
//!
//! # Comment Semantics
//! The table comment comes from `INFORMATION_SCHEMA.TABLES` filtered by
//! table name only, relying on the connection's default schema. A missing
//! or empty comment falls back to the table name.

pub(crate) mod connection;
mod type_mapping;


use super::{ConnectionConfig, MetadataAdapter, helpers::RowExt};
use crate::Result;
use crate::models::{ColumnInfo, DatabaseFamily, TableSchema};
use async_trait::async_trait;
use sqlx::MySqlPool;

pub use type_mapping::render_mysql_type;

const LIST_TABLES_QUERY: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR) AS TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = DATABASE()
    AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME
"#;

const TABLE_COMMENT_QUERY: &str = r#"
    SELECT CAST(TABLE_COMMENT AS CHAR) AS TABLE_COMMENT
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_NAME = ?
    LIMIT 1
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        CAST(COLUMN_NAME AS CHAR) AS COLUMN_NAME,
        CAST(COLUMN_TYPE AS CHAR) AS COLUMN_TYPE,
        CAST(COLUMN_COMMENT AS CHAR) AS COLUMN_COMMENT
    FROM INFORMATION_SCHEMA.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
    AND TABLE_NAME = ?
    ORDER BY ORDINAL_POSITION
"#;

/// MySQL metadata adapter over a single-connection pool
pub struct MySqlAdapter {
    pool: MySqlPool,
}

impl std::fmt::Debug for MySqlAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MySqlAdapter")
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

impl MySqlAdapter {
    /// Creates a MySQL adapter. No connection is opened until first use.
    ///
    /// # Errors
    /// Returns a configuration error if the driver rejects the options
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let pool = connection::create_mysql_connection_pool(config, true)?;
        Ok(Self { pool })
    }

    /// Column metadata in ordinal order.
    async fn collect_columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table_name)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                crate::error::ExtractorError::from_sqlx(
                    format!("Failed to collect columns for table '{}'", table_name),
                    e,
                )
            })?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row.get_field("COLUMN_NAME", Some(table_name))?;
            let column_type: Option<String> = row.get_field("COLUMN_TYPE", Some(table_name))?;
            let comment: Option<String> = row.get_field("COLUMN_COMMENT", Some(table_name))?;

            columns.push(ColumnInfo::new(
                name,
                render_mysql_type(column_type.as_deref().unwrap_or_default()),
                comment.as_deref(),
            ));
        }

        Ok(columns)
    }
}

#[async_trait]
impl MetadataAdapter for MySqlAdapter {
    fn family(&self) -> DatabaseFamily {
        DatabaseFamily::MySql
    }

    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| crate::error::ExtractorError::from_sqlx("MySQL connectivity test", e))?;

        if connectivity_result != 1 {
            return Err(crate::error::ExtractorError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| crate::error::ExtractorError::from_sqlx("Failed to enumerate tables", e))?;

        rows.iter()
            .map(|row| row.get_field::<String>("TABLE_NAME", None))
            .collect()
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        let comment: Option<Option<String>> = sqlx::query_scalar(TABLE_COMMENT_QUERY)
            .bind(table_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                crate::error::ExtractorError::from_sqlx(
                    format!("Failed to read comment for table '{}'", table_name),
                    e,
                )
            })?;

        Ok(super::helpers::comment_or_table_name(
            comment.flatten(),
            table_name,
        ))
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let comment = self.table_comment(table_name).await?;
        let columns = self.collect_columns(table_name).await?;

        tracing::debug!(
            "Collected MySQL table '{}' with {} columns",
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
