//! PostgreSQL metadata adapter.
//!
//! # Module Structure
//! - `connection`: Single-connection pool with read-only sessions
//! - `type_mapping`: `format_type()` rendering
//!
//! Catalog queries run against `pg_catalog` scoped to `current_schema()`,
//! so the connection's `search_path` decides which schema is described.
//! Ordinary and partitioned tables are both reported.

mod connection;
mod type_mapping;


use super::{ConnectionConfig, MetadataAdapter, helpers::RowExt};
use crate::Result;
use crate::error::ExtractorError;
use crate::models::{ColumnInfo, DatabaseFamily, TableSchema};
use async_trait::async_trait;
use sqlx::PgPool;

pub use type_mapping::render_postgres_type;

const LIST_TABLES_QUERY: &str = r#"
    SELECT c.relname::text AS table_name
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = current_schema()
    AND c.relkind IN ('r', 'p')
    ORDER BY c.relname
"#;

const TABLE_COMMENT_QUERY: &str = r#"
    SELECT obj_description(c.oid, 'pg_class') AS table_comment
    FROM pg_catalog.pg_class c
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relname = $1
    AND n.nspname = current_schema()
    LIMIT 1
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        a.attname::text AS column_name,
        format_type(a.atttypid, a.atttypmod) AS column_type,
        col_description(a.attrelid, a.attnum) AS column_comment
    FROM pg_catalog.pg_attribute a
    JOIN pg_catalog.pg_class c ON c.oid = a.attrelid
    JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
    WHERE c.relname = $1
    AND n.nspname = current_schema()
    AND a.attnum > 0
    AND NOT a.attisdropped
    ORDER BY a.attnum
"#;

/// PostgreSQL metadata adapter over a single-connection pool
pub struct PostgresAdapter {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresAdapter")
            .field("pool_size", &self.pool.size())
            .field("pool_idle", &self.pool.num_idle())
            .finish_non_exhaustive()
    }
}

impl PostgresAdapter {
    /// Creates a PostgreSQL adapter. No connection is opened until first use.
    ///
    /// # Errors
    /// Returns a configuration error if the driver rejects the options
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let pool = connection::create_postgres_connection_pool(config)?;
        Ok(Self { pool })
    }

    async fn collect_columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(COLUMNS_QUERY)
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
            let name: String = row.get_field("column_name", Some(table_name))?;
            let column_type: Option<String> = row.get_field("column_type", Some(table_name))?;
            let comment: Option<String> = row.get_field("column_comment", Some(table_name))?;

            columns.push(ColumnInfo::new(
                name,
                render_postgres_type(column_type.as_deref().unwrap_or_default()),
                comment.as_deref(),
            ));
        }

        Ok(columns)
    }
}

#[async_trait]
impl MetadataAdapter for PostgresAdapter {
    fn family(&self) -> DatabaseFamily {
        DatabaseFamily::PostgreSql
    }

    async fn test_connection(&self) -> Result<()> {
        let connectivity_result: i32 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ExtractorError::from_sqlx("PostgreSQL connectivity test", e))?;

        if connectivity_result != 1 {
            return Err(ExtractorError::configuration(
                "Basic connectivity test failed: unexpected result",
            ));
        }

        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        let rows = sqlx::query(LIST_TABLES_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ExtractorError::from_sqlx("Failed to enumerate tables", e))?;

        rows.iter()
            .map(|row| row.get_field::<String>("table_name", None))
            .collect()
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        let comment: Option<Option<String>> = sqlx::query_scalar(TABLE_COMMENT_QUERY)
            .bind(table_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                ExtractorError::from_sqlx(
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
            "Collected PostgreSQL table '{}' with {} columns",
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
