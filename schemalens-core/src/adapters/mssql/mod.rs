//! SQL Server metadata adapter.
//!
//! # Module Structure
//! - `connection`: tiberius client configuration and connect
//! - `type_mapping`: `INFORMATION_SCHEMA` type recombination
//!
//! Table listing and column queries are scoped to the login's default
//! schema (`SCHEMA_NAME()`). Column comments are read from the
//! `MS_Description` extended property. The table comment is the first
//! table-level (`minor_id = 0`) extended property of any name on a table
//! with that name.

mod connection;
mod type_mapping;

use super::{ConnectionConfig, MetadataAdapter};
use crate::Result;
use crate::error::ExtractorError;
use crate::models::{ColumnInfo, DatabaseFamily, TableSchema};
use async_trait::async_trait;
use connection::{SqlServerClient, SqlServerConnector};
use tiberius::{Query, Row};
use tokio::sync::Mutex;

pub use type_mapping::render_mssql_type;

const LIST_TABLES_QUERY: &str = r#"
    SELECT TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_TYPE = 'BASE TABLE'
    AND TABLE_SCHEMA = SCHEMA_NAME()
    ORDER BY TABLE_NAME
"#;

// Any table-level extended property counts, in any schema.
const TABLE_COMMENT_QUERY: &str = r#"
    SELECT CAST(ep.value AS NVARCHAR(500)) AS table_comment
    FROM sys.tables t
    INNER JOIN sys.extended_properties ep
        ON t.object_id = ep.major_id
    WHERE t.name = @P1
    AND ep.minor_id = 0
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        c.COLUMN_NAME,
        c.DATA_TYPE,
        c.CHARACTER_MAXIMUM_LENGTH,
        CAST(c.NUMERIC_PRECISION AS INT) AS NUMERIC_PRECISION,
        c.NUMERIC_SCALE,
        CAST(ep.value AS NVARCHAR(4000)) AS COLUMN_COMMENT
    FROM INFORMATION_SCHEMA.COLUMNS c
    LEFT JOIN sys.extended_properties ep
        ON ep.major_id = OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME))
        AND ep.minor_id = COLUMNPROPERTY(
            OBJECT_ID(QUOTENAME(c.TABLE_SCHEMA) + '.' + QUOTENAME(c.TABLE_NAME)),
            c.COLUMN_NAME,
            'ColumnId'
        )
        AND ep.class = 1
        AND ep.name = 'MS_Description'
    WHERE c.TABLE_SCHEMA = SCHEMA_NAME()
    AND c.TABLE_NAME = @P1
    ORDER BY c.ORDINAL_POSITION
"#;

/// SQL Server metadata adapter over a single lazily-established client
pub struct SqlServerAdapter {
    connector: SqlServerConnector,
    client: Mutex<Option<SqlServerClient>>,
}

impl std::fmt::Debug for SqlServerAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlServerAdapter")
            .field("connector", &self.connector)
            .finish_non_exhaustive()
    }
}

impl SqlServerAdapter {
    /// Creates a SQL Server adapter. The client connects on first use.
    ///
    /// # Errors
    /// Returns a configuration error for unrecognized property values
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        Ok(Self {
            connector: SqlServerConnector::from_config(config)?,
            client: Mutex::new(None),
        })
    }

    /// Runs a catalog query and returns its first result set.
    ///
    /// A transport failure drops the client so the next call reconnects.
    async fn fetch_rows(
        &self,
        sql: &'static str,
        params: &[&str],
        context: impl Into<String>,
    ) -> Result<Vec<Row>> {
        let mut slot = self.client.lock().await;
        if slot.is_none() {
            *slot = Some(self.connector.connect().await?);
        }
        let client = slot
            .as_mut()
            .ok_or_else(|| ExtractorError::configuration("SQL Server client unavailable"))?;

        let mut query = Query::new(sql);
        for param in params {
            query.bind(*param);
        }

        let result = match query.query(client).await {
            Ok(stream) => stream.into_first_result().await,
            Err(e) => Err(e),
        };

        result.map_err(|e| {
            let error = ExtractorError::from_tiberius(context, e);
            if matches!(error, ExtractorError::Connection { .. }) {
                *slot = None;
            }
            error
        })
    }

    async fn collect_columns(&self, table_name: &str) -> Result<Vec<ColumnInfo>> {
        let rows = self
            .fetch_rows(
                COLUMNS_QUERY,
                &[table_name],
                format!("Failed to collect columns for table '{}'", table_name),
            )
            .await?;

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = get_str(row, "COLUMN_NAME", Some(table_name))?.unwrap_or_default();
            let data_type = get_str(row, "DATA_TYPE", Some(table_name))?.unwrap_or_default();
            let length = get_i32(row, "CHARACTER_MAXIMUM_LENGTH", table_name)?;
            let precision = get_i32(row, "NUMERIC_PRECISION", table_name)?;
            let scale = get_i32(row, "NUMERIC_SCALE", table_name)?;
            let comment = get_str(row, "COLUMN_COMMENT", Some(table_name))?;

            columns.push(ColumnInfo::new(
                name,
                render_mssql_type(data_type, length, precision, scale),
                comment,
            ));
        }

        Ok(columns)
    }
}

fn get_str<'a>(row: &'a Row, field: &str, table: Option<&str>) -> Result<Option<&'a str>> {
    row.try_get::<&str, _>(field)
        .map_err(|e| ExtractorError::parse_field(field, table, e))
}

fn get_i32(row: &Row, field: &str, table: &str) -> Result<Option<i32>> {
    row.try_get::<i32, _>(field)
        .map_err(|e| ExtractorError::parse_field(field, Some(table), e))
}

#[async_trait]
impl MetadataAdapter for SqlServerAdapter {
    fn family(&self) -> DatabaseFamily {
        DatabaseFamily::SqlServer
    }

    async fn test_connection(&self) -> Result<()> {
        self.fetch_rows("SELECT 1", &[], "SQL Server connectivity test")
            .await?;
        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        let rows = self
            .fetch_rows(LIST_TABLES_QUERY, &[], "Failed to enumerate tables")
            .await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = get_str(row, "TABLE_NAME", None)? {
                tables.push(name.to_string());
            }
        }
        Ok(tables)
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        let rows = self
            .fetch_rows(
                TABLE_COMMENT_QUERY,
                &[table_name],
                format!("Failed to read comment for table '{}'", table_name),
            )
            .await?;

        let comment = match rows.first() {
            Some(row) => get_str(row, "table_comment", Some(table_name))?.map(str::to_string),
            None => None,
        };

        Ok(super::helpers::comment_or_table_name(comment, table_name))
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let comment = self.table_comment(table_name).await?;
        let columns = self.collect_columns(table_name).await?;

        tracing::debug!(
            "Collected SQL Server table '{}' with {} columns",
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
        let client = self.client.lock().await.take();
        if let Some(client) = client
            && let Err(e) = client.close().await
        {
            tracing::debug!("Error while closing SQL Server connection: {}", e);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn config() -> ConnectionConfig {
        ConnectionConfig::new(
            DatabaseFamily::SqlServer,
            "127.0.0.1",
            9,
            "sa",
            "Str0ng!Pass",
            "shop",
        )
        .with_connect_timeout(std::time::Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_sql_server_adapter_does_not_connect_eagerly() {
        let adapter = SqlServerAdapter::new(&config()).unwrap();
        assert!(adapter.client.lock().await.is_none());
        assert_eq!(adapter.family(), DatabaseFamily::SqlServer);
    }

    #[tokio::test]
    async fn test_sql_server_unreachable_server_is_connection_error() {
        let adapter = SqlServerAdapter::new(&config()).unwrap();
        let result = adapter.discover_tables().await;
        assert!(matches!(result, Err(ExtractorError::Connection { .. })));
        assert!(adapter.client.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_sql_server_close_without_connection() {
        let adapter = SqlServerAdapter::new(&config()).unwrap();
        adapter.close().await;
        adapter.close().await;
    }

    #[test]
    fn test_table_comment_reads_any_table_level_property() {
        assert!(TABLE_COMMENT_QUERY.contains("ep.minor_id = 0"));
        assert!(TABLE_COMMENT_QUERY.contains("t.name = @P1"));
        assert!(!TABLE_COMMENT_QUERY.contains("MS_Description"));
        assert!(!TABLE_COMMENT_QUERY.contains("ep.class"));
        assert!(!TABLE_COMMENT_QUERY.contains("SCHEMA_ID()"));
    }

    #[test]
    fn test_column_comments_use_ms_description() {
        assert!(COLUMNS_QUERY.contains("ep.name = 'MS_Description'"));
        assert!(COLUMNS_QUERY.contains("c.TABLE_SCHEMA = SCHEMA_NAME()"));
    }

    #[test]
    fn test_catalog_queries_use_bound_parameters() {
        assert!(TABLE_COMMENT_QUERY.contains("@P1"));
        assert!(COLUMNS_QUERY.contains("@P1"));
        assert!(LIST_TABLES_QUERY.contains("SCHEMA_NAME()"));
    }
}
