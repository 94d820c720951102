//! Oracle metadata adapter.
//!
//! Requires Oracle Instant Client at runtime. The `oracle` crate is
//! synchronous, so every catalog round trip runs on the blocking thread
//! pool through `tokio::task::spawn_blocking`.
//!
//! # Owner Scoping
//! Catalog views are filtered with `(OWNER = :owner OR OWNER = UPPER(:owner))`
//! so that both the exact and the upper-cased table name alternatives stay
//! within the connecting user's schema.
//!
//! # Comment Semantics
//! Unlike the other families, a missing table comment is the empty string.

use super::{ConnectionConfig, MetadataAdapter};
use crate::Result;
use crate::error::ExtractorError;
use crate::models::{ColumnInfo, DatabaseFamily, TableSchema};
use ::oracle::pool::{CloseMode, GetMode, Pool, PoolBuilder};
use async_trait::async_trait;

const LIST_TABLES_QUERY: &str = r#"
    SELECT TABLE_NAME
    FROM ALL_TABLES
    WHERE (OWNER = :owner OR OWNER = UPPER(:owner))
    AND IOT_NAME IS NULL
    AND DURATION IS NULL
    AND NVL(TABLESPACE_NAME, 'no tablespace') NOT IN ('SYSTEM', 'SYSAUX')
    ORDER BY TABLE_NAME
"#;

const TABLE_COMMENT_QUERY: &str = r#"
    SELECT COMMENTS
    FROM ALL_TAB_COMMENTS
    WHERE (OWNER = :owner OR OWNER = UPPER(:owner))
    AND (TABLE_NAME = :table_name OR TABLE_NAME = UPPER(:table_name))
"#;

const COLUMNS_QUERY: &str = r#"
    SELECT
        a.COLUMN_NAME,
        a.DATA_TYPE,
        b.COMMENTS
    FROM ALL_TAB_COLUMNS a
    LEFT JOIN ALL_COL_COMMENTS b
        ON a.OWNER = b.OWNER
        AND a.TABLE_NAME = b.TABLE_NAME
        AND a.COLUMN_NAME = b.COLUMN_NAME
    WHERE (a.OWNER = :owner OR a.OWNER = UPPER(:owner))
    AND (a.TABLE_NAME = :table_name OR a.TABLE_NAME = UPPER(:table_name))
    ORDER BY a.COLUMN_ID
"#;

/// ORA/DPI codes that mean the database could not be reached or the login
/// was refused.
const CONNECTION_ERROR_CODES: &[&str] = &[
    "ORA-01017", "ORA-01005", "ORA-12154", "ORA-12170", "ORA-12514", "ORA-12541",
    "ORA-12543", "ORA-03113", "ORA-03114", "ORA-03135", "DPI-1047", "DPI-1080",
];

/// Oracle metadata adapter over a one-session pool
pub struct OracleAdapter {
    pool: Pool,
    owner: String,
}

impl std::fmt::Debug for OracleAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleAdapter")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl OracleAdapter {
    /// Creates the session pool for `//host:port/database`.
    ///
    /// Driver properties are not used by this family.
    ///
    /// # Errors
    /// Returns a connection error if Instant Client is missing or the pool
    /// cannot be created
    pub async fn new(config: &ConnectionConfig) -> Result<Self> {
        for (key, _) in config.properties.iter() {
            tracing::debug!("Ignoring Oracle connection property '{}'", key);
        }

        let username = config.username.clone();
        let password = config.password().to_string();
        let connect_string = format!("//{}:{}/{}", config.host, config.port, config.database);
        let display = connect_string.clone();
        let timeout = config.connect_timeout;

        let pool = tokio::task::spawn_blocking(move || {
            PoolBuilder::new(username, password, connect_string)
                .min_connections(0)
                .max_connections(1)
                .get_mode(GetMode::TimedWait(timeout))
                .build()
        })
        .await
        .map_err(|e| ExtractorError::connection_failed("Oracle pool creation task failed", e))?
        .map_err(|e| classify(format!("Failed to create Oracle session pool for {}", display), e))?;

        tracing::debug!("Prepared Oracle session pool for {}", display);

        Ok(Self {
            pool,
            owner: config.username.clone(),
        })
    }

    /// Runs a named-parameter query on the blocking pool and collects the
    /// first `width` columns of every row as optional strings.
    async fn fetch_text_rows(
        &self,
        sql: &'static str,
        table_name: Option<&str>,
        width: usize,
        context: String,
    ) -> Result<Vec<Vec<Option<String>>>> {
        let pool = self.pool.clone();
        let owner = self.owner.clone();
        let table_name = table_name.map(str::to_string);

        let outcome = tokio::task::spawn_blocking(move || -> ::oracle::Result<_> {
            let conn = pool.get()?;
            let rows = match &table_name {
                Some(table_name) => {
                    conn.query_named(sql, &[("owner", &owner), ("table_name", table_name)])?
                }
                None => conn.query_named(sql, &[("owner", &owner)])?,
            };

            let mut collected = Vec::new();
            for row in rows {
                let row = row?;
                let mut values = Vec::with_capacity(width);
                for index in 0..width {
                    values.push(row.get::<usize, Option<String>>(index)?);
                }
                collected.push(values);
            }
            Ok(collected)
        })
        .await
        .map_err(|e| ExtractorError::query_failed(format!("{} (task failed)", context), e))?;

        outcome.map_err(|e| classify(context, e))
    }

    async fn owner_scoped_comment(&self, table_name: &str) -> Result<String> {
        let rows = self
            .fetch_text_rows(
                TABLE_COMMENT_QUERY,
                Some(table_name),
                1,
                format!("Failed to read comment for table '{}'", table_name),
            )
            .await?;

        Ok(first_comment(rows))
    }
}

/// First comment of an `ALL_TAB_COMMENTS` result; no row or NULL is `""`.
fn first_comment(rows: Vec<Vec<Option<String>>>) -> String {
    rows.into_iter()
        .next()
        .and_then(|row| row.into_iter().next().flatten())
        .unwrap_or_default()
}

/// Maps an Oracle failure onto the connection or query variant.
fn classify(context: impl Into<String>, error: ::oracle::Error) -> ExtractorError {
    let message = error.to_string();
    if CONNECTION_ERROR_CODES
        .iter()
        .any(|code| message.contains(code))
    {
        ExtractorError::connection_failed(context, error)
    } else {
        ExtractorError::query_failed(context, error)
    }
}

/// Lower-cases names stored in Oracle's case-insensitive upper-case form.
fn normalize_table_name(name: String) -> String {
    if name.chars().any(char::is_alphabetic) && name == name.to_uppercase() {
        name.to_lowercase()
    } else {
        name
    }
}

#[async_trait]
impl MetadataAdapter for OracleAdapter {
    fn family(&self) -> DatabaseFamily {
        DatabaseFamily::Oracle
    }

    async fn test_connection(&self) -> Result<()> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> ::oracle::Result<i64> {
            let conn = pool.get()?;
            conn.query_row_as::<i64>("SELECT 1 FROM DUAL", &[])
        })
        .await
        .map_err(|e| ExtractorError::query_failed("Oracle connectivity test task failed", e))?
        .map_err(|e| classify("Oracle connectivity test", e))?;
        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        let rows = self
            .fetch_text_rows(
                LIST_TABLES_QUERY,
                None,
                1,
                "Failed to enumerate tables".to_string(),
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .map(normalize_table_name)
            .collect())
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        self.owner_scoped_comment(table_name).await
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        let comment = self.owner_scoped_comment(table_name).await?;
        let rows = self
            .fetch_text_rows(
                COLUMNS_QUERY,
                Some(table_name),
                3,
                format!("Failed to collect columns for table '{}'", table_name),
            )
            .await?;

        let columns: Vec<ColumnInfo> = rows
            .into_iter()
            .map(|row| {
                let mut values = row.into_iter();
                let name = values.next().flatten().unwrap_or_default();
                let data_type = values.next().flatten().unwrap_or_default();
                let comment = values.next().flatten();
                ColumnInfo::new(name, data_type, comment.as_deref())
            })
            .collect();

        tracing::debug!(
            "Collected Oracle table '{}' with {} columns",
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
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || pool.close(&CloseMode::Default)).await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::debug!("Oracle session pool already closed: {}", e),
            Err(e) => tracing::debug!("Oracle pool close task failed: {}", e),
        }
    }
}
