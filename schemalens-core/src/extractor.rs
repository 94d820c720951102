//! The uniform schema extraction entry point.
//!
//! A [`SchemaExtractor`] owns one metadata adapter, chosen from the
//! database family when the extractor is built, and turns the adapter's
//! catalog answers into the normalized [`SchemaMap`] shape.

use crate::Result;
use crate::adapters::{ConnectionConfig, MetadataAdapter, connect_adapter};
use crate::models::{DatabaseFamily, SchemaMap, TableSchema};
use std::time::Instant;

/// Extracts table and column metadata from one database.
///
/// # Example
/// ```rust,no_run
/// use schemalens_core::SchemaExtractor;
///
/// # async fn example() -> schemalens_core::Result<()> {
/// let extractor = SchemaExtractor::new(
///     "postgresql", "localhost", 5432, "reader", "secret", "shop", None,
/// )
/// .await?;
///
/// let schemas = extractor.get_all_tables_schema(Some("orders,customers")).await?;
/// for (name, table) in &schemas {
///     println!("{}: {} columns", name, table.columns.len());
/// }
/// extractor.close().await;
/// # Ok(())
/// # }
/// ```
pub struct SchemaExtractor {
    adapter: Box<dyn MetadataAdapter>,
    description: String,
}

impl std::fmt::Debug for SchemaExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaExtractor")
            .field("family", &self.adapter.family())
            .field("description", &self.description)
            .finish()
    }
}

impl SchemaExtractor {
    /// Builds an extractor from a validated connection configuration.
    ///
    /// # Errors
    /// Returns error if the configuration is invalid or the family's driver
    /// is not compiled in
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let adapter = connect_adapter(config).await?;
        Ok(Self {
            adapter,
            description: config.to_string(),
        })
    }

    /// Builds an extractor from raw connection parameters.
    ///
    /// `family` is matched case-insensitively. `properties` is a
    /// query-string such as `sslmode=disable&application_name=docs`.
    ///
    /// # Errors
    /// Returns a configuration error for an unknown family or malformed
    /// properties
    #[allow(clippy::too_many_arguments)]
    pub async fn new(
        family: &str,
        host: &str,
        port: u16,
        username: &str,
        password: &str,
        database: &str,
        properties: Option<&str>,
    ) -> Result<Self> {
        let family: DatabaseFamily = family.parse()?;
        let mut config = ConnectionConfig::new(family, host, port, username, password, database);
        if let Some(properties) = properties {
            config = config.with_properties_str(properties)?;
        }
        Self::connect(&config).await
    }

    /// Builds an extractor over an existing adapter.
    pub fn from_adapter(adapter: Box<dyn MetadataAdapter>) -> Self {
        let description = format!("{} adapter", adapter.family());
        Self {
            adapter,
            description,
        }
    }

    /// Database family this extractor talks to
    pub fn family(&self) -> DatabaseFamily {
        self.adapter.family()
    }

    /// Credential-free description of the connection target
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Verifies connectivity and credentials with a trivial round trip.
    ///
    /// # Errors
    /// Returns a connection error if the database is unreachable
    pub async fn test_connection(&self) -> Result<()> {
        self.adapter.test_connection().await
    }

    /// Lists the tables to process.
    ///
    /// With no filter (or an empty one) every discovered table is returned in
    /// catalog order. Otherwise the filter is split on commas, each entry is
    /// trimmed, and only discovered names are kept, in filter order.
    ///
    /// # Errors
    /// Propagates any catalog access failure
    pub async fn list_tables(&self, filter: Option<&str>) -> Result<Vec<String>> {
        let discovered = self.adapter.discover_tables().await?;
        tracing::debug!(
            "Discovered {} tables on {}",
            discovered.len(),
            self.description
        );
        Ok(resolve_targets(discovered, filter))
    }

    /// Extracts the schema of every table selected by `filter`.
    ///
    /// Tables are processed one at a time. The first failure aborts the
    /// whole batch; no partial map is returned.
    ///
    /// # Errors
    /// Propagates the first catalog access failure
    pub async fn get_all_tables_schema(&self, filter: Option<&str>) -> Result<SchemaMap> {
        let started = Instant::now();
        let targets = self.list_tables(filter).await?;

        let mut schemas = SchemaMap::with_capacity(targets.len());
        for table_name in targets {
            let schema = self.adapter.table_schema(&table_name).await?;
            schemas.insert(table_name, schema);
        }

        tracing::info!(
            "Extracted {} table schemas from {} in {:?}",
            schemas.len(),
            self.description,
            started.elapsed()
        );

        Ok(schemas)
    }

    /// Extracts the comment and ordered columns of one table.
    ///
    /// # Errors
    /// Propagates any catalog access failure
    pub async fn get_table_schema(&self, table_name: &str) -> Result<TableSchema> {
        self.adapter.table_schema(table_name).await
    }

    /// Looks up the table-level comment.
    ///
    /// # Errors
    /// Propagates any catalog access failure
    pub async fn get_table_comment(&self, table_name: &str) -> Result<String> {
        self.adapter.table_comment(table_name).await
    }

    /// Releases the connection resource. Calling it twice is harmless.
    pub async fn close(&self) {
        self.adapter.close().await;
    }
}

/// Applies a comma-separated table filter to the discovered tables.
pub(crate) fn resolve_targets(discovered: Vec<String>, filter: Option<&str>) -> Vec<String> {
    let filter = match filter {
        None | Some("") => return discovered,
        Some(filter) => filter,
    };

    let mut targets: Vec<String> = Vec::new();
    for requested in filter.split(',').map(str::trim) {
        if discovered.iter().any(|name| name == requested)
            && !targets.iter().any(|name| name == requested)
        {
            targets.push(requested.to_string());
        }
    }
    targets
}
