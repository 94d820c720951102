//! Contract tests for `SchemaExtractor` over an in-memory metadata adapter.
//!
//! These cover the extractor's observable behavior (target resolution,
//! ordering, batch failure, comment handling) without a database server.

#![allow(clippy::unwrap_used)]

use async_trait::async_trait;
use schemalens_core::adapters::helpers::comment_or_table_name;
use schemalens_core::{
    ColumnInfo, DatabaseFamily, ExtractorError, MetadataAdapter, Result, SchemaExtractor,
    TableSchema,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Catalog held in memory, in catalog order.
struct InMemoryAdapter {
    family: DatabaseFamily,
    tables: Vec<TableSchema>,
    failing_table: Option<String>,
    schema_calls: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
}

impl InMemoryAdapter {
    fn new(family: DatabaseFamily, tables: Vec<TableSchema>) -> Self {
        Self {
            family,
            tables,
            failing_table: None,
            schema_calls: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing_on(mut self, table_name: &str) -> Self {
        self.failing_table = Some(table_name.to_string());
        self
    }

    fn lookup(&self, table_name: &str) -> Result<&TableSchema> {
        if self.failing_table.as_deref() == Some(table_name) {
            return Err(ExtractorError::query_failed(
                format!("Failed to collect columns for table '{}'", table_name),
                std::io::Error::other("relation is locked"),
            ));
        }
        self.tables
            .iter()
            .find(|t| t.table_name == table_name)
            .ok_or_else(|| {
                ExtractorError::query_failed(
                    format!("Failed to read table '{}'", table_name),
                    std::io::Error::other("no such table"),
                )
            })
    }
}

#[async_trait]
impl MetadataAdapter for InMemoryAdapter {
    fn family(&self) -> DatabaseFamily {
        self.family
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn discover_tables(&self) -> Result<Vec<String>> {
        Ok(self.tables.iter().map(|t| t.table_name.clone()).collect())
    }

    async fn table_comment(&self, table_name: &str) -> Result<String> {
        let table = self.lookup(table_name)?;
        Ok(comment_or_table_name(
            Some(table.comment.clone()),
            table_name,
        ))
    }

    async fn table_schema(&self, table_name: &str) -> Result<TableSchema> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        let mut schema = self.lookup(table_name)?.clone();
        schema.comment = self.table_comment(table_name).await?;
        Ok(schema)
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn shop_catalog() -> Vec<TableSchema> {
    let mut customers = TableSchema::new("customers", "Registered customers");
    customers
        .columns
        .push(ColumnInfo::new("id", "INTEGER", Some("Customer id")));
    customers
        .columns
        .push(ColumnInfo::new("email", "VARCHAR(255)", None));

    let mut orders = TableSchema::new("orders", "");
    orders.columns.push(ColumnInfo::new("id", "INTEGER", None));
    orders.columns.push(ColumnInfo::new(
        "status",
        "VARCHAR(20)",
        Some("Order status:\nnew, paid\r\nor shipped"),
    ));
    orders
        .columns
        .push(ColumnInfo::new("total", "NUMERIC(10, 2)", Some("")));

    let products = TableSchema::new("products", "Sellable items");

    vec![customers, orders, products]
}

fn extractor() -> SchemaExtractor {
    SchemaExtractor::from_adapter(Box::new(InMemoryAdapter::new(
        DatabaseFamily::PostgreSql,
        shop_catalog(),
    )))
}

#[tokio::test]
async fn test_filtered_schema_has_exactly_requested_tables_in_order() {
    let schemas = extractor()
        .get_all_tables_schema(Some("orders,customers"))
        .await
        .unwrap();

    let keys: Vec<&str> = schemas.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["orders", "customers"]);
}

#[tokio::test]
async fn test_unfiltered_schema_covers_every_table_in_catalog_order() {
    let schemas = extractor().get_all_tables_schema(None).await.unwrap();
    let keys: Vec<&str> = schemas.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["customers", "orders", "products"]);

    for (name, schema) in &schemas {
        assert_eq!(name, &schema.table_name);
    }
}

#[tokio::test]
async fn test_filtered_listing_is_subset_of_full_listing() {
    let extractor = extractor();
    let all = extractor.list_tables(None).await.unwrap();
    let filtered = extractor
        .list_tables(Some("products, ghost ,customers"))
        .await
        .unwrap();

    assert_eq!(filtered, vec!["products", "customers"]);
    assert!(filtered.iter().all(|t| all.contains(t)));
}

#[tokio::test]
async fn test_one_valid_and_one_invalid_name_yields_one_table() {
    let extractor = extractor();
    let tables = extractor.list_tables(Some("orders,missing")).await.unwrap();
    assert_eq!(tables.len(), 1);

    let schemas = extractor
        .get_all_tables_schema(Some("orders,missing"))
        .await
        .unwrap();
    assert_eq!(schemas.len(), 1);
    assert!(schemas.contains_key("orders"));
}

#[tokio::test]
async fn test_whitespace_only_filter_selects_no_tables() {
    let schemas = extractor().get_all_tables_schema(Some("  ")).await.unwrap();
    assert!(schemas.is_empty());
}

#[tokio::test]
async fn test_missing_comment_falls_back_to_table_name() {
    let schema = extractor().get_table_schema("orders").await.unwrap();
    assert_eq!(schema.comment, "orders");
    assert_eq!(extractor().get_table_comment("orders").await.unwrap(), "orders");
}

#[tokio::test]
async fn test_column_order_and_newline_stripping() {
    let schema = extractor().get_table_schema("orders").await.unwrap();
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "status", "total"]);

    for column in &schema.columns {
        assert!(!column.comment.contains('\n'));
        assert!(!column.comment.contains('\r'));
    }
    assert_eq!(
        schema.column("status").unwrap().comment,
        "Order status:new, paidor shipped"
    );
    assert_eq!(schema.column("id").unwrap().comment, "");
}

#[tokio::test]
async fn test_table_without_columns_has_empty_column_list() {
    let schema = extractor().get_table_schema("products").await.unwrap();
    assert!(schema.columns.is_empty());
    assert_eq!(schema.comment, "Sellable items");
}

#[tokio::test]
async fn test_repeated_schema_reads_are_identical() {
    let extractor = extractor();
    let first = extractor.get_table_schema("customers").await.unwrap();
    let second = extractor.get_table_schema("customers").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_first_failure_aborts_the_batch() {
    let adapter =
        InMemoryAdapter::new(DatabaseFamily::MySql, shop_catalog()).failing_on("orders");
    let calls = Arc::clone(&adapter.schema_calls);
    let extractor = SchemaExtractor::from_adapter(Box::new(adapter));

    let result = extractor.get_all_tables_schema(None).await;
    assert!(matches!(result, Err(ExtractorError::Query { .. })));
    // customers succeeded, orders failed, products was never attempted
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_outside_filter_is_not_reached() {
    let adapter =
        InMemoryAdapter::new(DatabaseFamily::MySql, shop_catalog()).failing_on("orders");
    let extractor = SchemaExtractor::from_adapter(Box::new(adapter));

    let schemas = extractor
        .get_all_tables_schema(Some("customers,products"))
        .await
        .unwrap();
    assert_eq!(schemas.len(), 2);
}

#[tokio::test]
async fn test_close_is_forwarded_to_adapter() {
    let adapter = InMemoryAdapter::new(DatabaseFamily::Doris, shop_catalog());
    let closes = Arc::clone(&adapter.closes);
    let extractor = SchemaExtractor::from_adapter(Box::new(adapter));

    assert_eq!(extractor.family(), DatabaseFamily::Doris);
    extractor.test_connection().await.unwrap();
    extractor.close().await;
    extractor.close().await;
    assert_eq!(closes.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_schema_map_serializes_with_type_field() {
    let schemas = extractor()
        .get_all_tables_schema(Some("customers"))
        .await
        .unwrap();
    let json = serde_json::to_value(&schemas).unwrap();

    assert_eq!(json["customers"]["table_name"], "customers");
    assert_eq!(json["customers"]["comment"], "Registered customers");
    assert_eq!(json["customers"]["columns"][0]["type"], "INTEGER");
    assert_eq!(json["customers"]["columns"][1]["comment"], "");
}

#[tokio::test]
async fn test_unknown_family_is_configuration_error() {
    let result = SchemaExtractor::new("db2", "localhost", 50000, "u", "p", "d", None).await;
    assert!(matches!(result, Err(ExtractorError::Configuration { .. })));
}

#[tokio::test]
async fn test_malformed_properties_are_configuration_error() {
    let result = SchemaExtractor::new(
        "postgresql",
        "localhost",
        5432,
        "u",
        "p",
        "d",
        Some("sslmode"),
    )
    .await;
    assert!(matches!(result, Err(ExtractorError::Configuration { .. })));
}
