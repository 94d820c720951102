//! Core library for SchemaLens.
//!
//! SchemaLens reads table and column metadata (names, types, comments) from
//! MySQL, PostgreSQL, Oracle, SQL Server and Apache Doris behind one
//! interface, and returns it in a normalized shape that documentation
//! generators and schema-diffing tools can consume without caring about the
//! dialect.
//!
//! # Security Guarantees
//! - All database operations are read-only catalog queries
//! - Table, schema and owner names are always bound parameters
//! - Passwords are zeroized on drop and never logged or displayed
//!
//! # Architecture
//! - Strategy pattern: one [`MetadataAdapter`] per database family
//! - Factory: the adapter is chosen once when the extractor is built
//! - Comprehensive error handling with credential sanitization

pub mod adapters;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod models;

// Re-export commonly used types
pub use adapters::{ConnectionConfig, ConnectionProperties, MetadataAdapter, connect_adapter};
pub use error::{ExtractorError, Result};
pub use extractor::SchemaExtractor;
pub use models::{ColumnInfo, DatabaseFamily, SchemaMap, TableSchema};
