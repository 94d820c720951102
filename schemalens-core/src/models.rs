//! Core data models for normalized table metadata.
//!
//! These are the shapes callers depend on: one `TableSchema` per table with
//! its comment and ordered columns, collected into an insertion-ordered
//! `SchemaMap`. Column types are the dialect's own rendering and are not
//! normalized across families.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported database families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseFamily {
    MySql,
    PostgreSql,
    Oracle,
    #[serde(rename = "mssql")]
    SqlServer,
    Doris,
}

impl DatabaseFamily {
    /// All supported families in declaration order
    pub const ALL: [DatabaseFamily; 5] = [
        DatabaseFamily::MySql,
        DatabaseFamily::PostgreSql,
        DatabaseFamily::Oracle,
        DatabaseFamily::SqlServer,
        DatabaseFamily::Doris,
    ];

    /// Canonical lowercase identifier, as accepted by `FromStr`
    pub fn as_str(self) -> &'static str {
        match self {
            DatabaseFamily::MySql => "mysql",
            DatabaseFamily::PostgreSql => "postgresql",
            DatabaseFamily::Oracle => "oracle",
            DatabaseFamily::SqlServer => "mssql",
            DatabaseFamily::Doris => "doris",
        }
    }

    /// Family whose wire protocol is used to connect.
    ///
    /// Doris speaks the MySQL protocol but keeps its own metadata path.
    pub fn wire_family(self) -> DatabaseFamily {
        match self {
            DatabaseFamily::Doris => DatabaseFamily::MySql,
            other => other,
        }
    }

    /// Default server port for the family
    pub fn default_port(self) -> u16 {
        match self {
            DatabaseFamily::MySql => 3306,
            DatabaseFamily::PostgreSql => 5432,
            DatabaseFamily::Oracle => 1521,
            DatabaseFamily::SqlServer => 1433,
            DatabaseFamily::Doris => 9030,
        }
    }
}

impl std::fmt::Display for DatabaseFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseFamily::MySql => write!(f, "MySQL"),
            DatabaseFamily::PostgreSql => write!(f, "PostgreSQL"),
            DatabaseFamily::Oracle => write!(f, "Oracle"),
            DatabaseFamily::SqlServer => write!(f, "SQL Server"),
            DatabaseFamily::Doris => write!(f, "Doris"),
        }
    }
}

impl FromStr for DatabaseFamily {
    type Err = crate::error::ExtractorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(DatabaseFamily::MySql),
            "postgresql" | "postgres" => Ok(DatabaseFamily::PostgreSql),
            "oracle" => Ok(DatabaseFamily::Oracle),
            "mssql" | "sqlserver" => Ok(DatabaseFamily::SqlServer),
            "doris" => Ok(DatabaseFamily::Doris),
            other => Err(crate::error::ExtractorError::configuration(format!(
                "Unknown database family '{}': expected one of mysql, postgresql, oracle, mssql, doris",
                other
            ))),
        }
    }
}

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub comment: String,
    /// Dialect-native type rendering
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a column, stripping newlines from the comment.
    ///
    /// A missing comment becomes the empty string.
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        comment: Option<&str>,
    ) -> Self {
        Self {
            name: name.into(),
            comment: strip_newlines(comment.unwrap_or_default()),
            data_type: data_type.into(),
        }
    }
}

/// Normalized metadata for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub comment: String,
    /// Columns in the database's native ordinal order
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Creates a table schema with no columns
    pub fn new(table_name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            comment: comment.into(),
            columns: Vec::new(),
        }
    }

    /// Looks up a column by exact name
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Table name to schema, in the order tables were processed.
pub type SchemaMap = IndexMap<String, TableSchema>;

/// Removes every line break from a comment.
///
/// Carriage returns go too, so CRLF comments do not keep a stray `\r`.
pub fn strip_newlines(comment: &str) -> String {
    comment.chars().filter(|c| !matches!(c, '\n' | '\r')).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_family_parsing_is_case_insensitive() {
        assert_eq!(
            "MySQL".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::MySql
        );
        assert_eq!(
            "POSTGRESQL".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::PostgreSql
        );
        assert_eq!(
            " Oracle ".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::Oracle
        );
        assert_eq!(
            "MsSql".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::SqlServer
        );
        assert_eq!(
            "DORIS".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::Doris
        );
    }

    #[test]
    fn test_family_aliases() {
        assert_eq!(
            "postgres".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::PostgreSql
        );
        assert_eq!(
            "sqlserver".parse::<DatabaseFamily>().unwrap(),
            DatabaseFamily::SqlServer
        );
    }

    #[test]
    fn test_unknown_family_is_configuration_error() {
        let err = "db2".parse::<DatabaseFamily>().unwrap_err();
        assert!(matches!(
            err,
            crate::error::ExtractorError::Configuration { .. }
        ));
        assert!(err.to_string().contains("db2"));
    }

    #[test]
    fn test_family_round_trips_through_as_str() {
        for family in DatabaseFamily::ALL {
            assert_eq!(family.as_str().parse::<DatabaseFamily>().unwrap(), family);
        }
    }

    #[test]
    fn test_doris_uses_mysql_wire_protocol() {
        assert_eq!(DatabaseFamily::Doris.wire_family(), DatabaseFamily::MySql);
        assert_eq!(
            DatabaseFamily::PostgreSql.wire_family(),
            DatabaseFamily::PostgreSql
        );
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(DatabaseFamily::MySql.default_port(), 3306);
        assert_eq!(DatabaseFamily::PostgreSql.default_port(), 5432);
        assert_eq!(DatabaseFamily::Oracle.default_port(), 1521);
        assert_eq!(DatabaseFamily::SqlServer.default_port(), 1433);
        assert_eq!(DatabaseFamily::Doris.default_port(), 9030);
    }

    #[test]
    fn test_family_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DatabaseFamily::SqlServer).unwrap(),
            "\"mssql\""
        );
        assert_eq!(
            serde_json::to_string(&DatabaseFamily::PostgreSql).unwrap(),
            "\"postgresql\""
        );
    }

    #[test]
    fn test_strip_newlines() {
        assert_eq!(strip_newlines("line one\nline two"), "line oneline two");
        assert_eq!(strip_newlines("crlf\r\nend\n"), "crlfend");
        assert_eq!(strip_newlines("plain"), "plain");
        assert_eq!(strip_newlines(""), "");
    }

    #[test]
    fn test_column_info_missing_comment_is_empty() {
        let column = ColumnInfo::new("id", "INTEGER", None);
        assert_eq!(column.comment, "");

        let column = ColumnInfo::new("note", "TEXT", Some("multi\nline"));
        assert_eq!(column.comment, "multiline");
    }

    #[test]
    fn test_table_schema_serialization_shape() {
        let mut table = TableSchema::new("orders", "Customer orders");
        table
            .columns
            .push(ColumnInfo::new("id", "INTEGER", Some("Primary key")));

        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "table_name": "orders",
                "comment": "Customer orders",
                "columns": [
                    { "name": "id", "comment": "Primary key", "type": "INTEGER" }
                ]
            })
        );
    }

    #[test]
    fn test_schema_map_preserves_insertion_order() {
        let mut map = SchemaMap::new();
        map.insert("orders".to_string(), TableSchema::new("orders", ""));
        map.insert("customers".to_string(), TableSchema::new("customers", ""));
        map.insert("audit".to_string(), TableSchema::new("audit", ""));

        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["orders", "customers", "audit"]);
    }
}
