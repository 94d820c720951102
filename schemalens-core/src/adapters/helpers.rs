//! Helper utilities for database adapter implementations.
//!
//! Provides functionality shared across adapters so that comment fallback,
//! identifier quoting and row decoding behave the same for every family.

use std::sync::OnceLock;

/// Extension trait for extracting typed values from sqlx rows
/// with consistent error handling.
///
/// # Example
/// ```rust,ignore
/// use schemalens_core::adapters::helpers::RowExt;
///
/// let name: String = row.get_field("COLUMN_NAME", Some("orders"))?;
/// let comment: Option<String> = row.get_field("COLUMN_COMMENT", Some("orders"))?;
/// ```
#[cfg(any(feature = "mysql", feature = "postgresql"))]
pub trait RowExt: sqlx::Row + Sized {
    /// Extracts a typed field from the row with proper error context.
    ///
    /// # Arguments
    /// * `field_name` - Name of the column to extract
    /// * `table_context` - Optional table name for error messages
    fn get_field<'r, T>(&'r self, field_name: &str, table_context: Option<&str>) -> crate::Result<T>
    where
        T: sqlx::Decode<'r, Self::Database> + sqlx::Type<Self::Database>,
        for<'a> &'a str: sqlx::ColumnIndex<Self>,
    {
        self.try_get(field_name)
            .map_err(|e| crate::error::ExtractorError::parse_field(field_name, table_context, e))
    }
}

#[cfg(any(feature = "mysql", feature = "postgresql"))]
impl<R: sqlx::Row> RowExt for R {}

/// Resolves a catalog comment, falling back to the table name.
///
/// No row, a NULL value and an empty string all count as "no comment".
pub fn comment_or_table_name(comment: Option<String>, table_name: &str) -> String {
    match comment {
        Some(comment) if !comment.is_empty() => comment,
        _ => table_name.to_string(),
    }
}

/// Pattern for the table-level `COMMENT='...'` clause of a CREATE statement.
fn create_table_comment_pattern() -> Option<&'static regex::Regex> {
    static PATTERN: OnceLock<Option<regex::Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| regex::Regex::new(r"(?i)COMMENT='(.*?)'").ok())
        .as_ref()
}

/// Extracts the first `COMMENT='...'` value from a CREATE TABLE statement.
///
/// Matching is case-insensitive and non-greedy, so the value ends at the
/// first closing quote.
///
/// # Example
/// ```rust
/// use schemalens_core::adapters::helpers::extract_create_table_comment;
///
/// let ddl = "CREATE TABLE `sales` (`id` int) ENGINE=OLAP COMMENT='Sales data'";
/// assert_eq!(extract_create_table_comment(ddl), Some("Sales data"));
/// assert_eq!(extract_create_table_comment("CREATE TABLE t (id int)"), None);
/// ```
pub fn extract_create_table_comment(create_statement: &str) -> Option<&str> {
    create_table_comment_pattern()?
        .captures(create_statement)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

/// Quotes an identifier with backticks, doubling embedded backticks.
///
/// Only used where the server cannot take a bound parameter, such as
/// `SHOW CREATE TABLE`.
pub fn quote_mysql_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Uppercases SQL keywords outside of quoted sections.
///
/// Single-quoted literals and double-quoted identifiers keep their case.
pub(crate) fn uppercase_outside_quotes(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match quote {
            Some(q) => {
                output.push(ch);
                if ch == q {
                    quote = None;
                }
            }
            None => {
                if ch == '\'' || ch == '"' {
                    quote = Some(ch);
                    output.push(ch);
                } else {
                    output.extend(ch.to_uppercase());
                }
            }
        }
    }

    output
}

/// Normalizes a numeric argument list such as `10,2` to `10, 2`.
///
/// Lists containing quotes (ENUM/SET members) are returned unchanged.
pub(crate) fn normalize_type_arguments(arguments: &str) -> String {
    if arguments.contains('\'') || arguments.contains('"') {
        return arguments.to_string();
    }
    arguments
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
}
