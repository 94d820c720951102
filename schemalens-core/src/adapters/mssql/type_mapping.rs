//! SQL Server column type rendering.
//!
//! `INFORMATION_SCHEMA.COLUMNS` reports the bare type name plus separate
//! length, precision and scale columns. They are recombined into the
//! dialect's declaration syntax.

/// Types whose declaration carries a character or byte length.
const LENGTH_TYPES: &[&str] = &["char", "varchar", "nchar", "nvarchar", "binary", "varbinary"];

/// Types whose declaration carries precision and scale.
const PRECISION_TYPES: &[&str] = &["decimal", "numeric"];

/// Renders SQL Server column metadata as a dialect type string.
///
/// A `character_maximum_length` of `-1` denotes a `(max)` column.
///
/// # Example
/// ```rust
/// use schemalens_core::adapters::mssql::render_mssql_type;
///
/// assert_eq!(render_mssql_type("nvarchar", Some(50), None, None), "NVARCHAR(50)");
/// assert_eq!(render_mssql_type("varbinary", Some(-1), None, None), "VARBINARY(max)");
/// assert_eq!(render_mssql_type("decimal", None, Some(10), Some(2)), "DECIMAL(10, 2)");
/// assert_eq!(render_mssql_type("int", None, Some(10), Some(0)), "INTEGER");
/// ```
pub fn render_mssql_type(
    data_type: &str,
    character_maximum_length: Option<i32>,
    numeric_precision: Option<i32>,
    numeric_scale: Option<i32>,
) -> String {
    let lowered = data_type.trim().to_lowercase();
    let keyword = match lowered.as_str() {
        "int" => "INTEGER".to_string(),
        other => other.to_uppercase(),
    };

    if LENGTH_TYPES.contains(&lowered.as_str()) {
        return match character_maximum_length {
            Some(-1) => format!("{}(max)", keyword),
            Some(length) if length > 0 => format!("{}({})", keyword, length),
            _ => keyword,
        };
    }

    if PRECISION_TYPES.contains(&lowered.as_str()) {
        return match (numeric_precision, numeric_scale) {
            (Some(precision), Some(scale)) => format!("{}({}, {})", keyword, precision, scale),
            (Some(precision), None) => format!("{}({})", keyword, precision),
            _ => keyword,
        };
    }

    keyword
}
