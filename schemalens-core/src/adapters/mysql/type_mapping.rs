//! MySQL column type rendering.
//!
//! `INFORMATION_SCHEMA.COLUMNS.COLUMN_TYPE` is rendered the way the dialect
//! spells its types: upper-case keyword and modifiers, integer shorthand
//! spelled out, numeric arguments comma-spaced and ENUM/SET members verbatim.

use crate::adapters::helpers::{normalize_type_arguments, uppercase_outside_quotes};

/// Renders a MySQL `COLUMN_TYPE` value as a dialect type string.
///
/// # Example
/// ```rust
/// use schemalens_core::adapters::mysql::render_mysql_type;
///
/// assert_eq!(render_mysql_type("varchar(100)"), "VARCHAR(100)");
/// assert_eq!(render_mysql_type("int(10) unsigned"), "INTEGER(10) UNSIGNED");
/// assert_eq!(render_mysql_type("decimal(10,2)"), "DECIMAL(10, 2)");
/// assert_eq!(render_mysql_type("enum('new','Paid')"), "ENUM('new','Paid')");
/// ```
pub fn render_mysql_type(column_type: &str) -> String {
    let column_type = column_type.trim();

    let (keyword, arguments, modifiers) = match column_type.split_once('(') {
        Some((keyword, rest)) => match rest.rsplit_once(')') {
            Some((arguments, modifiers)) => (keyword, Some(arguments), modifiers),
            None => (column_type, None, ""),
        },
        None => split_keyword(column_type),
    };

    let mut rendered = canonical_keyword(keyword.trim());
    if let Some(arguments) = arguments {
        rendered.push('(');
        rendered.push_str(&normalize_type_arguments(arguments));
        rendered.push(')');
    }

    let modifiers = modifiers.trim();
    if !modifiers.is_empty() {
        rendered.push(' ');
        rendered.push_str(&uppercase_outside_quotes(modifiers));
    }

    rendered
}

/// Splits `int unsigned` into the keyword and trailing modifiers.
fn split_keyword(column_type: &str) -> (&str, Option<&str>, &str) {
    match column_type.split_once(char::is_whitespace) {
        Some((keyword, modifiers)) => (keyword, None, modifiers),
        None => (column_type, None, ""),
    }
}

fn canonical_keyword(keyword: &str) -> String {
    match keyword.to_ascii_lowercase().as_str() {
        "int" => "INTEGER".to_string(),
        "bool" => "BOOL".to_string(),
        other => other.to_ascii_uppercase(),
    }
}
