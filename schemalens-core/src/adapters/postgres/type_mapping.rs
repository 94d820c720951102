//! PostgreSQL column type rendering.
//!
//! Input is the output of `format_type(atttypid, atttypmod)`. The catalog
//! spelling is turned into the dialect's SQL spelling: `character varying`
//! becomes `VARCHAR`, `character` becomes `CHAR`, everything else is
//! upper-cased. Array suffixes are kept and quoted type names (user-defined
//! types with mixed case) are returned unchanged.

use crate::adapters::helpers::normalize_type_arguments;

/// Renders a `format_type()` value as a dialect type string.
///
/// # Example
/// ```rust
/// use schemalens_core::adapters::postgres::render_postgres_type;
///
/// assert_eq!(render_postgres_type("character varying(20)"), "VARCHAR(20)");
/// assert_eq!(
///     render_postgres_type("timestamp without time zone"),
///     "TIMESTAMP WITHOUT TIME ZONE"
/// );
/// assert_eq!(render_postgres_type("integer[]"), "INTEGER[]");
/// ```
pub fn render_postgres_type(formatted_type: &str) -> String {
    let mut base = formatted_type.trim();
    let mut array_suffix = String::new();
    while let Some(stripped) = base.strip_suffix("[]") {
        array_suffix.push_str("[]");
        base = stripped.trim_end();
    }

    if base.starts_with('"') || base.contains(".\"") {
        return format!("{}{}", base, array_suffix);
    }

    let (name, arguments, modifiers) = match base.split_once('(') {
        Some((name, rest)) => match rest.split_once(')') {
            Some((arguments, modifiers)) => (name, Some(arguments), modifiers),
            None => (base, None, ""),
        },
        None => (base, None, ""),
    };

    let mut rendered = canonical_name(name.trim());
    if let Some(arguments) = arguments {
        rendered.push('(');
        rendered.push_str(&normalize_type_arguments(arguments));
        rendered.push(')');
    }

    let modifiers = modifiers.trim();
    if !modifiers.is_empty() {
        rendered.push(' ');
        rendered.push_str(&modifiers.to_uppercase());
    }

    rendered.push_str(&array_suffix);
    rendered
}

fn canonical_name(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "character varying" => "VARCHAR".to_string(),
        "character" => "CHAR".to_string(),
        other => other.to_uppercase(),
    }
}
