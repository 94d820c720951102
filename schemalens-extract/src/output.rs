//! Output operations for extraction results.
//!
//! JSON goes to stdout unless an output file is given. Logs never share
//! stdout, so the JSON can be piped straight into other tools.

use schemalens_core::{ExtractorError, Result, SchemaMap};
use std::io::Write;
use std::path::Path;

/// Serializes a schema map as pretty or compact JSON.
///
/// # Errors
/// Returns a serialization error if JSON encoding fails
pub fn render_schema(schemas: &SchemaMap, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(schemas)
    } else {
        serde_json::to_string_pretty(schemas)
    };

    rendered.map_err(|e| ExtractorError::Serialization {
        context: "Failed to serialize table schemas".to_string(),
        source: e,
    })
}

/// Joins table names one per line. Returns `None` when there is nothing to
/// print, so an empty listing produces no output at all.
pub fn render_table_list(tables: &[String]) -> Option<String> {
    if tables.is_empty() {
        None
    } else {
        Some(tables.join("\n"))
    }
}

/// Writes text to the given file, or to stdout when no path is given.
///
/// # Errors
/// Returns an I/O error if the file or stdout cannot be written
pub async fn write_output(text: &str, output_path: Option<&Path>) -> Result<()> {
    match output_path {
        Some(path) => {
            tokio::fs::write(path, text)
                .await
                .map_err(|e| ExtractorError::Io {
                    context: format!("Failed to write to {}", path.display()),
                    source: e,
                })?;
            tracing::info!("Output written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", text).map_err(|e| ExtractorError::Io {
                context: "Failed to write to stdout".to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}
