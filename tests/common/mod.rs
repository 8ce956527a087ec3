use std::path::Path;

use serde_json::{Value, json};

/// Write an extractor output file: one `{headers, rows}` object per fragment,
/// rows given positionally.
pub fn write_fragments_json(
    path: &Path,
    fragments: &[(Vec<&str>, Vec<Vec<Value>>)],
) -> Result<(), Box<dyn std::error::Error>> {
    let document = fragments
        .iter()
        .map(|(headers, rows)| json!({ "headers": headers, "rows": rows }))
        .collect::<Vec<_>>();
    std::fs::write(path, serde_json::to_vec_pretty(&document)?)?;
    Ok(())
}
