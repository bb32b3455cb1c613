//! Rendering of cached results for the `sqlconn` demo.

use serde_json::json;
use sql_connector::ResultCache;

/// Renders the cache as fixed-width, left-aligned cells.
pub fn render_text(cache: &ResultCache, width: usize, header: bool) -> String {
    let mut out = String::new();

    if header {
        for column in 0..cache.field_count() {
            let name = cache.column_name(column).unwrap_or_default();
            out.push_str(&format!("{name:<width$}"));
        }
        out.push('\n');
    }

    for row in cache.rows() {
        for cell in row {
            out.push_str(&format!("{cell:<width$}"));
        }
        out.push('\n');
    }

    out
}

/// Renders the cache as a JSON document with `columns` and `rows`.
pub fn render_json(cache: &ResultCache) -> serde_json::Value {
    let columns: Vec<&str> = (0..cache.field_count())
        .filter_map(|column| cache.column_name(column))
        .collect();
    let rows: Vec<&[String]> = cache.rows().collect();

    json!({
        "columns": columns,
        "rows": rows,
        "row_count": cache.row_count(),
        "field_count": cache.field_count(),
    })
}
