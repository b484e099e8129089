//! CLI presentation: text and json formatters per command.

use crate::error::MetaError;
use crate::lifecycle::TrashEntry;
use crate::tree::MetaTree;
use crate::types::NodeId;
use comfy_table::Table;
use serde_json::Value;

/// One row of a listing
fn listing_row(tree: &MetaTree, id: NodeId) -> (String, String, String) {
    (
        tree.basename(id),
        tree.kind(id).to_string(),
        tree.path(id).display().to_string(),
    )
}

pub fn format_listing(tree: &MetaTree, ids: &[NodeId], format: &str) -> Result<String, MetaError> {
    if format == "json" {
        let rows: Vec<Value> = ids
            .iter()
            .map(|id| {
                let (name, kind, path) = listing_row(tree, *id);
                serde_json::json!({ "name": name, "kind": kind, "path": path })
            })
            .collect();
        return format_json(&Value::Array(rows));
    }
    if ids.is_empty() {
        return Ok("No children.".to_string());
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Kind", "Path"]);
    for id in ids {
        let (name, kind, path) = listing_row(tree, *id);
        table.add_row(vec![name, kind, path]);
    }
    Ok(table.to_string())
}

pub fn format_trash(entries: &[TrashEntry]) -> String {
    if entries.is_empty() {
        return "Trash is empty.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Deleted At", "Original", "Path"]);
    for entry in entries {
        table.add_row(vec![
            entry.deleted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.original.clone(),
            entry.path.display().to_string(),
        ]);
    }
    table.to_string()
}

pub fn format_json(value: &Value) -> Result<String, MetaError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| MetaError::ConfigError(format!("Failed to render JSON: {}", e)))
}
