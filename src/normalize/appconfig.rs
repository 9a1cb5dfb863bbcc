//! App-config document parsing and flattening.
//!
//! The finder ships its map configuration as a JS module assigning an object
//! literal to APP_CONFIG. The outermost object literal is sliced out and
//! parsed as JSON; a document that does not parse is recorded as unparsed in
//! the dataset metadata rather than failing the run.

use serde_json::Value;

use super::Table;
use crate::models::vendor::value_to_cell;

/// Extract and parse the configuration object, if possible.
pub fn parse_app_config(raw: &str) -> Option<Value> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

/// Flatten the config into (key_path, value) rows. Arrays render as JSON
/// text, scalars as plain cells, objects recurse with dotted paths.
pub fn flatten_config(config: Option<&Value>) -> Table {
    let mut table = Table::with_fields(&["key_path", "value"]);
    if let Some(config) = config {
        walk(config, "", &mut table.rows);
    }
    table
}

fn walk(value: &Value, path: &str, rows: &mut Vec<Vec<String>>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                walk(child, &child_path, rows);
            }
        }
        Value::Array(_) => rows.push(vec![
            path.to_string(),
            serde_json::to_string(value).unwrap_or_default(),
        ]),
        other => rows.push(vec![path.to_string(), value_to_cell(other)]),
    }
}

/// Region rows extracted from the app config's map regions.
pub fn regions_table(config: Option<&Value>) -> Table {
    let mut table =
        Table::with_fields(&["id", "name", "cities", "center_lat", "center_lng", "zoom"]);

    let regions = config
        .and_then(|c| c.get("regions"))
        .and_then(Value::as_array);

    for region in regions.map(Vec::as_slice).unwrap_or_default() {
        let center = region.get("center");
        let cities = region
            .get("cities")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .map(value_to_cell)
                    .collect::<Vec<_>>()
                    .join("; ")
            })
            .unwrap_or_default();

        table.rows.push(vec![
            region.get("id").map(value_to_cell).unwrap_or_default(),
            region.get("name").map(value_to_cell).unwrap_or_default(),
            cities,
            center
                .and_then(|c| c.get("lat"))
                .map(value_to_cell)
                .unwrap_or_default(),
            center
                .and_then(|c| c.get("lng"))
                .map(value_to_cell)
                .unwrap_or_default(),
            region.get("zoom").map(value_to_cell).unwrap_or_default(),
        ]);
    }

    table
}
