//! Recursive field inventory over the raw feed documents.
//!
//! Walks every vendor entry before schema validation, so fields the schema
//! does not know about still show up in the inventory sheet.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use super::Table;

#[derive(Debug, Default)]
struct FieldMeta {
    types: BTreeSet<&'static str>,
    non_null_count: u64,
    list_item_count: u64,
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Inventory of every field path seen in the feed: observed value types,
/// non-null count, and total list items.
pub fn field_inventory(raw: &[Value]) -> Table {
    let mut meta: BTreeMap<String, FieldMeta> = BTreeMap::new();

    for entry in raw {
        collect(&mut meta, "vendor", entry);
    }

    let mut table = Table::with_fields(&[
        "field_path",
        "value_types",
        "non_null_count",
        "list_item_count",
    ]);
    for (path, field) in meta {
        let types = field.types.iter().copied().collect::<Vec<_>>().join(",");
        table.rows.push(vec![
            path,
            types,
            field.non_null_count.to_string(),
            field.list_item_count.to_string(),
        ]);
    }

    table
}

fn collect(meta: &mut BTreeMap<String, FieldMeta>, path: &str, value: &Value) {
    let entry = meta.entry(path.to_string()).or_default();
    entry.types.insert(type_name(value));
    if !value.is_null() {
        entry.non_null_count += 1;
    }
    if let Value::Array(items) = value {
        entry.list_item_count += items.len() as u64;
    }

    if let Value::Object(map) = value {
        for (key, child) in map {
            collect(meta, &format!("{path}.{key}"), child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inventory_collects_types_and_counts() {
        let raw = vec![
            json!({ "id": "a", "tags": ["x", "y"], "address": { "city": "Austin" } }),
            json!({ "id": 2, "tags": null }),
        ];
        let table = field_inventory(&raw);

        let find = |path: &str| {
            table
                .rows
                .iter()
                .find(|row| row[0] == path)
                .cloned()
                .unwrap()
        };

        assert_eq!(find("vendor.id")[1], "number,string");
        assert_eq!(find("vendor.tags")[1], "array,null");
        assert_eq!(find("vendor.tags")[2], "1");
        assert_eq!(find("vendor.tags")[3], "2");
        assert_eq!(find("vendor.address.city")[1], "string");
        assert_eq!(find("vendor")[2], "2");
    }

    #[test]
    fn test_inventory_rows_are_sorted_by_path() {
        let raw = vec![json!({ "z": 1, "a": 1 })];
        let table = field_inventory(&raw);
        let paths: Vec<&String> = table.rows.iter().map(|row| &row[0]).collect();
        assert_eq!(paths, ["vendor", "vendor.a", "vendor.z"]);
    }
}
