//! Vendor feed normalization: flat vendor rows, lookup tables, metadata.

pub mod appconfig;
pub mod inventory;

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::warn;

use crate::error::{PipelineError, PipelineResult};
use crate::models::vendor::{value_to_cell, VendorRecord, VENDOR_FIELDS};

/// A normalized table: header plus rows, ready for CSV or worksheet output.
#[derive(Debug, Clone)]
pub struct Table {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn with_fields(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            rows: Vec::new(),
        }
    }
}

/// Every normalized table derived from the vendor feed.
pub struct NormalizedTables {
    pub vendors: Table,
    pub vendor_types: Table,
    pub service_types: Table,
    pub subjects: Table,
    pub bonus_tags: Table,
    pub specialties: Table,
    pub financial_access: Table,
    pub features: Table,
    pub academic_achievements: Table,
}

/// Collapse duplicate vendor ids: the later record's values win, at the
/// position of the id's first occurrence, so row order stays stable.
pub fn dedupe_vendors(raw: Vec<Value>) -> Vec<Value> {
    let mut ordered: Vec<Value> = Vec::with_capacity(raw.len());
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut duplicates = 0usize;

    for entry in raw {
        let id = entry.get("id").map(value_to_cell).unwrap_or_default();
        if id.is_empty() {
            // Entries without an id fail schema validation later; keep them
            // so the error names the offender.
            ordered.push(entry);
            continue;
        }
        match index_by_id.get(&id) {
            Some(&index) => {
                ordered[index] = entry;
                duplicates += 1;
            }
            None => {
                index_by_id.insert(id, ordered.len());
                ordered.push(entry);
            }
        }
    }

    if duplicates > 0 {
        warn!("Collapsed {} duplicate vendor ids (last record wins)", duplicates);
    }

    ordered
}

/// Validate every raw entry against the vendor schema, failing fast on drift.
pub fn parse_records(raw: &[Value]) -> PipelineResult<Vec<VendorRecord>> {
    raw.iter()
        .map(|entry| {
            serde_json::from_value(entry.clone()).map_err(|e| PipelineError::SchemaDrift {
                source_name: "vendors.json".to_string(),
                detail: e.to_string(),
            })
        })
        .collect()
}

/// Flatten vendor records into the main table and the lookup tables.
pub fn normalize(records: &[VendorRecord]) -> NormalizedTables {
    let mut vendors = Table::with_fields(&VENDOR_FIELDS);
    let mut vendor_types = Table::with_fields(&["vendor_id", "vendor_type"]);
    let mut service_types = Table::with_fields(&["vendor_id", "service_type"]);
    let mut subjects = Table::with_fields(&["vendor_id", "subject"]);
    let mut bonus_tags = Table::with_fields(&["vendor_id", "bonus_tag"]);
    let mut specialties =
        Table::with_fields(&["vendor_id", "specialty_category", "specialty_value"]);
    let mut financial_access = Table::with_fields(&["vendor_id", "financial_accessibility"]);
    let mut features = Table::with_fields(&["vendor_id", "feature_category", "feature_value"]);
    let mut academic_achievements = Table::with_fields(&["vendor_id", "notable_achievement"]);

    for record in records {
        vendors.rows.push(record.flat_row());

        let id = &record.id;
        push_tags(&mut vendor_types, id, record.vendor_types.as_deref());
        push_tags(&mut service_types, id, record.service_type.as_deref());
        push_tags(&mut subjects, id, record.subjects_taught.as_deref());
        push_tags(&mut bonus_tags, id, record.bonus_tags_raw.as_deref());

        if let Some(map) = &record.specialties {
            for (category, values) in map {
                for value in values.as_deref().unwrap_or_default() {
                    specialties
                        .rows
                        .push(vec![id.clone(), category.clone(), value.clone()]);
                }
            }
        }

        let attributes = record.school_attributes.as_ref();
        if let Some(financial) = attributes.and_then(|a| a.financial.as_ref()) {
            push_tags(
                &mut financial_access,
                id,
                financial.financial_accessibility.as_deref(),
            );
        }
        if let Some(map) = attributes.and_then(|a| a.features.as_ref()) {
            for (category, values) in map {
                for value in values.as_deref().unwrap_or_default() {
                    features
                        .rows
                        .push(vec![id.clone(), category.clone(), value.clone()]);
                }
            }
        }
        if let Some(academics) = attributes.and_then(|a| a.academics.as_ref()) {
            push_tags(
                &mut academic_achievements,
                id,
                academics.notable_achievements.as_deref(),
            );
        }
    }

    NormalizedTables {
        vendors,
        vendor_types,
        service_types,
        subjects,
        bonus_tags,
        specialties,
        financial_access,
        features,
        academic_achievements,
    }
}

fn push_tags(table: &mut Table, id: &str, values: Option<&[String]>) {
    for value in values.unwrap_or_default() {
        table.rows.push(vec![id.to_string(), value.clone()]);
    }
}

/// Inputs for the dataset metadata table.
pub struct MetadataInputs<'a> {
    pub records: &'a [VendorRecord],
    pub vendors_url: &'a str,
    pub filter_options_url: &'a str,
    pub config_url: &'a str,
    pub retrieved_at: DateTime<Utc>,
    pub filter_options: &'a Value,
    pub config_raw_len: usize,
    pub config_parsed: bool,
}

/// Dataset metadata: source URLs, the retrieval timestamp, and feed summary
/// counts shown on the overview sheet.
pub fn dataset_metadata(inputs: &MetadataInputs) -> Table {
    let mut counties = BTreeSet::new();
    let mut regions = BTreeSet::new();
    let mut cities = BTreeSet::new();
    for record in inputs.records {
        if let Some(address) = &record.address {
            if let Some(county) = address.county.as_deref().filter(|c| !c.is_empty()) {
                counties.insert(county.to_string());
            }
            if let Some(region) = address.region.as_deref().filter(|r| !r.is_empty()) {
                regions.insert(region.to_string());
            }
            if let Some(city) = address.city.as_deref().filter(|c| !c.is_empty()) {
                cities.insert(city.to_string());
            }
        }
    }

    let mut table = Table::with_fields(&["key", "value"]);
    let mut push = |key: &str, value: String| table.rows.push(vec![key.to_string(), value]);
    push("vendors_source_url", inputs.vendors_url.to_string());
    push("filter_options_url", inputs.filter_options_url.to_string());
    push("config_url", inputs.config_url.to_string());
    push("retrieved_at_utc", inputs.retrieved_at.to_rfc3339());
    push("record_count", inputs.records.len().to_string());
    push("unique_counties", counties.len().to_string());
    push("unique_regions", regions.len().to_string());
    push("unique_cities", cities.len().to_string());
    push(
        "filter_options_json",
        serde_json::to_string(inputs.filter_options).unwrap_or_default(),
    );
    push("config_raw_length_chars", inputs.config_raw_len.to_string());
    push("config_parsed", inputs.config_parsed.to_string());

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vendor(id: &str, name: &str) -> Value {
        json!({ "id": id, "name": name })
    }

    #[test]
    fn test_dedupe_last_write_wins_at_first_position() {
        let deduped = dedupe_vendors(vec![
            vendor("a", "First A"),
            vendor("b", "Only B"),
            vendor("a", "Second A"),
        ]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0]["id"], "a");
        assert_eq!(deduped[0]["name"], "Second A");
        assert_eq!(deduped[1]["id"], "b");
    }

    #[test]
    fn test_parse_records_flags_schema_drift() {
        let result = parse_records(&[json!({ "name": "No Id" })]);
        assert!(matches!(result, Err(PipelineError::SchemaDrift { .. })));
    }

    #[test]
    fn test_normalize_builds_lookup_tables() {
        let raw = vec![json!({
            "id": "v1",
            "name": "Vendor One",
            "vendorTypes": ["Tutor"],
            "subjectsTaught": ["Math", "Reading"],
            "specialties": { "therapy": ["Speech"] },
            "schoolAttributes": {
                "financial": { "financialAccessibility": ["Sliding scale"] },
                "features": { "campus": ["Library"] },
                "academics": { "notableAchievements": ["Blue Ribbon"] }
            }
        })];
        let records = parse_records(&raw).unwrap();
        let tables = normalize(&records);

        assert_eq!(tables.vendors.rows.len(), 1);
        assert_eq!(tables.vendors.fields.len(), VENDOR_FIELDS.len());
        assert_eq!(tables.vendor_types.rows, vec![vec!["v1", "Tutor"]]);
        assert_eq!(tables.subjects.rows.len(), 2);
        assert_eq!(
            tables.specialties.rows,
            vec![vec!["v1", "therapy", "Speech"]]
        );
        assert_eq!(
            tables.financial_access.rows,
            vec![vec!["v1", "Sliding scale"]]
        );
        assert_eq!(tables.features.rows, vec![vec!["v1", "campus", "Library"]]);
        assert_eq!(
            tables.academic_achievements.rows,
            vec![vec!["v1", "Blue Ribbon"]]
        );
        assert!(tables.service_types.rows.is_empty());
    }

    #[test]
    fn test_metadata_counts_unique_address_values() {
        let raw = vec![
            json!({ "id": "v1", "name": "One", "address": { "city": "Austin", "county": "Travis" } }),
            json!({ "id": "v2", "name": "Two", "address": { "city": "Austin", "county": "Hays" } }),
        ];
        let records = parse_records(&raw).unwrap();
        let table = dataset_metadata(&MetadataInputs {
            records: &records,
            vendors_url: "https://example.com/vendors.json",
            filter_options_url: "https://example.com/filter-options.json",
            config_url: "https://example.com/config.js",
            retrieved_at: Utc::now(),
            filter_options: &json!({}),
            config_raw_len: 0,
            config_parsed: false,
        });
        let get = |key: &str| {
            table
                .rows
                .iter()
                .find(|row| row[0] == key)
                .map(|row| row[1].clone())
                .unwrap()
        };
        assert_eq!(get("record_count"), "2");
        assert_eq!(get("unique_cities"), "1");
        assert_eq!(get("unique_counties"), "2");
        assert_eq!(get("config_parsed"), "false");
    }
}
