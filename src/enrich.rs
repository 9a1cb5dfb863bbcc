//! Vendor enrichment: boundary labels attached to flattened vendor rows.
//!
//! A purely in-memory join. Every vendor row gets eleven TEA columns; rows
//! without a usable geocode, and rows whose point sits outside a layer, carry
//! the explicit unresolved state (empty cells, counted per layer).

use tracing::info;

use crate::pip::{BoundaryPolygon, BoundaryService, LayerMatches};

/// Enrichment columns appended to the vendor table, in output order.
pub const ENRICHED_FIELDS: [&str; 11] = [
    "tea_esc_region",
    "tea_esc_city",
    "tea_esc_website",
    "tea_county_name",
    "tea_county_fips",
    "tea_county_cntyfips",
    "tea_school_district_name",
    "tea_school_district_name20",
    "tea_school_district_number",
    "tea_school_district_nces",
    "tea_school_district_geoid20",
];

/// Unresolved join counts per layer, reported on the overview sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissingCounts {
    pub esc_region: usize,
    pub county: usize,
    pub school_district: usize,
}

pub struct EnrichedVendors {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub missing: MissingCounts,
}

/// Join every vendor row against the boundary service. A `None` service means
/// the enrichment step was skipped; every label is unresolved.
pub fn enrich_rows(
    fields: &[String],
    rows: &[Vec<String>],
    service: Option<&BoundaryService>,
) -> EnrichedVendors {
    let lat_col = fields.iter().position(|f| f == "location_lat");
    let lng_col = fields.iter().position(|f| f == "location_lng");

    let mut missing = MissingCounts::default();
    let mut out_rows = Vec::with_capacity(rows.len());

    for row in rows {
        let matches = match (service, parse_point(row, lng_col, lat_col)) {
            (Some(service), Some((lon, lat))) => service.lookup(lon, lat),
            _ => LayerMatches::default(),
        };

        if matches.esc_region.is_none() {
            missing.esc_region += 1;
        }
        if matches.county.is_none() {
            missing.county += 1;
        }
        if matches.school_district.is_none() {
            missing.school_district += 1;
        }

        let mut enriched = row.clone();
        enriched.extend(label_cells(&matches));
        out_rows.push(enriched);
    }

    let mut out_fields = fields.to_vec();
    out_fields.extend(ENRICHED_FIELDS.iter().map(|f| f.to_string()));

    info!(
        "Enriched {} vendors ({} missing esc, {} missing county, {} missing district)",
        out_rows.len(),
        missing.esc_region,
        missing.county,
        missing.school_district
    );

    EnrichedVendors {
        fields: out_fields,
        rows: out_rows,
        missing,
    }
}

fn parse_point(row: &[String], lng_col: Option<usize>, lat_col: Option<usize>) -> Option<(f64, f64)> {
    let lng = cell_f64(row, lng_col)?;
    let lat = cell_f64(row, lat_col)?;
    Some((lng, lat))
}

fn cell_f64(row: &[String], col: Option<usize>) -> Option<f64> {
    let cell = row.get(col?)?.trim();
    if cell.is_empty() {
        return None;
    }
    cell.parse().ok()
}

fn label_cells(matches: &LayerMatches) -> Vec<String> {
    let esc = matches.esc_region.as_deref();
    let county = matches.county.as_deref();
    let district = matches.school_district.as_deref();

    let county_name = county
        .map(|c| {
            let raw = c.property("FENAME");
            if raw.is_empty() { c.property("NAME") } else { raw }
        })
        .unwrap_or_default();

    vec![
        prop(esc, "ESC_REGION"),
        prop(esc, "CITY"),
        prop(esc, "WEBSITE"),
        title_case(&county_name),
        prop(county, "FIPS"),
        prop(county, "CNTYFIPS"),
        prop(district, "NAME"),
        prop(district, "NAME20"),
        prop(district, "DISTRICT_C"),
        prop(district, "NCES_DISTR"),
        prop(district, "GEOID20"),
    ]
}

fn prop(polygon: Option<&BoundaryPolygon>, key: &str) -> String {
    polygon.map(|p| p.property(key)).unwrap_or_default()
}

/// Title-case an all-caps county name: each alphabetic run starts upper, the
/// rest lowers ("FORT BEND" -> "Fort Bend", "O'BRIEN" -> "O'Brien").
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_word = false;
    for ch in name.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
