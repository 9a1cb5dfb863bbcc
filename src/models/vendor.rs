//! Vendor feed schema.
//!
//! The finder feed is owned by the upstream provider. This schema names every
//! field the pipeline relies on and fails fast when required ones are absent,
//! so drift surfaces at parse time instead of deep inside formatting code.
//! Fields the feed types loosely (prices, grade bounds, nested location
//! blobs) are carried as raw JSON values and rendered textually.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column order of the flattened vendor table.
pub const VENDOR_FIELDS: [&str; 42] = [
    "id",
    "name",
    "vendorType",
    "vendorTypes",
    "type",
    "serviceType",
    "description",
    "directPayMarketplace",
    "additionalLocations",
    "subjectsTaught",
    "pricingModel",
    "price",
    "pricingNotes",
    "isProductionReady",
    "curricularClassification",
    "bonusTagsRaw",
    "minGrade",
    "maxGrade",
    "isPreK",
    "isElementary",
    "isMiddle",
    "isHigh",
    "displayGradeRange",
    "costOptions",
    "address_street",
    "address_city",
    "address_state",
    "address_zipcode",
    "address_county",
    "address_region",
    "location_lat",
    "location_lng",
    "contact_website",
    "contact_phone",
    "contact_email",
    "financial_minAnnualTuition",
    "financial_maxAnnualTuition",
    "academics_studentGrowth",
    "academics_attendanceRate",
    "academics_graduationRate",
    "academics_studentTeacherRatio",
    "academics_retentionRate",
];

/// One vendor entry from the finder feed.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorRecord {
    #[serde(deserialize_with = "de_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub vendor_type: Option<String>,
    #[serde(default)]
    pub vendor_types: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub type_tag: Option<String>,
    #[serde(default)]
    pub service_type: Option<Vec<String>>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub direct_pay_marketplace: Option<Value>,
    #[serde(default)]
    pub additional_locations: Option<Value>,
    #[serde(default)]
    pub subjects_taught: Option<Vec<String>>,
    #[serde(default)]
    pub pricing_model: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub pricing_notes: Option<String>,
    #[serde(default)]
    pub is_production_ready: Option<Value>,
    #[serde(default)]
    pub curricular_classification: Option<String>,
    #[serde(default)]
    pub bonus_tags_raw: Option<Vec<String>>,
    #[serde(default)]
    pub min_grade: Option<Value>,
    #[serde(default)]
    pub max_grade: Option<Value>,
    #[serde(default, rename = "isPreK")]
    pub is_pre_k: Option<Value>,
    #[serde(default)]
    pub is_elementary: Option<Value>,
    #[serde(default)]
    pub is_middle: Option<Value>,
    #[serde(default)]
    pub is_high: Option<Value>,
    #[serde(default)]
    pub display_grade_range: Option<String>,
    #[serde(default)]
    pub cost_options: Option<Value>,
    #[serde(default)]
    pub address: Option<VendorAddress>,
    #[serde(default)]
    pub location: Option<VendorLocation>,
    #[serde(default)]
    pub contact: Option<VendorContact>,
    #[serde(default)]
    pub school_attributes: Option<SchoolAttributes>,
    #[serde(default)]
    pub specialties: Option<BTreeMap<String, Option<Vec<String>>>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorAddress {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub zipcode: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VendorLocation {
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorContact {
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolAttributes {
    #[serde(default)]
    pub financial: Option<FinancialAttributes>,
    #[serde(default)]
    pub features: Option<BTreeMap<String, Option<Vec<String>>>>,
    #[serde(default)]
    pub academics: Option<AcademicAttributes>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialAttributes {
    #[serde(default)]
    pub min_annual_tuition: Option<Value>,
    #[serde(default)]
    pub max_annual_tuition: Option<Value>,
    #[serde(default)]
    pub financial_accessibility: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicAttributes {
    #[serde(default)]
    pub student_growth: Option<Value>,
    #[serde(default)]
    pub attendance_rate: Option<Value>,
    #[serde(default)]
    pub graduation_rate: Option<Value>,
    #[serde(default)]
    pub student_teacher_ratio: Option<Value>,
    #[serde(default)]
    pub retention_rate: Option<Value>,
    #[serde(default)]
    pub notable_achievements: Option<Vec<String>>,
}

impl VendorRecord {
    /// Render the record as one row of the flattened vendor table, matching
    /// [`VENDOR_FIELDS`] column for column.
    pub fn flat_row(&self) -> Vec<String> {
        let address = self.address.clone().unwrap_or_default();
        let location = self.location.unwrap_or_default();
        let contact = self.contact.clone().unwrap_or_default();
        let attributes = self.school_attributes.clone().unwrap_or_default();
        let financial = attributes.financial.unwrap_or_default();
        let academics = attributes.academics.unwrap_or_default();

        vec![
            self.id.clone(),
            self.name.clone(),
            self.vendor_type.clone().unwrap_or_default(),
            join_list(self.vendor_types.as_deref()),
            self.type_tag.clone().unwrap_or_default(),
            join_list(self.service_type.as_deref()),
            self.description.clone().unwrap_or_default(),
            opt_cell(&self.direct_pay_marketplace),
            json_cell(&self.additional_locations),
            join_list(self.subjects_taught.as_deref()),
            self.pricing_model.clone().unwrap_or_default(),
            opt_cell(&self.price),
            self.pricing_notes.clone().unwrap_or_default(),
            opt_cell(&self.is_production_ready),
            self.curricular_classification.clone().unwrap_or_default(),
            join_list(self.bonus_tags_raw.as_deref()),
            opt_cell(&self.min_grade),
            opt_cell(&self.max_grade),
            opt_cell(&self.is_pre_k),
            opt_cell(&self.is_elementary),
            opt_cell(&self.is_middle),
            opt_cell(&self.is_high),
            self.display_grade_range.clone().unwrap_or_default(),
            opt_cell(&self.cost_options),
            address.street.unwrap_or_default(),
            address.city.unwrap_or_default(),
            address.state.unwrap_or_default(),
            address.zipcode.unwrap_or_default(),
            address.county.unwrap_or_default(),
            address.region.unwrap_or_default(),
            float_cell(location.lat),
            float_cell(location.lng),
            contact.website.unwrap_or_default(),
            contact.phone.unwrap_or_default(),
            contact.email.unwrap_or_default(),
            opt_cell(&financial.min_annual_tuition),
            opt_cell(&financial.max_annual_tuition),
            opt_cell(&academics.student_growth),
            opt_cell(&academics.attendance_rate),
            opt_cell(&academics.graduation_rate),
            opt_cell(&academics.student_teacher_ratio),
            opt_cell(&academics.retention_rate),
        ]
    }
}

/// Render a JSON scalar for a table cell; containers render as JSON text.
pub fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Join list values with "; " the way the CSV exports render them.
pub fn join_list(values: Option<&[String]>) -> String {
    values.map(|v| v.join("; ")).unwrap_or_default()
}

fn opt_cell(value: &Option<Value>) -> String {
    value.as_ref().map(value_to_cell).unwrap_or_default()
}

fn json_cell(value: &Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(other) => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn float_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn de_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::String(s) if !s.is_empty() => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "vendor id must be a non-empty string or a number, got {other}"
        ))),
    }
}

fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

fn de_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
