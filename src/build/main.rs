//! Workbook build pipeline.
//!
//! Reads scraped CSV exports, joins vendors against TEA boundary layers, and
//! writes the styled workbook, the enriched CSV, and the download page.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use reqwest::Client;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use mesquite::config::Config;
use mesquite::enrich::{enrich_rows, MissingCounts};
use mesquite::excel::WorkbookBuilder;
use mesquite::fetch::{build_client, ArcGisClient};
use mesquite::models::BoundaryLayer;
use mesquite::output::{read_csv, write_csv};
use mesquite::pip::{parse_boundary_layer, BoundaryIndex, BoundaryService};
use mesquite::site::publish_workbook;

/// Sheets built straight from the scrape CSV exports, in workbook order.
const SHEET_SOURCES: [(&str, &str); 12] = [
    ("tx_vendor_types.csv", "Vendor Types"),
    ("tx_service_types.csv", "Service Types"),
    ("tx_subjects_taught.csv", "Subjects"),
    ("tx_bonus_tags.csv", "Bonus Tags"),
    ("tx_specialties.csv", "Specialties"),
    ("tx_features.csv", "Features"),
    ("tx_financial_accessibility.csv", "Financial Access"),
    ("tx_academic_notable_achievements.csv", "Academic Achievements"),
    ("tx_regions.csv", "Regions"),
    ("tx_config.csv", "Config"),
    ("tx_dataset_metadata.csv", "Dataset Metadata"),
    ("tx_field_inventory.csv", "Field Inventory"),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MissingBoundaries {
    /// Fail the run when boundary data cannot be loaded
    Abort,
    /// Skip enrichment and leave every vendor unenriched
    Skip,
}

#[derive(Parser, Debug)]
#[command(name = "build")]
#[command(about = "Build the styled workbook from scraped CSV exports")]
struct Args {
    /// Directory containing the scrape CSV exports
    #[arg(long, default_value = "output/tx_efa_finder")]
    input_dir: PathBuf,

    /// Directory caching TEA boundary GeoJSON files
    #[arg(long, default_value = "data/tea")]
    boundary_dir: PathBuf,

    /// Re-download boundary data even if cached
    #[arg(long)]
    refresh_boundaries: bool,

    /// Path of the workbook to write
    #[arg(long, default_value = "output/tx_efa_finder/tx_efa_finder.xlsx")]
    output: PathBuf,

    /// Directory for the published workbook and download page
    #[arg(long, default_value = "docs")]
    publish_dir: PathBuf,

    /// Behavior when boundary data is missing or malformed
    #[arg(long, value_enum, default_value = "abort")]
    missing_boundaries: MissingBoundaries,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();
    let config = Config::load_or_default(args.config.as_deref())?;

    info!("Mesquite workbook build");

    let client = build_client()?;
    let service = match load_boundary_service(&args, &config, &client).await {
        Ok(service) => Some(service),
        Err(err) => match args.missing_boundaries {
            MissingBoundaries::Abort => {
                return Err(err.context("boundary layers failed to load"))
            }
            MissingBoundaries::Skip => {
                warn!(
                    "Boundary layers failed to load ({:#}); vendors will be left unenriched",
                    err
                );
                None
            }
        },
    };

    let vendors_path = args.input_dir.join("tx_vendors.csv");
    let (vendor_fields, vendor_rows) = read_csv(&vendors_path)?;
    let enriched = enrich_rows(&vendor_fields, &vendor_rows, service.as_ref());

    let enriched_path = args.input_dir.join("tx_vendors_enriched.csv");
    write_csv(&enriched_path, &enriched.fields, &enriched.rows)?;

    let generated_at = Utc::now();
    let (_, metadata_rows) = read_csv(&args.input_dir.join("tx_dataset_metadata.csv"))?;
    let overview = overview_rows(&metadata_rows, &args, &enriched.missing, generated_at);

    let mut builder = WorkbookBuilder::new();
    let overview_fields = vec!["Key".to_string(), "Value".to_string()];
    builder.add_table_sheet("Overview", &overview_fields, &overview)?;
    builder.add_table_sheet("Vendors", &enriched.fields, &enriched.rows)?;
    for (file, title) in SHEET_SOURCES {
        let (fields, rows) = read_csv(&args.input_dir.join(file))?;
        builder.add_table_sheet(title, &fields, &rows)?;
    }

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    builder
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Wrote workbook to {}", args.output.display());

    let published = publish_workbook(&args.output, &args.publish_dir, generated_at)?;
    info!("Published {}", published.display());

    Ok(())
}

/// Load all three boundary layers from cache or the portal and build the
/// join service. Any failure here is subject to the operator's
/// `--missing-boundaries` policy.
async fn load_boundary_service(
    args: &Args,
    config: &Config,
    client: &Client,
) -> Result<BoundaryService> {
    let arcgis = ArcGisClient::new(client, &config.portal)?;

    let esc_region = load_layer(BoundaryLayer::EscRegion, args, config, &arcgis).await?;
    let county = load_layer(BoundaryLayer::County, args, config, &arcgis).await?;
    let school_district = load_layer(BoundaryLayer::SchoolDistrict, args, config, &arcgis).await?;

    Ok(BoundaryService::new(esc_region, county, school_district))
}

async fn load_layer(
    layer: BoundaryLayer,
    args: &Args,
    config: &Config,
    arcgis: &ArcGisClient<'_>,
) -> Result<BoundaryIndex> {
    let path = args
        .boundary_dir
        .join(format!("{}.geojson", layer.cache_name()));

    let raw = if path.is_file() && !args.refresh_boundaries {
        info!("Using cached {} boundaries from {}", layer, path.display());
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?
    } else {
        info!("Downloading {} boundaries", layer);
        let raw = arcgis
            .fetch_layer_geojson(config.boundary_item_id(layer))
            .await?;
        fs::create_dir_all(&args.boundary_dir)
            .with_context(|| format!("Failed to create {}", args.boundary_dir.display()))?;
        fs::write(&path, &raw).with_context(|| format!("Failed to write {}", path.display()))?;
        raw
    };

    let boundaries = parse_boundary_layer(layer, &raw)?;
    Ok(BoundaryIndex::build(boundaries))
}

/// Overview sheet rows: the scrape metadata sorted by key, followed by the
/// build's own summary.
fn overview_rows(
    metadata_rows: &[Vec<String>],
    args: &Args,
    missing: &MissingCounts,
    generated_at: DateTime<Utc>,
) -> Vec<Vec<String>> {
    let keyed: BTreeMap<&String, &String> = metadata_rows
        .iter()
        .filter_map(|row| match row.as_slice() {
            [key, value, ..] => Some((key, value)),
            _ => None,
        })
        .collect();

    let mut rows: Vec<Vec<String>> = keyed
        .into_iter()
        .map(|(key, value)| vec![key.clone(), value.clone()])
        .collect();

    rows.push(vec![
        "tea_boundary_dir".to_string(),
        args.boundary_dir.display().to_string(),
    ]);
    rows.push(vec![
        "tea_esc_missing_count".to_string(),
        missing.esc_region.to_string(),
    ]);
    rows.push(vec![
        "tea_county_missing_count".to_string(),
        missing.county.to_string(),
    ]);
    rows.push(vec![
        "tea_district_missing_count".to_string(),
        missing.school_district.to_string(),
    ]);
    rows.push(vec![
        "workbook_generated_at_utc".to_string(),
        generated_at.to_rfc3339(),
    ]);

    rows
}
