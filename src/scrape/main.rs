//! Finder feed scrape pipeline.
//!
//! Fetches the vendor feed, normalizes it into tabular CSV exports, and
//! snapshots the raw payloads for offline rebuilds.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use mesquite::config::Config;
use mesquite::fetch::{build_client, FeedFetcher, SnapshotCache};
use mesquite::normalize::{self, appconfig, inventory, MetadataInputs, Table};
use mesquite::output::write_csv;

#[derive(Parser, Debug)]
#[command(name = "scrape")]
#[command(about = "Scrape the Texas ESA vendor finder feed into CSV exports")]
struct Args {
    /// Directory for the CSV exports
    #[arg(long, default_value = "output/tx_efa_finder")]
    output_dir: PathBuf,

    /// Directory for raw payload snapshots
    #[arg(long, default_value = "cache/feed")]
    cache_dir: PathBuf,

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

    info!("Mesquite scrape");
    info!("Feed: {}", config.feed.base_url);

    let client = build_client()?;
    let cache = SnapshotCache::new(&args.cache_dir);
    let fetcher = FeedFetcher::new(&client, &cache, &config.feed)?;

    let retrieved_at = Utc::now();
    let raw_vendors = fetcher.fetch_vendors().await?;
    info!("Fetched {} vendor entries", raw_vendors.len());
    let filter_options = fetcher.fetch_filter_options().await?;
    let config_raw = fetcher.fetch_config_js().await?;

    let raw_vendors = normalize::dedupe_vendors(raw_vendors);
    let records = normalize::parse_records(&raw_vendors)?;
    let tables = normalize::normalize(&records);
    let field_inventory = inventory::field_inventory(&raw_vendors);

    let app_config = appconfig::parse_app_config(&config_raw);
    let config_table = appconfig::flatten_config(app_config.as_ref());
    let regions = appconfig::regions_table(app_config.as_ref());

    let metadata = normalize::dataset_metadata(&MetadataInputs {
        records: &records,
        vendors_url: fetcher.vendors_url().as_str(),
        filter_options_url: fetcher.filter_options_url().as_str(),
        config_url: fetcher.config_url().as_str(),
        retrieved_at,
        filter_options: &filter_options,
        config_raw_len: config_raw.chars().count(),
        config_parsed: app_config.is_some(),
    });

    let exports: [(&str, &Table); 13] = [
        ("tx_vendors.csv", &tables.vendors),
        ("tx_vendor_types.csv", &tables.vendor_types),
        ("tx_service_types.csv", &tables.service_types),
        ("tx_subjects_taught.csv", &tables.subjects),
        ("tx_bonus_tags.csv", &tables.bonus_tags),
        ("tx_specialties.csv", &tables.specialties),
        ("tx_financial_accessibility.csv", &tables.financial_access),
        ("tx_features.csv", &tables.features),
        (
            "tx_academic_notable_achievements.csv",
            &tables.academic_achievements,
        ),
        ("tx_config.csv", &config_table),
        ("tx_regions.csv", &regions),
        ("tx_field_inventory.csv", &field_inventory),
        ("tx_dataset_metadata.csv", &metadata),
    ];

    for (file, table) in exports {
        let path = args.output_dir.join(file);
        write_csv(&path, &table.fields, &table.rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    info!(
        "Wrote {} CSV exports to {}",
        exports.len(),
        args.output_dir.display()
    );

    Ok(())
}
