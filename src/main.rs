// src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use oeds_explorer::analysis::spatial::{records_at, render_set};
use oeds_explorer::app::tui::run_tui;
use oeds_explorer::catalog::client::{load_catalog, CatalogSource, HttpCatalog};
use oeds_explorer::catalog::geometry::Coord;
use oeds_explorer::config::*;
use oeds_explorer::export::exporter::{CatalogSnapshot, SnapshotExporter};
use oeds_explorer::logging::init_logger;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TUI_LOG_FILE: &str = "oeds-explorer.log";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root of the catalog service; the API spec is served here
    #[arg(long, env = "OEDS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,
    #[arg(long, env = "OEDS_SCHEMAS_PATH", default_value = DEFAULT_SCHEMAS_PATH)]
    schemas_path: String,
    #[arg(long, env = "OEDS_METADATA_PATH", default_value = DEFAULT_METADATA_PATH)]
    metadata_path: String,
    /// Per-request timeout; requests wait indefinitely when unset
    #[arg(long, env = "OEDS_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    /// Write a catalog snapshot here instead of starting the TUI
    #[arg(long)]
    output_file: Option<String>,
    #[arg(long, default_value = "json")]
    format: String,
    /// List the datasets covering LON,LAT instead of starting the TUI
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    point: Option<Coord>,
    #[arg(long, env = "OEDS_LOG_FILE")]
    log_file: Option<String>,
    #[arg(long, env = "OEDS_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn parse_point(raw: &str) -> Result<Coord> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| anyhow!("Expected LON,LAT but got '{}'", raw))?;
    Ok(Coord::new(lon.trim().parse()?, lat.trim().parse()?))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let tui = args.output_file.is_none() && args.point.is_none();
    let log_file = match (&args.log_file, tui) {
        (Some(path), _) => Some(path.as_str()),
        (None, true) => Some(DEFAULT_TUI_LOG_FILE),
        (None, false) => None,
    };
    init_logger(&args.log_level, log_file)?;

    let settings = ClientSettings {
        endpoints: Endpoints::from_base(&args.base_url, &args.schemas_path, &args.metadata_path)?,
        timeout: args.timeout_secs.map(Duration::from_secs),
    };
    tracing::info!(base = %settings.endpoints.spec, "starting");
    let source: Arc<dyn CatalogSource> = Arc::new(HttpCatalog::new(&settings)?);

    if tui {
        return run_tui(source).await;
    }

    let records = load_catalog(source.as_ref()).await?;

    if let Some(point) = args.point {
        for name in records_at(&render_set(&records, None), point) {
            println!("{}", name);
        }
        return Ok(());
    }

    if let Some(output_file) = &args.output_file {
        let schemas = source.fetch_schemas().await?;
        println!("--- OEDS Catalog Export ---");
        println!("Service: {}", settings.endpoints.spec);
        println!("Schemas: {}", schemas.len());
        println!("Metadata records: {}", records.len());
        println!("Output: {} ({})", output_file, args.format);

        let snapshot = CatalogSnapshot::new(settings.endpoints.spec.as_str(), schemas, records);
        SnapshotExporter.export_snapshot_to_file(&snapshot, output_file, &args.format)?;
        println!("Export completed successfully!");
    }
    Ok(())
}
