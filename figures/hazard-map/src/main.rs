//! Flood hazard scenario-grid map.
//!
//! One panel per (model, return period) scenario: rows are "Current" plus
//! the five GCMs, columns are return periods, with a Tanzania-wide locator
//! inset and a shared flood-depth colorbar.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use atlas_common::{AtlasConfig, Extent};
use compositor::figure::{compose_scenario_grid, GridFigureSpec};
use compositor::layout::FigureLayout;
use compositor::load::load_scenario_rasters;
use compositor::overlay::country_basemap;
use compositor::scenario::{hazard_base_path, ScenarioEnumerator, CLIMATE_MODELS};
use compositor::FigureExporter;
use renderer::{ColorClassification, Typeface};

/// Return periods shown as grid columns.
const RETURN_PERIODS: [u32; 2] = [5, 1000];

#[derive(Parser, Debug)]
#[command(name = "hazard-map")]
#[command(about = "Render the flood hazard scenario-grid map")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Output filename within the configured figures directory
    #[arg(short, long, default_value = "hazard_map.png")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = AtlasConfig::load(&args.config)?;
    info!(data_path = %config.data_path.display(), "starting hazard map");

    let enumerator = ScenarioEnumerator::with_study_models(
        hazard_base_path(&config.data_path),
        RETURN_PERIODS.to_vec(),
    );
    let scenarios = enumerator.enumerate()?;
    if scenarios.is_empty() {
        anyhow::bail!("zero scenarios resolved");
    }
    info!(count = scenarios.len(), "enumerated scenarios");

    // Load once; the cache feeds classification and rendering alike.
    let rasters = load_scenario_rasters(&scenarios);

    // Shared artifacts, fully constructed before any panel is composed.
    let classification = ColorClassification::flood_depth()?;
    let overlays = match country_basemap(&config.data_path) {
        Ok(basemap) => vec![basemap],
        Err(e) => {
            warn!(error = %e, "basemap unavailable; panels draw without boundaries");
            Vec::new()
        }
    };
    let typeface = Typeface::discover();

    // Rows: models plus "Current" plus the context/inset row.
    let rows = 2 + CLIMATE_MODELS.len();
    let layout = FigureLayout::new(1200, 2700, rows, RETURN_PERIODS.len())?
        .with_margins(64.0, 20.0, 40.0, 20.0)
        .with_spacing(8.0, 26.0)
        .with_legend_band(110.0);

    let spec = GridFigureSpec {
        zoom_extent: Extent::new(37.8, 39.6, -8.5, -6.7),
        context_extent: Extent::new(28.6, 41.4, -13.2, -0.1),
        annotations: vec![
            ("Dar-Es-Salaam".to_string(), 39.1, -6.91),
            ("Pwani".to_string(), 38.52, -7.43),
            ("Indian".to_string(), 39.69, -7.68),
            ("Ocean".to_string(), 39.69, -7.88),
        ],
        colorbar_caption: Some("Flood depth (m)".to_string()),
    };

    let canvas = compose_scenario_grid(
        &spec,
        &scenarios,
        &rasters,
        &classification,
        &overlays,
        &layout,
        typeface.as_ref(),
    )?;

    FigureExporter::new(&config.figures_path, &args.output).export(&canvas)?;
    Ok(())
}

fn init_tracing(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
