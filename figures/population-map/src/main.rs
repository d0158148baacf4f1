//! Population and road access map.
//!
//! Single zoomed panel of WorldPop density with regional/trunk roads and a
//! buffered highlight route, plus a locator inset, horizontal colorbar and
//! road-class legend.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use atlas_common::{AtlasConfig, Extent};
use compositor::layout::CellRect;
use compositor::load::load_standalone_raster;
use compositor::overlay::{country_basemap, roads_path, GeometryOverlay, OverlayStyle};
use compositor::panel::{PanelComposer, PanelDecorations};
use compositor::FigureExporter;
use renderer::legend::{self, LegendEntry};
use renderer::{Color, ColorClassification, FigureCanvas, Typeface};

const FIGURE_SIZE: u32 = 600;

const TRUNK_ROAD_COLOR: Color = Color::rgb(31, 120, 180);
const REGIONAL_ROAD_COLOR: Color = Color::rgb(196, 196, 196);
const ROUTE_FILL: Color = Color::new(255, 179, 179, 102);

#[derive(Parser, Debug)]
#[command(name = "population-map")]
#[command(about = "Render the population / road access map")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Output filename within the configured figures directory
    #[arg(short, long, default_value = "population_roads_map.png")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = AtlasConfig::load(&args.config)?;

    let population_path = config
        .data_path
        .join("Infrastructure")
        .join("Population")
        .join("TZA_popmap15adj_v2b_cropped.tif");
    let raster = load_standalone_raster("population density", &population_path)?;

    // Classification derives from the raster's valid range; zero bucket is
    // transparent so the basemap shows through unsettled cells.
    let max_density = raster
        .values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold(0.0f32, f32::max);
    if max_density <= 0.0 {
        anyhow::bail!("population raster has an empty valid-data range");
    }
    let classification = ColorClassification::population(max_density as f64, 10)?;
    info!(max_density, "classified population range");

    let mut overlays = Vec::new();
    match country_basemap(&config.data_path) {
        Ok(basemap) => overlays.push(basemap),
        Err(e) => warn!(error = %e, "basemap unavailable"),
    }
    let road_layers = [
        (
            "regional roads",
            roads_path(&config.data_path, "region_roads_2017.shp"),
            OverlayStyle::stroked(REGIONAL_ROAD_COLOR, 1.0, 3),
        ),
        (
            "trunk roads",
            roads_path(&config.data_path, "trunk_roads_2017.shp"),
            OverlayStyle::stroked(TRUNK_ROAD_COLOR, 1.5, 4),
        ),
        (
            "highlight route",
            config
                .data_path
                .join("Infrastructure")
                .join("Roads")
                .join("highlight_route_mwanza.shp"),
            OverlayStyle::buffered(ROUTE_FILL, 0.006, 5),
        ),
    ];
    for (name, path, style) in road_layers {
        match GeometryOverlay::load(name, &path, style) {
            Ok(overlay) => overlays.push(overlay),
            Err(e) => warn!(error = %e, "road layer unavailable; map degrades"),
        }
    }

    let typeface = Typeface::discover();
    let mut canvas = FigureCanvas::new(FIGURE_SIZE, FIGURE_SIZE, Color::rgb(255, 255, 255))?;
    let composer = PanelComposer::new(Some(&classification), typeface.as_ref());

    let zoom_extent = Extent::new(32.75, 33.2, -2.75, -2.4);
    let main_cell = CellRect {
        x: 15.0,
        y: 16.0,
        w: 570.0,
        h: 452.0,
    };
    composer.compose(
        &mut canvas,
        &main_cell,
        &zoom_extent,
        Some(&raster),
        &overlays,
        &PanelDecorations {
            frame: Some(Color::rgb(120, 120, 120)),
            ..Default::default()
        },
    )?;

    // Locator inset over the main panel, same zoom constant as the panel.
    let context_extent = Extent::new(28.6, 41.4, -13.2, -0.1);
    let inset_cell = CellRect {
        x: 390.0,
        y: 300.0,
        w: 195.0,
        h: 150.0,
    };
    composer.compose(
        &mut canvas,
        &inset_cell,
        &context_extent,
        None,
        &overlays,
        &PanelDecorations {
            frame: Some(Color::rgb(120, 120, 120)),
            ..Default::default()
        },
    )?;
    composer.draw_locator_rectangle(&mut canvas, &inset_cell, &context_extent, &zoom_extent);

    // Shared colorbar below the panel.
    let bar = legend::colorbar(
        &classification,
        500,
        16,
        typeface.as_ref(),
        Some("Population density (people per grid square)"),
    )?;
    canvas.draw_pixmap(50, 490, &bar);

    // Road-class legend, lower left.
    if let Some(tf) = typeface.as_ref() {
        let entries = [
            LegendEntry::new("Major Roads", TRUNK_ROAD_COLOR),
            LegendEntry::new("Regional Roads", REGIONAL_ROAD_COLOR),
            LegendEntry::new("Route to major node", ROUTE_FILL),
        ];
        let card = legend::patch_legend(&entries, tf, 11.0)?;
        let y = (main_cell.y + main_cell.h) as i32 - card.height() as i32 - 8;
        canvas.draw_pixmap(main_cell.x as i32 + 8, y, &card);
    }

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
