//! Country-wide road network map.
//!
//! Single panel covering all of Tanzania: country basemap plus the trunk
//! and regional road network, with a legend and title.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

use atlas_common::{AtlasConfig, Extent};
use compositor::layout::CellRect;
use compositor::overlay::{country_basemap, GeometryOverlay, OverlayStyle};
use compositor::panel::{PanelComposer, PanelDecorations};
use compositor::FigureExporter;
use renderer::legend::{self, LegendEntry};
use renderer::{Color, FigureCanvas, Typeface};

const ROAD_COLOR: Color = Color::rgb(209, 23, 10);

#[derive(Parser, Debug)]
#[command(name = "road-network-map")]
#[command(about = "Render the country-wide road network map")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Output filename within the configured figures directory
    #[arg(short, long, default_value = "road_network_map_all.png")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = AtlasConfig::load(&args.config)?;

    let roads_path = config
        .data_path
        .join("Analysis_results")
        .join("spof_localfailure_results")
        .join("tz_road_spof_geom.shp");
    // The road network is the figure; without it there is nothing to show.
    let roads = GeometryOverlay::load(
        "trunk and regional roads",
        &roads_path,
        OverlayStyle::stroked(ROAD_COLOR, 1.2, 3),
    )?;

    let mut overlays = vec![roads];
    match country_basemap(&config.data_path) {
        Ok(basemap) => overlays.push(basemap),
        Err(e) => warn!(error = %e, "basemap unavailable"),
    }

    let typeface = Typeface::discover();
    let mut canvas = FigureCanvas::new(900, 900, Color::rgb(255, 255, 255))?;
    let composer = PanelComposer::new(None, typeface.as_ref());

    let cell = CellRect {
        x: 22.0,
        y: 44.0,
        w: 856.0,
        h: 820.0,
    };
    let view = Extent::new(28.6, 41.4, -12.5, 0.5);
    composer.compose(
        &mut canvas,
        &cell,
        &view,
        None,
        &overlays,
        &PanelDecorations {
            frame: Some(Color::rgb(120, 120, 120)),
            ..Default::default()
        },
    )?;

    if let Some(tf) = typeface.as_ref() {
        tf.draw_text_centered(
            &mut canvas,
            450,
            14,
            "Trunk and Regional Roads in Tanzania",
            16.0,
            Color::rgb(30, 30, 30),
        );
        let card = legend::patch_legend(
            &[LegendEntry::new("TANROADS Trunk and Regional Roads", ROAD_COLOR)],
            tf,
            11.0,
        )?;
        let y = (cell.y + cell.h) as i32 - card.height() as i32 - 10;
        canvas.draw_pixmap(cell.x as i32 + 10, y, &card);
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
