//! Flood depth distribution figure.
//!
//! The full return-period set across "Current" and the five GCMs, one
//! histogram of filtered flood depths per scenario, on a fixed vertical
//! scale so panels are comparable.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use atlas_common::AtlasConfig;
use compositor::histogram::{draw_axis_caption, draw_histogram_panel};
use compositor::layout::FigureLayout;
use compositor::load::load_scenario_rasters;
use compositor::panel::{PanelComposer, PanelDecorations};
use compositor::scenario::{hazard_base_path, ScenarioEnumerator, CLIMATE_MODELS};
use compositor::stats::{filter_valid, histogram};
use compositor::FigureExporter;
use renderer::{Color, FigureCanvas, Typeface};

/// Full return-period set of the study.
const RETURN_PERIODS: [u32; 9] = [2, 5, 10, 25, 50, 100, 250, 500, 1000];

/// Depth histogram bins over [0, 15) meters.
const BINS: usize = 15;
const DEPTH_RANGE: (f32, f32) = (0.0, 15.0);

/// Shared y-limit across every panel.
const Y_LIMIT: u32 = 20_000;

#[derive(Parser, Debug)]
#[command(name = "depth-histograms")]
#[command(about = "Render per-scenario flood depth histograms")]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Output filename within the configured figures directory
    #[arg(short, long, default_value = "flood_depth_histograms.png")]
    output: String,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let config = AtlasConfig::load(&args.config)?;
    let enumerator = ScenarioEnumerator::with_study_models(
        hazard_base_path(&config.data_path),
        RETURN_PERIODS.to_vec(),
    );
    let scenarios = enumerator.enumerate()?;
    if scenarios.is_empty() {
        anyhow::bail!("zero scenarios resolved");
    }
    info!(count = scenarios.len(), "enumerated scenarios");

    let rasters = load_scenario_rasters(&scenarios);
    let typeface = Typeface::discover();

    // No context row here: every cell is a scenario panel.
    let rows = 1 + CLIMATE_MODELS.len();
    let layout = FigureLayout::new(1800, 1200, rows, RETURN_PERIODS.len())?
        .with_margins(90.0, 24.0, 44.0, 30.0)
        .with_spacing(10.0, 14.0);
    layout.check_alignment(scenarios.len(), 0)?;

    let mut canvas = FigureCanvas::new(layout.width(), layout.height(), Color::rgb(255, 255, 255))?;
    let composer = PanelComposer::new(None, typeface.as_ref());

    for (pos, cell) in layout.cells() {
        let scenario = &scenarios[pos.index];
        match &rasters[pos.index] {
            Ok(data) => {
                let valid = filter_valid(&data.values);
                let hist = histogram(&valid, BINS, DEPTH_RANGE);
                if hist.clipped > 0 {
                    debug!(
                        scenario = %scenario.label(),
                        clipped = hist.clipped,
                        "samples outside histogram range"
                    );
                }
                draw_histogram_panel(&mut canvas, &cell, &hist, Y_LIMIT)?;
            }
            Err(_) => {
                composer.compose_placeholder(
                    &mut canvas,
                    &cell,
                    &scenario.label(),
                    &PanelDecorations::default(),
                )?;
            }
        }

        // Positional decoration rule, same as the map grids.
        if let Some(tf) = typeface.as_ref() {
            if pos.is_first_row() {
                tf.draw_text_centered(
                    &mut canvas,
                    cell.center_x() as i32,
                    (cell.y - 20.0) as i32,
                    &format!("{}y return", scenario.return_period),
                    12.0,
                    Color::rgb(30, 30, 30),
                );
            }
            if pos.is_first_column() {
                tf.draw_text_rotated(
                    &mut canvas,
                    (cell.x - 26.0) as i32,
                    cell.center_y() as i32,
                    &scenario.model,
                    12.0,
                    Color::rgb(30, 30, 30),
                );
            }
        }
    }

    if let Some(tf) = typeface.as_ref() {
        draw_axis_caption(
            &mut canvas,
            tf,
            (layout.width() / 2) as i32 - 50,
            (layout.height() - 22) as i32,
            "Flood depth (m)",
            12.0,
        );
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
