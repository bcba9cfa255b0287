mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use eframe::egui;

use app::FilterViewerApp;
use config::{Args, DataLayout};
use data::redshift::Redshift;
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Reference data is required; a bad directory ends the process.
    let mut state = AppState::new(args.data_dir.clone(), DataLayout::default());
    if let Err(e) = state.load_dir(&args.data_dir) {
        log::error!("Failed to load reference data: {e:#}");
        return Err(e);
    }

    let redshift = Redshift::parse_input(&args.redshift)
        .with_context(|| format!("invalid --redshift '{}'", args.redshift))?;
    state.set_redshift_text(redshift.to_string());
    for species in &args.species {
        if !state.species.contains(species) {
            log::warn!("Species '{species}' is not in the line catalog");
        }
        state.set_species(species, true);
    }

    if let Some(path) = &args.export {
        return state.export_plot(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "JWST Imager & IFU Filter Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(FilterViewerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
