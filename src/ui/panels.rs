use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::{Instrument, SeriesKind};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – species checklist
// ---------------------------------------------------------------------------

/// Render the left species panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Species");
    ui.label("Toggle Species (line list from the PDRs4All team):");
    ui.separator();

    let Some(reference) = state.reference.clone() else {
        ui.label("No data loaded.");
        return;
    };

    ui.collapsing("Reference spectra", |ui: &mut Ui| {
        for galaxy in &reference.galaxies {
            ui.label(format!(
                "{}  (rest frame, catalog z = {})",
                galaxy.name, galaxy.catalog_redshift
            ));
        }
    });
    ui.separator();

    if reference.catalog.is_empty() {
        ui.label("The line catalog is empty.");
        return;
    }

    let n_selected = state.selected.len();
    let n_total = state.species.len();
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
        ui.label(format!("({n_selected}/{n_total})"));
    });

    // Clone so the checkboxes can mutate state inside the loop.
    let species = state.species.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for name in &species {
                let mut checked = state.selected.contains(name);
                if ui.checkbox(&mut checked, name.as_str()).changed() {
                    state.toggle_species(name);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open data directory…").clicked() {
                open_dir_dialog(state);
                ui.close_menu();
            }
            let can_export = state.plot.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export plot JSON…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();
        redshift_input(ui, state);
        ui.separator();

        if let Some(reference) = &state.reference {
            let mrs = reference
                .filters
                .iter()
                .filter(|f| f.instrument == Instrument::MrsSubBand)
                .count();
            let markers = state
                .plot
                .as_ref()
                .map_or(0, |p| p.count(SeriesKind::LineMarker));
            ui.label(format!(
                "{mrs} MRS sub-bands, {} imaging filters, {markers} line markers",
                reference.filters.len() - mrs,
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

/// Redshift text box with step buttons. The text is validated on every
/// edit; rejected text stays visible with its error.
fn redshift_input(ui: &mut Ui, state: &mut AppState) {
    ui.label("Enter Redshift:");

    if ui.small_button("−").clicked() {
        state.step_redshift(-1);
    }

    let mut text = state.redshift_text.clone();
    let response = ui.add(
        egui::TextEdit::singleline(&mut text)
            .desired_width(70.0)
            .hint_text("0"),
    );
    if response.changed() {
        state.set_redshift_text(text);
    }

    if ui.small_button("+").clicked() {
        state.step_redshift(1);
    }

    match &state.redshift_error {
        Some(err) => {
            ui.label(RichText::new(err).color(Color32::RED));
        }
        None => {
            ui.label(format!("×{:.4}", state.redshift.factor()));
        }
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dir_dialog(state: &mut AppState) {
    let dir = rfd::FileDialog::new()
        .set_title("Open JWST filter data directory")
        .set_directory(&state.data_dir)
        .pick_folder();

    if let Some(dir) = dir {
        if let Err(e) = state.load_dir(&dir) {
            log::error!("Failed to load data: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export plot description")
        .add_filter("JSON", &["json"])
        .set_file_name("plot.json")
        .save_file();

    if let Some(path) = file {
        match state.export_plot(&path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export plot: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
