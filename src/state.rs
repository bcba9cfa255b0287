use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::config::DataLayout;
use crate::data::loader::load_reference_data;
use crate::data::model::{PlotDescription, ReferenceData};
use crate::data::plot_state::update;
use crate::data::redshift::Redshift;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Directory the reference data was loaded from.
    pub data_dir: PathBuf,

    pub layout: DataLayout,

    /// Loaded reference tables (None until a directory loads successfully).
    pub reference: Option<Arc<ReferenceData>>,

    /// Current plot, rebuilt by every update.
    pub plot: Option<PlotDescription>,

    /// Checklist options: distinct catalog species in file order.
    pub species: Vec<String>,

    pub selected: BTreeSet<String>,

    /// Last valid redshift; the plot always reflects this value.
    pub redshift: Redshift,

    /// Contents of the redshift input, possibly invalid while typing.
    pub redshift_text: String,

    /// Why `redshift_text` was rejected.
    pub redshift_error: Option<String>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(data_dir: PathBuf, layout: DataLayout) -> Self {
        Self {
            data_dir,
            layout,
            reference: None,
            plot: None,
            species: Vec::new(),
            selected: BTreeSet::new(),
            redshift: Redshift::ZERO,
            redshift_text: "0".to_string(),
            redshift_error: None,
            status_message: None,
        }
    }

    /// Ingest newly loaded reference data and rebuild the plot from scratch.
    pub fn set_reference(&mut self, reference: ReferenceData) {
        self.species = reference.catalog.species();
        let known: BTreeSet<&String> = self.species.iter().collect();
        self.selected.retain(|s| known.contains(s));

        self.plot = Some(PlotDescription::initial(&reference));
        self.reference = Some(Arc::new(reference));
        self.status_message = None;
        self.refresh();
    }

    /// Load a data directory, keeping the current data if it fails.
    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        let reference = load_reference_data(dir, &self.layout)
            .with_context(|| format!("loading reference data from {}", dir.display()))?;
        self.data_dir = dir.to_path_buf();
        self.set_reference(reference);
        Ok(())
    }

    /// Run one update cycle with the current inputs.
    pub fn refresh(&mut self) {
        let (Some(reference), Some(plot)) = (&self.reference, self.plot.take()) else {
            return;
        };
        self.plot = Some(update(plot, reference, self.redshift, &self.selected));
    }

    /// Apply the redshift input text. Invalid text is reported and the
    /// plot keeps the last valid redshift.
    pub fn set_redshift_text(&mut self, text: String) {
        match Redshift::parse_input(&text) {
            Ok(z) => {
                self.redshift_error = None;
                self.redshift_text = text;
                if z != self.redshift {
                    self.redshift = z;
                    self.refresh();
                }
            }
            Err(e) => {
                log::debug!("rejected redshift input '{text}': {e}");
                self.redshift_error = Some(e.to_string());
                self.redshift_text = text;
            }
        }
    }

    /// Step the redshift by whole input increments.
    pub fn step_redshift(&mut self, steps: i32) {
        let z = self.redshift.stepped(steps);
        self.set_redshift_text(format!("{:.2}", z.value()));
    }

    pub fn set_species(&mut self, species: &str, on: bool) {
        let changed = if on {
            self.selected.insert(species.to_string())
        } else {
            self.selected.remove(species)
        };
        if changed {
            self.refresh();
        }
    }

    pub fn toggle_species(&mut self, species: &str) {
        let on = !self.selected.contains(species);
        self.set_species(species, on);
    }

    pub fn select_all(&mut self) {
        self.selected = self.species.iter().cloned().collect();
        self.refresh();
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.refresh();
    }

    /// Write the current plot description as pretty JSON.
    pub fn export_plot(&self, path: &Path) -> Result<()> {
        let plot = self
            .plot
            .as_ref()
            .context("no plot to export; reference data is not loaded")?;
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        let mut writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, plot)
            .with_context(|| format!("writing {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported plot description to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{GalaxySpectrum, LineCatalog, LineEntry, SeriesKind};

    fn reference() -> ReferenceData {
        let galaxy = |name: &str| GalaxySpectrum {
            name: name.to_string(),
            catalog_redshift: 0.0,
            rest_wavelength: vec![5.0, 10.0],
            flux: vec![1.0, 2.0],
        };
        ReferenceData {
            galaxies: vec![galaxy("NGC7469"), galaxy("VV114")],
            filters: Vec::new(),
            catalog: LineCatalog::new(vec![
                LineEntry {
                    species: "H2".to_string(),
                    wavelength: 9.66,
                },
                LineEntry {
                    species: "[NeII]".to_string(),
                    wavelength: 12.81,
                },
            ]),
        }
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(PathBuf::from("."), DataLayout::default());
        state.set_reference(reference());
        state
    }

    fn marker_count(state: &AppState) -> usize {
        state.plot.as_ref().unwrap().count(SeriesKind::LineMarker)
    }

    #[test]
    fn valid_redshift_text_updates_plot() {
        let mut state = loaded_state();
        state.set_redshift_text("1".to_string());
        assert_eq!(state.redshift.value(), 1.0);
        assert!(state.redshift_error.is_none());
        assert_eq!(state.plot.as_ref().unwrap().data[0].x, vec![10.0, 20.0]);
    }

    #[test]
    fn invalid_redshift_text_keeps_last_valid_plot() {
        let mut state = loaded_state();
        state.set_redshift_text("0.5".to_string());
        let before = state.plot.clone();

        state.set_redshift_text("0.5x".to_string());
        assert!(state.redshift_error.is_some());
        assert_eq!(state.redshift_text, "0.5x");
        assert_eq!(state.redshift.value(), 0.5);
        assert_eq!(state.plot, before);

        state.set_redshift_text("-2".to_string());
        assert!(state.redshift_error.is_some());
        assert_eq!(state.plot, before);
    }

    #[test]
    fn step_buttons_move_by_hundredths() {
        let mut state = loaded_state();
        state.step_redshift(1);
        state.step_redshift(1);
        assert_eq!(state.redshift_text, "0.02");
        state.step_redshift(-5);
        assert_eq!(state.redshift_text, "0.00");
        assert_eq!(state.redshift, Redshift::ZERO);
    }

    #[test]
    fn species_checklist_drives_markers() {
        let mut state = loaded_state();
        state.toggle_species("H2");
        assert_eq!(marker_count(&state), 1);
        state.select_all();
        assert_eq!(marker_count(&state), 2);
        state.toggle_species("H2");
        assert_eq!(marker_count(&state), 1);
        state.select_none();
        assert_eq!(marker_count(&state), 0);
    }

    #[test]
    fn reload_drops_selections_unknown_to_new_catalog() {
        let mut state = loaded_state();
        state.set_species("H2", true);
        state.set_species("CO", true);
        state.set_reference(reference());
        assert_eq!(state.selected, BTreeSet::from(["H2".to_string()]));
        assert_eq!(marker_count(&state), 1);
    }

    #[test]
    fn failed_load_keeps_existing_data() {
        let mut state = loaded_state();
        let dir = tempfile::tempdir().unwrap();
        assert!(state.load_dir(dir.path()).is_err());
        assert!(state.reference.is_some());
        assert_eq!(state.data_dir, PathBuf::from("."));
    }

    #[test]
    fn export_writes_json_plot() {
        let mut state = loaded_state();
        state.set_species("H2", true);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.json");
        state.export_plot(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let back: PlotDescription = serde_json::from_str(&text).unwrap();
        assert_eq!(Some(back), state.plot);
        assert!(text.contains("\"line_marker\""));
    }

    #[test]
    fn export_without_data_fails() {
        let state = AppState::new(PathBuf::from("."), DataLayout::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(state.export_plot(&dir.path().join("plot.json")).is_err());
    }
}
