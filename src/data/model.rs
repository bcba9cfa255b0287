use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rgba – renderer-independent colour
// ---------------------------------------------------------------------------

/// Straight (non-premultiplied) RGBA colour, alpha in `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Build from 8-bit channels and a CSS-style `0.0..=1.0` alpha.
    pub fn new(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([r, g, b, a])
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        write!(f, "rgba({r}, {g}, {b}, {:.2})", a as f32 / 255.0)
    }
}

// ---------------------------------------------------------------------------
// Series – one named XY trace in a plot description
// ---------------------------------------------------------------------------

/// What a series represents. Merging keys off this, never off the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Spectrum,
    Filter,
    LineMarker,
}

/// Which y axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxis {
    /// Left, linear transmission axis.
    #[default]
    Primary,
    /// Right, logarithmic intensity axis overlaying the primary.
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesStyle {
    /// `None` lets the renderer pick a colour.
    pub color: Option<Rgba>,
    /// Shade the area between the trace and y = 0.
    pub fill_to_zero: bool,
    pub legend_group: Option<String>,
    pub show_legend: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub kind: SeriesKind,
    pub axis: YAxis,
    /// Wavelength in µm.
    pub x: Vec<f64>,
    /// Same length as `x`.
    pub y: Vec<f64>,
    pub style: SeriesStyle,
}

// ---------------------------------------------------------------------------
// Plot layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisScale {
    Linear,
    Log,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisSide {
    Left,
    Right,
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub title: String,
    pub scale: AxisScale,
    pub side: AxisSide,
    /// Shares the plotting area of the primary axis instead of stacking.
    pub overlaying: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotLayout {
    pub title: String,
    pub x_axis: AxisConfig,
    pub y_axis: AxisConfig,
    pub y2_axis: AxisConfig,
    pub height: f32,
}

impl Default for PlotLayout {
    fn default() -> Self {
        PlotLayout {
            title: "Transmission Profiles".to_string(),
            x_axis: AxisConfig {
                title: "Wavelength".to_string(),
                scale: AxisScale::Log,
                side: AxisSide::Bottom,
                overlaying: false,
            },
            y_axis: AxisConfig {
                title: "Transmission".to_string(),
                scale: AxisScale::Linear,
                side: AxisSide::Left,
                overlaying: false,
            },
            y2_axis: AxisConfig {
                title: "Intensity".to_string(),
                scale: AxisScale::Log,
                side: AxisSide::Right,
                overlaying: true,
            },
            height: 600.0,
        }
    }
}

// ---------------------------------------------------------------------------
// PlotDescription – the state handed to the renderer
// ---------------------------------------------------------------------------

/// Declarative plot: ordered series (spectra, then line markers, then
/// filter curves) plus axis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDescription {
    pub data: Vec<Series>,
    pub layout: PlotLayout,
}

impl PlotDescription {
    /// Iterate the series of one kind, in draw order.
    pub fn series_of(&self, kind: SeriesKind) -> impl Iterator<Item = &Series> {
        self.data.iter().filter(move |s| s.kind == kind)
    }

    pub fn count(&self, kind: SeriesKind) -> usize {
        self.series_of(kind).count()
    }
}

// ---------------------------------------------------------------------------
// Reference data – loaded once, read by every update
// ---------------------------------------------------------------------------

/// Which instrument mode a filter curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instrument {
    /// MIRI Medium Resolution Spectrometer sub-band (photon conversion efficiency).
    MrsSubBand,
    MiriImaging,
    NircamImaging,
}

/// Static transmission curve, immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCurve {
    pub name: String,
    pub instrument: Instrument,
    /// µm.
    pub wavelength: Vec<f64>,
    pub efficiency: Vec<f64>,
    pub style: SeriesStyle,
}

impl FilterCurve {
    pub fn to_series(&self) -> Series {
        Series {
            name: self.name.clone(),
            kind: SeriesKind::Filter,
            axis: YAxis::Primary,
            x: self.wavelength.clone(),
            y: self.efficiency.clone(),
            style: self.style.clone(),
        }
    }
}

/// A reference galaxy spectrum stored in its rest frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxySpectrum {
    pub name: String,
    /// Redshift that was removed from the source wavelengths at load time.
    pub catalog_redshift: f64,
    /// Rest-frame wavelength in µm.
    pub rest_wavelength: Vec<f64>,
    pub flux: Vec<f64>,
}

/// One catalogued spectral line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineEntry {
    #[serde(rename = "Species")]
    pub species: String,
    /// Rest wavelength in µm.
    #[serde(rename = "Wavelength")]
    pub wavelength: f64,
}

/// Line list in file order. Species repeat: one species, many lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineCatalog {
    entries: Vec<LineEntry>,
}

impl LineCatalog {
    pub fn new(entries: Vec<LineEntry>) -> Self {
        LineCatalog { entries }
    }

    /// Rest wavelengths of every line of `species`.
    pub fn wavelengths_for<'a>(&'a self, species: &'a str) -> impl Iterator<Item = f64> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.species == species)
            .map(|e| e.wavelength)
    }

    /// Distinct species names in order of first appearance.
    pub fn species(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.entries
            .iter()
            .filter(|e| seen.insert(e.species.as_str()))
            .map(|e| e.species.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything the update cycle reads. Built once by the loader and shared
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceData {
    /// Plotted in this order at the head of every description.
    pub galaxies: Vec<GalaxySpectrum>,
    pub filters: Vec<FilterCurve>,
    pub catalog: LineCatalog,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(species: &str, wavelength: f64) -> LineEntry {
        LineEntry {
            species: species.to_string(),
            wavelength,
        }
    }

    #[test]
    fn species_keeps_first_appearance_order() {
        let catalog = LineCatalog::new(vec![
            entry("H2", 9.66),
            entry("[NeII]", 12.81),
            entry("H2", 12.28),
            entry("[ArII]", 6.98),
            entry("[NeII]", 12.82),
        ]);
        assert_eq!(catalog.species(), vec!["H2", "[NeII]", "[ArII]"]);
    }

    #[test]
    fn wavelengths_for_filters_by_exact_species() {
        let catalog = LineCatalog::new(vec![
            entry("H2", 9.66),
            entry("H2O", 5.0),
            entry("H2", 12.28),
        ]);
        let w: Vec<f64> = catalog.wavelengths_for("H2").collect();
        assert_eq!(w, vec![9.66, 12.28]);
        assert_eq!(catalog.wavelengths_for("CO").count(), 0);
    }

    #[test]
    fn rgba_uses_css_alpha() {
        let c = Rgba::new(178, 34, 34, 0.5);
        assert_eq!(c.0, [178, 34, 34, 128]);
        assert_eq!(c.to_string(), "rgba(178, 34, 34, 0.50)");
    }

    #[test]
    fn default_layout_overlays_log_intensity_on_the_right() {
        let layout = PlotLayout::default();
        assert_eq!(layout.x_axis.scale, AxisScale::Log);
        assert_eq!(layout.y_axis.scale, AxisScale::Linear);
        assert_eq!(layout.y2_axis.scale, AxisScale::Log);
        assert_eq!(layout.y2_axis.side, AxisSide::Right);
        assert!(layout.y2_axis.overlaying);
    }
}
