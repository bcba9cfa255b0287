use std::collections::BTreeSet;

use super::lines::generate_lines;
use super::model::{
    GalaxySpectrum, PlotDescription, PlotLayout, ReferenceData, Series, SeriesKind, SeriesStyle,
    YAxis,
};
use super::redshift::{Redshift, shift};

// ---------------------------------------------------------------------------
// Building and updating the plot description
// ---------------------------------------------------------------------------

fn galaxy_series(galaxy: &GalaxySpectrum, redshift: Redshift) -> Series {
    Series {
        name: galaxy.name.clone(),
        kind: SeriesKind::Spectrum,
        axis: YAxis::Secondary,
        x: shift(&galaxy.rest_wavelength, redshift),
        y: galaxy.flux.clone(),
        style: SeriesStyle {
            show_legend: true,
            ..SeriesStyle::default()
        },
    }
}

impl PlotDescription {
    /// Rest-frame spectra, no line markers, every filter curve.
    pub fn initial(reference: &ReferenceData) -> Self {
        let data = reference
            .galaxies
            .iter()
            .map(|g| galaxy_series(g, Redshift::ZERO))
            .chain(reference.filters.iter().map(|f| f.to_series()))
            .collect();
        PlotDescription {
            data,
            layout: PlotLayout::default(),
        }
    }
}

/// One update cycle.
///
/// Consumes the previous description and returns the next one:
/// * galaxy spectra keep their position, name and style; x/y are recomputed
///   from the rest-frame reference data at `redshift`
/// * every line marker is dropped and regenerated for `selected`
/// * filter curves are carried over untouched
///
/// The result is ordered spectra, line markers, filter curves. Calling it
/// again with the same inputs returns an equal description.
pub fn update(
    current: PlotDescription,
    reference: &ReferenceData,
    redshift: Redshift,
    selected: &BTreeSet<String>,
) -> PlotDescription {
    let PlotDescription { data, layout } = current;

    let mut spectra = Vec::with_capacity(reference.galaxies.len());
    let mut filters = Vec::with_capacity(data.len());
    for series in data {
        match series.kind {
            SeriesKind::Spectrum => spectra.push(series),
            SeriesKind::Filter => filters.push(series),
            SeriesKind::LineMarker => {}
        }
    }

    if spectra.len() == reference.galaxies.len() {
        for (series, galaxy) in spectra.iter_mut().zip(&reference.galaxies) {
            series.x = shift(&galaxy.rest_wavelength, redshift);
            series.y.clone_from(&galaxy.flux);
        }
    } else {
        log::warn!(
            "plot carries {} spectra for {} reference galaxies; rebuilding them",
            spectra.len(),
            reference.galaxies.len()
        );
        spectra = reference
            .galaxies
            .iter()
            .map(|g| galaxy_series(g, redshift))
            .collect();
    }

    let markers: Vec<Series> = selected
        .iter()
        .flat_map(|species| generate_lines(&reference.catalog, species, redshift))
        .collect();

    log::debug!(
        "update z={redshift}: {} spectra, {} line markers, {} filters",
        spectra.len(),
        markers.len(),
        filters.len()
    );

    let mut data = spectra;
    data.extend(markers);
    data.extend(filters);
    PlotDescription { data, layout }
}
