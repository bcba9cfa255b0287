use super::model::{LineCatalog, Rgba, Series, SeriesKind, SeriesStyle, YAxis};
use super::redshift::Redshift;

/// Vertical extent of a line marker on the intensity axis. Display only.
pub const MARKER_Y_RANGE: [f64; 2] = [0.0, 6.0];

/// Firebrick at half opacity.
pub const MARKER_COLOR: Rgba = Rgba([178, 34, 34, 128]);

/// Legend name shared by every marker of a species.
pub fn marker_name(species: &str) -> String {
    format!("{species} line")
}

/// One vertical marker per catalog line of `species`, shifted to the
/// observed frame. Unknown species yield no markers.
pub fn generate_lines(catalog: &LineCatalog, species: &str, redshift: Redshift) -> Vec<Series> {
    let factor = redshift.factor();
    catalog
        .wavelengths_for(species)
        .map(|rest| {
            let x = rest * factor;
            Series {
                name: marker_name(species),
                kind: SeriesKind::LineMarker,
                axis: YAxis::Secondary,
                x: vec![x, x],
                y: MARKER_Y_RANGE.to_vec(),
                style: SeriesStyle {
                    color: Some(MARKER_COLOR),
                    fill_to_zero: false,
                    legend_group: None,
                    show_legend: true,
                },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::LineEntry;

    fn catalog() -> LineCatalog {
        let rows = [
            ("H2", 3.2),
            ("[NeII]", 12.81),
            ("H2", 4.5),
            ("[ArII]", 6.98),
            ("H2", 6.1),
        ];
        LineCatalog::new(
            rows.iter()
                .map(|&(s, w)| LineEntry {
                    species: s.to_string(),
                    wavelength: w,
                })
                .collect(),
        )
    }

    #[test]
    fn one_marker_per_matching_row() {
        let cat = catalog();
        let z = Redshift::new(0.01).unwrap();
        let lines = generate_lines(&cat, "H2", z);
        assert_eq!(lines.len(), 3);

        let expected = [3.232, 4.545, 6.161];
        for (series, want) in lines.iter().zip(expected) {
            assert_eq!(series.x.len(), 2);
            assert!((series.x[0] - want).abs() < 1e-9, "{} != {want}", series.x[0]);
            assert_eq!(series.x[0], series.x[1]);
            assert_eq!(series.y, vec![0.0, 6.0]);
            assert_eq!(series.kind, SeriesKind::LineMarker);
            assert_eq!(series.axis, YAxis::Secondary);
            assert!(series.name.contains("H2"));
        }
    }

    #[test]
    fn unknown_species_yields_nothing() {
        let cat = catalog();
        assert!(generate_lines(&cat, "CO", Redshift::ZERO).is_empty());
        assert!(generate_lines(&LineCatalog::default(), "H2", Redshift::ZERO).is_empty());
    }

    #[test]
    fn catalog_is_left_untouched() {
        let cat = catalog();
        let before = cat.clone();
        let _ = generate_lines(&cat, "H2", Redshift::new(2.0).unwrap());
        assert_eq!(cat, before);
    }

    #[test]
    fn zero_redshift_places_markers_at_rest_wavelength() {
        let lines = generate_lines(&catalog(), "[ArII]", Redshift::ZERO);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].x, vec![6.98, 6.98]);
        assert_eq!(lines[0].name, "[ArII] line");
    }
}
