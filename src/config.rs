use std::path::{Path, PathBuf};

use clap::Parser;

// ---------------------------------------------------------------------------
// Command line / environment
// ---------------------------------------------------------------------------

/// JWST imager & IFU filter viewer.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Args {
    /// Directory holding the filter tables, galaxy spectra and line list.
    #[arg(long, env = "JWST_VIEWER_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Initial redshift.
    #[arg(long, default_value = "0")]
    pub redshift: String,

    /// Species whose lines are shown at startup (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub species: Vec<String>,

    /// Write the plot description as JSON to this file and exit instead of
    /// opening a window.
    #[arg(long, value_name = "FILE")]
    pub export: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Data directory layout
// ---------------------------------------------------------------------------

/// A reference galaxy: display name, file stem, and the redshift to remove
/// so the spectrum is stored in its rest frame.
#[derive(Debug, Clone, PartialEq)]
pub struct GalaxySource {
    pub name: String,
    pub stem: String,
    pub catalog_redshift: f64,
}

/// File names relative to the data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLayout {
    pub mrs_pce: PathBuf,
    pub imaging_dir: PathBuf,
    pub miri_bands: Vec<String>,
    pub nircam_bands: Vec<String>,
    pub galaxies: Vec<GalaxySource>,
    pub line_list: PathBuf,
}

impl Default for DataLayout {
    fn default() -> Self {
        let bands = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        DataLayout {
            mrs_pce: PathBuf::from("JWST_filter/IFU/MRS_photon_conversion_efficiency.xlsx"),
            imaging_dir: PathBuf::from("JWST_filter/image"),
            miri_bands: bands(&[
                "F560W", "F770W", "F1000W", "F1130W", "F1280W", "F1500W", "F1800W", "F2100W",
                "F2550W",
            ]),
            nircam_bands: bands(&["F150W", "F200W", "F300M", "F335M", "F360M", "F444W"]),
            galaxies: vec![
                GalaxySource {
                    name: "NGC7469".to_string(),
                    stem: "NGC7469_sum_sf_spec".to_string(),
                    catalog_redshift: 0.0163,
                },
                GalaxySource {
                    name: "VV114".to_string(),
                    stem: "VV114_spec".to_string(),
                    catalog_redshift: 0.0,
                },
            ],
            line_list: PathBuf::from("line_list_gt3um.csv"),
        }
    }
}

impl DataLayout {
    pub fn miri_file(&self, root: &Path, band: &str) -> PathBuf {
        root.join(&self.imaging_dir)
            .join(format!("JWST_MIRI.{band}.dat"))
    }

    pub fn nircam_file(&self, root: &Path, band: &str) -> PathBuf {
        root.join(&self.imaging_dir)
            .join(format!("JWST_NIRCam.{band}.dat"))
    }

    /// The PCE workbook, falling back to a `.csv` export beside it when only
    /// that exists.
    pub fn mrs_pce_file(&self, root: &Path) -> PathBuf {
        let workbook = root.join(&self.mrs_pce);
        if workbook.exists() {
            return workbook;
        }
        let csv = workbook.with_extension("csv");
        if csv.exists() { csv } else { workbook }
    }

    /// `<stem>.csv`, falling back to `<stem>.parquet` when only that exists.
    pub fn galaxy_file(&self, root: &Path, source: &GalaxySource) -> PathBuf {
        let csv = root.join(format!("{}.csv", source.stem));
        if csv.exists() {
            return csv;
        }
        let parquet = root.join(format!("{}.parquet", source.stem));
        if parquet.exists() { parquet } else { csv }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_species_list_and_export() {
        let args = Args::try_parse_from([
            "jwst-filter-viewer",
            "--data-dir",
            "/data",
            "--redshift",
            "0.02",
            "--species",
            "H2,[NeII]",
            "--export",
            "plot.json",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/data"));
        assert_eq!(args.redshift, "0.02");
        assert_eq!(args.species, vec!["H2", "[NeII]"]);
        assert_eq!(args.export, Some(PathBuf::from("plot.json")));
    }

    #[test]
    fn defaults_to_zero_redshift_and_no_species() {
        let args = Args::try_parse_from(["jwst-filter-viewer"]).unwrap();
        assert_eq!(args.redshift, "0");
        assert!(args.species.is_empty());
        assert!(args.export.is_none());
    }

    #[test]
    fn pce_file_prefers_workbook_then_csv() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::default();
        let ifu = dir.path().join("JWST_filter/IFU");
        let workbook = ifu.join("MRS_photon_conversion_efficiency.xlsx");

        assert_eq!(layout.mrs_pce_file(dir.path()), workbook);

        std::fs::create_dir_all(&ifu).unwrap();
        std::fs::write(ifu.join("MRS_photon_conversion_efficiency.csv"), b"").unwrap();
        assert_eq!(
            layout.mrs_pce_file(dir.path()),
            ifu.join("MRS_photon_conversion_efficiency.csv")
        );

        std::fs::write(&workbook, b"").unwrap();
        assert_eq!(layout.mrs_pce_file(dir.path()), workbook);
    }

    #[test]
    fn galaxy_file_prefers_csv_then_parquet() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::default();
        let source = &layout.galaxies[1];

        assert_eq!(
            layout.galaxy_file(dir.path(), source),
            dir.path().join("VV114_spec.csv")
        );

        std::fs::write(dir.path().join("VV114_spec.parquet"), b"").unwrap();
        assert_eq!(
            layout.galaxy_file(dir.path(), source),
            dir.path().join("VV114_spec.parquet")
        );

        std::fs::write(dir.path().join("VV114_spec.csv"), b"w,f\n").unwrap();
        assert_eq!(
            layout.galaxy_file(dir.path(), source),
            dir.path().join("VV114_spec.csv")
        );
    }
}
