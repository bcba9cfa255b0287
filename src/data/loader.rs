use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, Float32Array, Float64Array};
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{
    FilterCurve, GalaxySpectrum, Instrument, LineCatalog, LineEntry, ReferenceData, SeriesStyle,
};
use super::redshift::rest_frame;
use crate::color::{MRS_SUBBAND_COLORS, generate_palette};
use crate::config::DataLayout;

/// MRS sub-band names by position within a channel.
const SUB_CHANNEL_NAMES: [&str; 3] = ["Short", "Medium", "Long"];

/// Ångström → µm.
const ANGSTROM_PER_MICRON: f64 = 10_000.0;

/// Imaging responses are drawn at this fraction so they sit below the MRS curves.
const IMAGING_RESPONSE_SCALE: f64 = 2.0 / 5.0;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load every reference table below `root`. Any missing or malformed file
/// fails the whole load.
pub fn load_reference_data(root: &Path, layout: &DataLayout) -> Result<ReferenceData> {
    let mut filters = load_mrs_subbands(&layout.mrs_pce_file(root))?;

    let imaging: Vec<(Instrument, &String)> = layout
        .miri_bands
        .iter()
        .map(|b| (Instrument::MiriImaging, b))
        .chain(layout.nircam_bands.iter().map(|b| (Instrument::NircamImaging, b)))
        .collect();
    let palette = generate_palette(imaging.len(), 0.5);

    for ((instrument, band), color) in imaging.into_iter().zip(palette) {
        let path = match instrument {
            Instrument::NircamImaging => layout.nircam_file(root, band),
            _ => layout.miri_file(root, band),
        };
        let (wavelength, efficiency) = load_imaging_response(&path)?;
        filters.push(FilterCurve {
            name: band.clone(),
            instrument,
            wavelength,
            efficiency,
            style: SeriesStyle {
                color: Some(color),
                fill_to_zero: true,
                legend_group: None,
                show_legend: true,
            },
        });
    }

    let galaxies = layout
        .galaxies
        .iter()
        .map(|source| {
            let path = layout.galaxy_file(root, source);
            let (observed, flux) = load_spectrum_table(&path)
                .with_context(|| format!("loading {} spectrum", source.name))?;
            Ok(GalaxySpectrum {
                name: source.name.clone(),
                catalog_redshift: source.catalog_redshift,
                rest_wavelength: rest_frame(&observed, source.catalog_redshift),
                flux,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let catalog = load_line_catalog(&root.join(&layout.line_list))?;

    log::info!(
        "Loaded {} filter curves, {} galaxy spectra, {} catalog lines ({} species) from {}",
        filters.len(),
        galaxies.len(),
        catalog.len(),
        catalog.species().len(),
        root.display()
    );

    Ok(ReferenceData {
        galaxies,
        filters,
        catalog,
    })
}

// ---------------------------------------------------------------------------
// MRS photon conversion efficiency
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PceRow {
    #[serde(rename = "Sub-band")]
    sub_band: u32,
    #[serde(rename = "Wavelength")]
    wavelength: f64,
    #[serde(rename = "PCE")]
    pce: f64,
}

const PCE_COLUMNS: [&str; 3] = ["Sub-band", "Wavelength", "PCE"];

/// Table with `Sub-band`, `Wavelength` (µm) and `PCE` columns; one curve per
/// sub-band in ascending sub-band order.  Dispatch by extension.
///
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`                            – header row
pub fn load_mrs_subbands(path: &Path) -> Result<Vec<FilterCurve>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => read_pce_workbook(path)?,
        "csv" => read_pce_csv(path)?,
        other => bail!("Unsupported PCE table extension: .{other}"),
    };

    let mut bands: BTreeMap<u32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for row in rows {
        let (w, e) = bands.entry(row.sub_band).or_default();
        w.push(row.wavelength);
        e.push(row.pce);
    }

    if bands.is_empty() {
        bail!("{}: no sub-band rows", path.display());
    }

    Ok(bands
        .into_iter()
        .map(|(sub_band, (wavelength, efficiency))| {
            let c = (sub_band % 3) as usize;
            FilterCurve {
                name: SUB_CHANNEL_NAMES[c].to_string(),
                instrument: Instrument::MrsSubBand,
                wavelength,
                efficiency,
                style: SeriesStyle {
                    color: Some(MRS_SUBBAND_COLORS[c]),
                    fill_to_zero: true,
                    legend_group: Some(format!("group{c}")),
                    // One legend entry per colour group.
                    show_legend: sub_band < 3,
                },
            }
        })
        .collect())
}

fn read_pce_csv(path: &Path) -> Result<Vec<PceRow>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    reader
        .deserialize::<PceRow>()
        .enumerate()
        .map(|(row_no, r)| r.with_context(|| format!("{} row {row_no}", path.display())))
        .collect()
}

fn read_pce_workbook(path: &Path) -> Result<Vec<PceRow>> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| anyhow::anyhow!("opening {}: {e}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .with_context(|| format!("{}: workbook has no worksheets", path.display()))?
        .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .with_context(|| format!("{}: worksheet is empty", path.display()))?;
    let column = |name: &str| {
        header
            .iter()
            .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
            .with_context(|| format!("{}: missing '{name}' column", path.display()))
    };
    let [sub_col, w_col, pce_col] = [
        column(PCE_COLUMNS[0])?,
        column(PCE_COLUMNS[1])?,
        column(PCE_COLUMNS[2])?,
    ];

    let mut out = Vec::new();
    // Row numbers as shown in the spreadsheet; the header is row 1.
    for (row_no, row) in rows.enumerate().map(|(i, r)| (i + 2, r)) {
        if row.iter().all(|cell| matches!(cell, Data::Empty)) {
            continue;
        }
        let cell = |col: usize| {
            let value = row.get(col).unwrap_or(&Data::Empty);
            cell_f64(value).with_context(|| {
                format!(
                    "{} row {row_no}, column '{}'",
                    path.display(),
                    header.get(col).map(|h| h.to_string()).unwrap_or_default()
                )
            })
        };
        let sub_band = cell(sub_col)?;
        if sub_band < 0.0 || sub_band.fract() != 0.0 || sub_band > u32::MAX as f64 {
            bail!(
                "{} row {row_no}: sub-band {sub_band} is not a non-negative integer",
                path.display()
            );
        }
        out.push(PceRow {
            sub_band: sub_band as u32,
            wavelength: cell(w_col)?,
            pce: cell(pce_col)?,
        });
    }
    Ok(out)
}

/// Numeric value of a worksheet cell. Text cells are parsed as numbers.
fn cell_f64(cell: &Data) -> Result<f64> {
    match cell {
        Data::Float(v) => Ok(*v),
        Data::Int(v) => Ok(*v as f64),
        Data::String(s) => s
            .trim()
            .parse()
            .with_context(|| format!("'{s}' is not a number")),
        Data::Empty => bail!("cell is empty"),
        other => bail!("unexpected cell value {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Imaging filter response (.dat)
// ---------------------------------------------------------------------------

/// Two whitespace-separated columns, wavelength in Å and response. Returns
/// wavelength in µm and the response scaled for display.
pub fn load_imaging_response(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut wavelength = Vec::new();
    let mut response = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut cols = line.split_whitespace();
        let (Some(w), Some(r)) = (cols.next(), cols.next()) else {
            bail!("{} line {}: expected two columns", path.display(), line_no + 1);
        };
        let w: f64 = w.parse().with_context(|| {
            format!("{} line {}: '{w}' is not a number", path.display(), line_no + 1)
        })?;
        let r: f64 = r.parse().with_context(|| {
            format!("{} line {}: '{r}' is not a number", path.display(), line_no + 1)
        })?;
        wavelength.push(w / ANGSTROM_PER_MICRON);
        response.push(r * IMAGING_RESPONSE_SCALE);
    }

    if wavelength.is_empty() {
        bail!("{}: no data rows", path.display());
    }
    Ok((wavelength, response))
}

// ---------------------------------------------------------------------------
// Galaxy spectra (w, f)
// ---------------------------------------------------------------------------

/// Load a `w`/`f` table.  Dispatch by extension.
///
/// * `.csv`     – header row with `w` and `f` columns
/// * `.parquet` – Float64 or Float32 columns `w` and `f`
pub fn load_spectrum_table(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let (w, f) = match ext.as_str() {
        "csv" => load_spectrum_csv(path)?,
        "parquet" | "pq" => load_spectrum_parquet(path)?,
        other => bail!("Unsupported spectrum file extension: .{other}"),
    };
    if w.is_empty() {
        bail!("{}: spectrum has no rows", path.display());
    }
    Ok((w, f))
}

#[derive(Debug, Deserialize)]
struct SpectrumRow {
    w: f64,
    f: f64,
}

fn load_spectrum_csv(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let mut w = Vec::new();
    let mut f = Vec::new();
    for (row_no, result) in reader.deserialize::<SpectrumRow>().enumerate() {
        let row = result.with_context(|| format!("{} row {row_no}", path.display()))?;
        w.push(row.w);
        f.push(row.f);
    }
    Ok((w, f))
}

fn load_spectrum_parquet(path: &Path) -> Result<(Vec<f64>, Vec<f64>)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut w = Vec::new();
    let mut f = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let w_idx = schema
            .index_of("w")
            .map_err(|_| anyhow::anyhow!("{}: missing 'w' column", path.display()))?;
        let f_idx = schema
            .index_of("f")
            .map_err(|_| anyhow::anyhow!("{}: missing 'f' column", path.display()))?;

        w.extend(extract_f64_column(batch.column(w_idx)).context("reading 'w'")?);
        f.extend(extract_f64_column(batch.column(f_idx)).context("reading 'f'")?);
    }
    Ok((w, f))
}

/// Float64 or Float32 column as `f64`, nulls as NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f32::NAN) as f64).collect())
    } else {
        bail!("column type is {:?}, expected Float64 or Float32", col.data_type())
    }
}

// ---------------------------------------------------------------------------
// Line catalog
// ---------------------------------------------------------------------------

/// CSV with `Species` and `Wavelength` (µm) columns; extra columns are ignored.
pub fn load_line_catalog(path: &Path) -> Result<LineCatalog> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let entries = reader
        .deserialize::<LineEntry>()
        .enumerate()
        .map(|(row_no, r)| r.with_context(|| format!("{} row {row_no}", path.display())))
        .collect::<Result<Vec<_>>>()?;

    Ok(LineCatalog::new(entries))
}
