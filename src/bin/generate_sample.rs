//! Writes a synthetic data directory in the layout the viewer reads, so the
//! app can run without the real JWST throughput tables.
//!
//! Usage: `generate_sample [OUT_DIR]` (default `sample_data`).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Smooth top-hat between `lo` and `hi` with soft edges.
fn bandpass(x: f64, lo: f64, hi: f64, peak: f64) -> f64 {
    let edge = (hi - lo) * 0.08;
    let rise = 1.0 / (1.0 + (-(x - lo) / edge * 4.0).exp());
    let fall = 1.0 / (1.0 + ((x - hi) / edge * 4.0).exp());
    peak * rise * fall
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| lo + (hi - lo) * i as f64 / (n - 1) as f64)
        .collect()
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// MRS sub-band wavelength ranges (µm), 1A..4C.
const MRS_RANGES: [(f64, f64); 12] = [
    (4.90, 5.74),
    (5.66, 6.63),
    (6.53, 7.65),
    (7.51, 8.77),
    (8.67, 10.13),
    (10.02, 11.70),
    (11.55, 13.47),
    (13.34, 15.57),
    (15.41, 17.98),
    (17.70, 20.95),
    (20.69, 24.48),
    (24.19, 27.90),
];

const MIRI_BANDS: [&str; 9] = [
    "F560W", "F770W", "F1000W", "F1130W", "F1280W", "F1500W", "F1800W", "F2100W", "F2550W",
];
const NIRCAM_BANDS: [&str; 6] = ["F150W", "F200W", "F300M", "F335M", "F360M", "F444W"];

/// Emission features (µm, relative strength) for the synthetic galaxies.
const FEATURES: [(f64, f64); 6] = [
    (6.2, 1.5),
    (7.7, 3.0),
    (8.6, 1.0),
    (11.3, 2.0),
    (12.81, 0.8),
    (17.03, 0.4),
];

const LINES: [(&str, f64); 16] = [
    ("H2", 5.511),
    ("H2", 6.909),
    ("H2", 8.025),
    ("H2", 9.665),
    ("H2", 12.279),
    ("H2", 17.035),
    ("[NeII]", 12.814),
    ("[NeIII]", 15.555),
    ("[ArII]", 6.985),
    ("[ArIII]", 8.991),
    ("[SIV]", 10.511),
    ("[SIII]", 18.713),
    ("[FeII]", 5.340),
    ("[FeII]", 25.988),
    ("HI", 7.460),
    ("HI", 12.372),
];

/// Central wavelength (µm) and fractional width from a band name like `F770W`.
fn band_shape(name: &str) -> Result<(f64, f64)> {
    let digits: String = name.chars().filter(|c| c.is_ascii_digit()).collect();
    let code: f64 = digits
        .parse()
        .with_context(|| format!("band name {name} has no wavelength code"))?;
    let center = code / 100.0;
    let width = if name.ends_with('M') { 0.10 } else { 0.22 };
    Ok((center, width))
}

fn write_mrs(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating PCE table")?;
    writer.write_record(["Sub-band", "Wavelength", "PCE"])?;
    for (i, &(lo, hi)) in MRS_RANGES.iter().enumerate() {
        let peak = 0.28 - 0.015 * i as f64;
        for w in linspace(lo, hi, 120) {
            let pce = bandpass(w, lo + 0.05, hi - 0.05, peak);
            writer.write_record([i.to_string(), format!("{w:.5}"), format!("{pce:.5}")])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_imaging(path: &Path, name: &str, peak: f64) -> Result<()> {
    let (center, width) = band_shape(name)?;
    let lo = center * (1.0 - width / 2.0);
    let hi = center * (1.0 + width / 2.0);
    let mut file = fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    for w in linspace(lo * 0.85, hi * 1.15, 200) {
        // Files are in Ångström.
        writeln!(file, "{:.3} {:.6}", w * 10_000.0, bandpass(w, lo, hi, peak))?;
    }
    Ok(())
}

fn write_galaxy(path: &Path, z: f64, scale: f64, rng: &mut SimpleRng) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating spectrum")?;
    writer.write_record(["w", "f"])?;
    for rest in linspace(4.9, 27.9, 2000) {
        let continuum = 0.05 * (rest / 5.0).powf(1.8);
        let lines: f64 = FEATURES
            .iter()
            .map(|&(mu, amp)| gaussian(rest, mu, mu * 0.006, amp * 0.5))
            .sum();
        let flux = (scale * (continuum + lines) + rng.gauss(0.0, 0.005)).max(1e-4);
        writer.write_record([format!("{:.5}", rest * (1.0 + z)), format!("{flux:.6}")])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_lines(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating line list")?;
    writer.write_record(["Species", "Wavelength"])?;
    for (species, w) in LINES {
        writer.write_record([species.to_string(), w.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let out: PathBuf = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_data".to_string())
        .into();

    let ifu = out.join("JWST_filter/IFU");
    let image = out.join("JWST_filter/image");
    fs::create_dir_all(&ifu).context("creating IFU directory")?;
    fs::create_dir_all(&image).context("creating image directory")?;

    write_mrs(&ifu.join("MRS_photon_conversion_efficiency.csv"))?;
    for band in MIRI_BANDS {
        write_imaging(&image.join(format!("JWST_MIRI.{band}.dat")), band, 0.55)?;
    }
    for band in NIRCAM_BANDS {
        write_imaging(&image.join(format!("JWST_NIRCam.{band}.dat")), band, 0.45)?;
    }

    let mut rng = SimpleRng::new(42);
    write_galaxy(&out.join("NGC7469_sum_sf_spec.csv"), 0.0163, 1.0, &mut rng)?;
    write_galaxy(&out.join("VV114_spec.csv"), 0.0, 0.6, &mut rng)?;
    write_lines(&out.join("line_list_gt3um.csv"))?;

    println!(
        "Wrote {} MRS sub-bands, {} imaging filters, 2 spectra and {} lines to {}",
        MRS_RANGES.len(),
        MIRI_BANDS.len() + NIRCAM_BANDS.len(),
        LINES.len(),
        out.display()
    );
    Ok(())
}
