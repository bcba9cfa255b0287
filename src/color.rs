use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Rgba;

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

/// MRS sub-band fills by channel position: Short, Medium, Long.
pub const MRS_SUBBAND_COLORS: [Rgba; 3] = [
    Rgba([94, 79, 162, 128]),
    Rgba([171, 221, 164, 128]),
    Rgba([255, 153, 153, 128]),
];

/// Spectra without an explicit colour.
pub const SPECTRUM_COLORS: [Color32; 2] = [
    Color32::from_rgb(31, 119, 180),
    Color32::from_rgb(255, 127, 14),
];

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize, alpha: f32) -> Vec<Rgba> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgba::new(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
                alpha,
            )
        })
        .collect()
}

pub fn to_color32(c: Rgba) -> Color32 {
    let [r, g, b, a] = c.0;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_size_and_distinct_colours() {
        let p = generate_palette(15, 0.5);
        assert_eq!(p.len(), 15);
        for (i, a) in p.iter().enumerate() {
            assert_eq!(a.0[3], 128);
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0, 1.0).is_empty());
    }

    #[test]
    fn conversion_keeps_straight_alpha() {
        let c = to_color32(Rgba([255, 0, 0, 255]));
        assert_eq!(c, Color32::from_rgb(255, 0, 0));
    }
}
