use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{AxisHints, GridMark, HPlacement, Legend, Line, Plot, PlotPoint, PlotPoints};

use crate::color::{SPECTRUM_COLORS, to_color32};
use crate::data::model::{AxisScale, PlotDescription, Series, SeriesKind, YAxis};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Axis transforms
// ---------------------------------------------------------------------------

/// Plot-space coordinate for a data value on an axis of `scale`.
/// Non-positive values have no place on a log axis.
fn to_axis(scale: AxisScale, v: f64) -> Option<f64> {
    match scale {
        AxisScale::Linear => v.is_finite().then_some(v),
        AxisScale::Log => (v.is_finite() && v > 0.0).then(|| v.log10()),
    }
}

fn from_axis(scale: AxisScale, p: f64) -> f64 {
    match scale {
        AxisScale::Linear => p,
        AxisScale::Log => 10f64.powf(p),
    }
}

/// Maps the secondary (intensity) axis onto the primary's `0..=1` band so
/// both share one plotting area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondaryAxisMap {
    scale: AxisScale,
    /// Axis-space bounds (log10 of the data for a log axis).
    lo: f64,
    hi: f64,
}

impl SecondaryAxisMap {
    /// Fit the range of every secondary-axis value in `plot`.
    pub fn fit(plot: &PlotDescription) -> Self {
        let scale = plot.layout.y2_axis.scale;
        let (lo, hi) = plot
            .data
            .iter()
            .filter(|s| s.axis == YAxis::Secondary)
            .flat_map(|s| s.y.iter())
            .filter_map(|&v| to_axis(scale, v))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p), hi.max(p))
            });

        let (lo, hi) = if lo.is_finite() && hi.is_finite() {
            (lo, hi)
        } else {
            (0.0, 1.0)
        };
        let (lo, hi) = if hi - lo < f64::EPSILON {
            (lo - 0.5, hi + 0.5)
        } else {
            (lo, hi)
        };
        SecondaryAxisMap { scale, lo, hi }
    }

    /// Primary-axis position of a secondary value, or None when the value
    /// cannot sit on the axis.
    pub fn to_primary(&self, v: f64) -> Option<f64> {
        to_axis(self.scale, v).map(|p| (p - self.lo) / (self.hi - self.lo))
    }

    pub fn from_primary(&self, y: f64) -> f64 {
        from_axis(self.scale, self.lo + y * (self.hi - self.lo))
    }
}

/// Tick label for a value shown in data units.
fn format_tick(v: f64) -> String {
    if v == 0.0 {
        "0".to_string()
    } else if v.abs() >= 1e4 || v.abs() < 1e-3 {
        format!("{v:.1e}")
    } else {
        let s = format!("{v:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Plot-space polylines of one series. A point that cannot be placed on
/// its axes ends the current segment, so the line breaks there instead of
/// bridging the gap. Line markers are the exception on the y axis: their
/// zero anchor sits at the axis bottom.
pub fn series_segments(
    series: &Series,
    x_scale: AxisScale,
    secondary: &SecondaryAxisMap,
) -> Vec<Vec<[f64; 2]>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();

    for (&x, &y) in series.x.iter().zip(&series.y) {
        let py = match series.axis {
            YAxis::Primary => Some(y),
            YAxis::Secondary if series.kind == SeriesKind::LineMarker => {
                Some(secondary.to_primary(y).unwrap_or(0.0))
            }
            YAxis::Secondary => secondary.to_primary(y),
        };
        match (to_axis(x_scale, x), py) {
            (Some(px), Some(py)) => current.push([px, py]),
            _ => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

// ---------------------------------------------------------------------------
// Spectral plot (central panel)
// ---------------------------------------------------------------------------

/// Render the plot description in the central panel.
pub fn spectral_plot(ui: &mut Ui, state: &AppState) {
    let plot = match &state.plot {
        Some(p) => p,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a data directory to view filters  (File → Open data directory…)");
            });
            return;
        }
    };

    let layout = &plot.layout;
    let x_scale = layout.x_axis.scale;
    let secondary = SecondaryAxisMap::fit(plot);

    ui.heading(layout.title.as_str());

    let x_formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        format_tick(from_axis(x_scale, mark.value))
    };
    let y2_formatter = move |mark: GridMark, _range: &RangeInclusive<f64>| {
        format_tick(secondary.from_primary(mark.value))
    };
    let y_axes = vec![
        AxisHints::new_y()
            .label(layout.y_axis.title.as_str())
            .placement(HPlacement::Left),
        AxisHints::new_y()
            .label(layout.y2_axis.title.as_str())
            .placement(HPlacement::Right)
            .formatter(y2_formatter),
    ];

    Plot::new("spectral_plot")
        .legend(Legend::default())
        .height(layout.height.min(ui.available_height()))
        .x_axis_label(format!("{} (µm)", layout.x_axis.title))
        .x_axis_formatter(x_formatter)
        .custom_y_axes(y_axes)
        .label_formatter(move |name, value: &PlotPoint| {
            let w = from_axis(x_scale, value.x);
            if name.is_empty() {
                format!("λ = {} µm", format_tick(w))
            } else {
                format!("{name}\nλ = {} µm", format_tick(w))
            }
        })
        .include_y(0.0)
        .include_y(1.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let mut spectrum_idx = 0;
            for series in &plot.data {
                let color = series.style.color.map(to_color32).unwrap_or_else(|| {
                    match series.kind {
                        SeriesKind::Spectrum => {
                            SPECTRUM_COLORS[spectrum_idx % SPECTRUM_COLORS.len()]
                        }
                        _ => Color32::LIGHT_BLUE,
                    }
                });
                if series.kind == SeriesKind::Spectrum {
                    spectrum_idx += 1;
                }

                // Items sharing a name share one legend entry, which is how
                // legend groups, hidden legend entries and the segments of a
                // broken line collapse.
                for segment in series_segments(series, x_scale, &secondary) {
                    let mut line = Line::new(PlotPoints::from(segment))
                        .name(&series.name)
                        .color(color)
                        .width(1.5);
                    if series.style.fill_to_zero {
                        line = line.fill(0.0);
                    }
                    plot_ui.line(line);
                }
            }
        });
}
