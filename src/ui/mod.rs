/// Presentation layer: egui panels and the plot renderer.
pub mod panels;
pub mod plot;
