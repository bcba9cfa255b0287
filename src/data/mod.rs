/// Data layer: reference tables, redshift transform, plot description.
///
/// Architecture:
/// ```text
///  .csv / .dat / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → ReferenceData (rest-frame spectra,
///   └──────────┘                  filter curves, line catalog)
///        │
///        ▼
///   ┌────────────┐   redshift, selected species
///   │ plot_state  │◄──────────────────────────── UI
///   └────────────┘
///     │       │
///     │       ▼
///     │   ┌────────┐
///     │   │ lines   │  catalog entries → vertical marker series
///     │   └────────┘
///     ▼
///   PlotDescription  spectra ++ line markers ++ filter curves
/// ```

pub mod lines;
pub mod loader;
pub mod model;
pub mod plot_state;
pub mod redshift;
