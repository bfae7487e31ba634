//! xcsv_plot_map
//!
//! Plot extended CSV (XCSV) data files and locate the data on a map, using the
//! `latitude`/`longitude` items of each file's metadata header. Pairs with the
//! `xcsv_plot_map` CLI.
//!
//! ### Features
//! - Read XCSV files: `# key: value (units)` header, CSV data table
//! - Line or scatter plots with matplotlib-style plot options
//! - A site map beside the plot, or the data drawn on the map itself
//! - Named map projections, coastline, graticule and optional background image
//! - SVG/PNG output, or an interactive window
//!
//! ### Example
//! ```no_run
//! use xcsv_plot_map::{MapConfig, PlotConfig, read_datasets, viz};
//!
//! let datasets = read_datasets(&["short-test-data-1.csv", "short-test-data-2.csv"])?;
//! let figure = viz::plot_datasets(&datasets, &PlotConfig::default(), &MapConfig::default())?;
//! figure.save("sites.svg")?;
//! # Ok::<(), xcsv_plot_map::Error>(())
//! ```

pub mod coastline;
pub mod error;
pub mod models;
pub mod projection;
pub mod viewer;
pub mod viz;
pub mod xcsv;

pub use error::{Error, Result};
pub use models::{AxisSelector, Column, ColumnKind, ColumnLabel, Dataset, HeaderValue};
pub use projection::Projection;
pub use viz::{FigSize, Figure, MapConfig, MapMode, PlotConfig, PlotOptions, plot_datasets};
pub use xcsv::read_datasets;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
