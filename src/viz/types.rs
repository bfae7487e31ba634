//! Public configuration types for the visualization module.

use super::options::PlotOptions;
use crate::models::AxisSelector;
use crate::projection::Projection;
use std::path::PathBuf;

/// Pixels per inch used to turn a figure size into a canvas size.
pub const DPI: f64 = 100.0;

/// Default header item keys used when the caller gives no explicit text.
pub const DEFAULT_TITLE_KEY: &str = "title";
pub const DEFAULT_CAPTION_KEY: &str = "summary";
pub const DEFAULT_LABEL_KEY: &str = "id";
/// Header item naming the site, written next to its marker on the map.
pub const DEFAULT_SITE_KEY: &str = "site";

/// Degrees added around the sites when computing the map extent.
pub const DEFAULT_EXTENT_OFFSET_DEG: f64 = 5.0;

/// Figure size in inches, as `width height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigSize {
    pub width: f64,
    pub height: f64,
}

impl FigSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Default size for a layout: wide for plot + map, square for map only.
    pub fn default_for(mode: MapMode) -> Self {
        match mode {
            MapMode::Off => Self::new(6.4, 4.8),
            MapMode::Beside => Self::new(12.8, 6.4),
            MapMode::OnMap => Self::new(6.4, 6.4),
        }
    }

    /// Canvas size in pixels, never smaller than 64 px on a side.
    pub fn pixels(&self) -> (u32, u32) {
        let px = |inches: f64| ((inches * DPI).round().max(64.0)) as u32;
        (px(self.width), px(self.height))
    }
}

/// How the map relates to the data plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// Data plot only; site coordinates are not needed.
    Off,
    /// Data plot on the left, site map on the right.
    #[default]
    Beside,
    /// Single map pane with each series drawn at its site.
    OnMap,
}

/// Options for the data plot. All fields are optional and independent.
#[derive(Debug, Clone, Default)]
pub struct PlotConfig {
    pub x: Option<AxisSelector>,
    pub y: Option<AxisSelector>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
    pub invert_x: bool,
    pub invert_y: bool,
    pub title: Option<String>,
    pub caption: Option<String>,
    /// Header key whose value labels each series in the legend.
    pub label_key: Option<String>,
    pub figsize: Option<FigSize>,
    pub style: PlotOptions,
}

/// Options for the map pane.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub projection: Projection,
    pub mode: MapMode,
    pub background_image: Option<PathBuf>,
    pub extent_offset: f64,
    /// Relative widths of the data pane and the map pane in `MapMode::Beside`.
    pub width_ratios: [u32; 2],
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            mode: MapMode::default(),
            background_image: None,
            extent_offset: DEFAULT_EXTENT_OFFSET_DEG,
            width_ratios: [1, 1],
        }
    }
}

impl MapConfig {
    pub fn requires_coordinates(&self) -> bool {
        self.mode != MapMode::Off
    }
}
