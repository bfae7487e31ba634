//! Visualization: render datasets as a data plot, a site map, or both, to **SVG** or a bitmap.
//!
//! - Distinct series colors (Microsoft Office palette)
//! - Layouts: plot only, plot beside a site map, data drawn on the map
//! - Named map projections with a coastline, a graticule and optional background image
//! - Matplotlib-style plot options (`marker`, `ls`, `lw`, `ms`, `color`, `alpha`)

pub mod base;
pub mod map;
pub mod options;
pub mod scene;
pub mod text;
pub mod types;
pub mod util;

pub use base::BasePlot;
pub use map::{Extent, MapPlot, project_site, site_extent};
pub use options::{LineKind, MarkerKind, PlotOptions, SeriesStyle};
pub use scene::{Scene, Series, Site, legend_label, site_of};
pub use types::{FigSize, MapConfig, MapMode, PlotConfig};

use crate::error::{Error, Result};
use crate::models::Dataset;
use image::DynamicImage;
use log::{debug, info};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;
use std::path::Path;
use std::sync::Once;
use text::wrap_text_to_width;

/// Something that can draw itself into a drawing area.
///
/// [`BasePlot`] draws the data pane; [`MapPlot`] wraps a `BasePlot` and adds the map.
pub trait Renderer {
    fn render<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()>;
}

/// One-time registration for a fallback "sans-serif" font when using the `ab_glyph` text path.
/// Required because `ab_glyph` doesn't discover OS fonts.
static INIT_FONTS: Once = Once::new();

fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        let _ = plotters::style::register_font(
            "sans-serif",
            plotters::style::FontStyle::Normal,
            include_bytes!("../../assets/DejaVuSans.ttf"),
        );
    });
}

const TITLE_FONT_PX: u32 = 20;
const TITLE_MARGIN_PX: u32 = 16;
/// Largest canvas side accepted, in pixels.
pub const MAX_SIDE_PX: u32 = 16_384;

/// A resolved, ready-to-draw figure.
#[derive(Debug, Clone)]
pub struct Figure {
    scene: Scene,
    map: MapConfig,
    size: FigSize,
    /// Decoded `map.background_image`, read once when the figure is built.
    background: Option<DynamicImage>,
}

/// Resolve axes, labels, sites and style for `datasets` and lay out the figure.
///
/// Every configuration and data error is reported here; drawing a returned
/// figure only fails on backend errors.
pub fn plot_datasets(datasets: &[Dataset], plot: &PlotConfig, map: &MapConfig) -> Result<Figure> {
    let scene = Scene::resolve(datasets, plot, map.requires_coordinates())?;
    let size = plot.figsize.unwrap_or_else(|| FigSize::default_for(map.mode));
    if !(size.width > 0.0 && size.height > 0.0) {
        return Err(Error::config(format!(
            "figure size must be positive, got {} x {}",
            size.width, size.height
        )));
    }
    let max_inches = f64::from(MAX_SIDE_PX) / types::DPI;
    if size.width > max_inches || size.height > max_inches {
        return Err(Error::config(format!(
            "figure size {} x {} in exceeds {MAX_SIDE_PX} px per side",
            size.width, size.height
        )));
    }
    let background = if map.requires_coordinates() {
        MapPlot::new(&scene, map, None)?;
        map.background_image
            .as_deref()
            .map(map::load_background)
            .transpose()?
    } else {
        None
    };
    debug!(
        "figure {}x{} in, {} series, map {:?}",
        size.width,
        size.height,
        scene.series.len(),
        map.mode
    );
    Ok(Figure {
        scene,
        map: map.clone(),
        size,
        background,
    })
}

impl Figure {
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn map_config(&self) -> &MapConfig {
        &self.map
    }

    pub fn size(&self) -> FigSize {
        self.size
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        self.size.pixels()
    }

    /// The map renderer, or `None` for a plot-only figure.
    pub fn map_plot(&self) -> Result<Option<MapPlot<'_>>> {
        if !self.map.requires_coordinates() {
            return Ok(None);
        }
        MapPlot::new(&self.scene, &self.map, self.background.as_ref()).map(Some)
    }

    /// Write the figure. `.svg` selects the SVG backend; any other extension is
    /// encoded as a bitmap by the image crate (`.png`, `.jpg`, `.bmp`).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        ensure_fonts_registered();
        let path = path.as_ref();
        let (w, h) = self.pixel_size();
        let is_svg = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
        if is_svg {
            let root = SVGBackend::new(path, (w, h)).into_drawing_area();
            self.draw(root)?;
        } else {
            let root = BitMapBackend::new(path, (w, h)).into_drawing_area();
            self.draw(root)?;
        }
        info!("wrote {}x{} figure to {}", w, h, path.display());
        Ok(())
    }

    /// Render into a packed RGB buffer of `pixel_size()`.
    pub fn render_rgb(&self) -> Result<Vec<u8>> {
        ensure_fonts_registered();
        let (w, h) = self.pixel_size();
        let mut buf = vec![0u8; w as usize * h as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buf, (w, h)).into_drawing_area();
            self.draw(root)?;
        }
        Ok(buf)
    }

    fn draw<DB: DrawingBackend>(&self, root: DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(Error::render)?;

        // ----------------------------
        // Title, wrapped to the figure width
        // ----------------------------
        let (w, _) = root.dim_in_pixel();
        let mut area = root.clone();
        for line in wrap_text_to_width(
            &self.scene.title,
            TITLE_FONT_PX,
            w.saturating_sub(2 * TITLE_MARGIN_PX),
        ) {
            area = area
                .titled(&line, (FontFamily::SansSerif, TITLE_FONT_PX))
                .map_err(Error::render)?;
        }

        // ----------------------------
        // Panes
        // ----------------------------
        match self.map_plot()? {
            Some(map) => map.render(&area)?,
            None => BasePlot::new(&self.scene).render(&area)?,
        }

        root.present().map_err(Error::render)?;
        Ok(())
    }
}
