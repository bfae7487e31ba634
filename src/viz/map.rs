//! The map pane: site extent, projected coastline and graticule, site markers
//! and, in [`MapMode::OnMap`], one inset data plot per site.

use super::Renderer;
use super::base::{BasePlot, Chart2d, draw_legend, draw_styled_series, x_tick_label};
use super::scene::{Scene, Site};
use super::text::{estimate_text_width_px, truncate_to_width};
use super::types::{MapConfig, MapMode};
use super::util::{AxisDirection, format_tick, graticule_step};
use crate::coastline::coastlines;
use crate::error::{Error, Result};
use crate::models::ColumnKind;
use crate::projection::Projection;
use image::DynamicImage;
use image::imageops::FilterType;
use log::debug;
use plotters::coord::Shift;
use plotters::element::BitMapElement;
use plotters::prelude::*;
use std::path::Path;

const MARGIN: u32 = 16;
const OCEAN: RGBColor = RGBColor(214, 230, 242);
const GRID: RGBColor = RGBColor(120, 120, 120);
const COAST: RGBColor = RGBColor(60, 60, 60);
/// Samples per extent edge when projecting the boundary or a graticule line.
const EDGE_SAMPLES: usize = 64;
/// Site names are written this many degrees south of the marker.
const SITE_LABEL_OFFSET_DEG: f64 = 0.5;
const INSET_WIDTH_FRAC: f64 = 0.25;
const INSET_HEIGHT_FRAC: f64 = 0.20;
const INSET_MARGIN: u32 = 4;
const INSET_FONT_PX: u32 = 10;

/// Geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Extent {
    /// `[left, right, bottom, top]`
    pub fn as_array(&self) -> [f64; 4] {
        [self.left, self.right, self.bottom, self.top]
    }

    fn boundary(&self) -> Vec<(f64, f64)> {
        let lerp = |a: f64, b: f64, i: usize| a + (b - a) * i as f64 / EDGE_SAMPLES as f64;
        let mut pts = Vec::with_capacity(4 * (EDGE_SAMPLES + 1));
        for i in 0..=EDGE_SAMPLES {
            pts.push((lerp(self.left, self.right, i), self.bottom));
            pts.push((lerp(self.left, self.right, i), self.top));
            pts.push((self.left, lerp(self.bottom, self.top, i)));
            pts.push((self.right, lerp(self.bottom, self.top, i)));
        }
        pts
    }
}

/// Box around all sites widened by `offset` degrees, clamped to the globe and
/// to what `projection` can show. `None` without sites.
pub fn site_extent<'s>(
    sites: impl IntoIterator<Item = &'s Site>,
    offset: f64,
    projection: Projection,
) -> Option<Extent> {
    let (mut lon0, mut lon1, mut lat0, mut lat1) = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for s in sites {
        lon0 = lon0.min(s.lon);
        lon1 = lon1.max(s.lon);
        lat0 = lat0.min(s.lat);
        lat1 = lat1.max(s.lat);
    }
    if lon0 > lon1 {
        return None;
    }
    let (lat_lo, lat_hi) = projection.lat_limits();
    Some(Extent {
        left: (lon0 - offset).max(-180.0),
        right: (lon1 + offset).min(180.0),
        bottom: (lat0 - offset).clamp(lat_lo, lat_hi),
        top: (lat1 + offset).clamp(lat_lo, lat_hi),
    })
}

/// Projected position of a site marker.
pub fn project_site(projection: Projection, site: &Site) -> Option<(f64, f64)> {
    projection.project(site.lon, site.lat)
}

/// Bounding box of the projected extent boundary, as `(x0, x1, y0, y1)`.
fn projected_bounds(projection: Projection, extent: &Extent) -> Option<(f64, f64, f64, f64)> {
    let mut b = (
        f64::INFINITY,
        f64::NEG_INFINITY,
        f64::INFINITY,
        f64::NEG_INFINITY,
    );
    for (lon, lat) in extent.boundary() {
        if let Some((x, y)) = projection.project(lon, lat) {
            b = (b.0.min(x), b.1.max(x), b.2.min(y), b.3.max(y));
        }
    }
    (b.0 < b.1 && b.2 < b.3).then_some(b)
}

/// Grow the shorter side of `bounds` so one map unit spans the same number of
/// pixels in x and y.
fn fit_aspect(
    (x0, x1, y0, y1): (f64, f64, f64, f64),
    (w, h): (u32, u32),
) -> (f64, f64, f64, f64) {
    if w == 0 || h == 0 {
        return (x0, x1, y0, y1);
    }
    let (bw, bh) = (x1 - x0, y1 - y0);
    let pane = w as f64 / h as f64;
    if bw / bh > pane {
        let grow = (bw / pane - bh) / 2.0;
        (x0, x1, y0 - grow, y1 + grow)
    } else {
        let grow = (bh * pane - bw) / 2.0;
        (x0 - grow, x1 + grow, y0, y1)
    }
}

fn format_deg(v: f64, pos: char, neg: char) -> String {
    let hemi = if v > 0.0 {
        Some(pos)
    } else if v < 0.0 {
        Some(neg)
    } else {
        None
    };
    let v = v.abs();
    let num = if v.fract() == 0.0 {
        format!("{v:.0}°")
    } else {
        format!("{v:.1}°")
    };
    match hemi {
        Some(h) => format!("{num}{h}"),
        None => num,
    }
}

/// Projected bounds as `(x0, x1, y0, y1)`.
type Bounds = (f64, f64, f64, f64);

/// Clip segment `a`-`b` to `bounds` (Liang-Barsky). Endpoints inside are
/// returned unchanged.
fn clip_segment(
    a: (f64, f64),
    b: (f64, f64),
    bounds: Bounds,
) -> Option<((f64, f64), (f64, f64))> {
    let (x0, x1, y0, y1) = bounds;
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, a.0 - x0), (dx, x1 - a.0), (-dy, a.1 - y0), (dy, y1 - a.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let at = |t: f64| {
        if t <= 0.0 {
            a
        } else if t >= 1.0 {
            b
        } else {
            (a.0 + t * dx, a.1 + t * dy)
        }
    };
    Some((at(t0), at(t1)))
}

/// Split a projected polyline into the runs visible inside `bounds`. `None`
/// marks a vertex the projection cannot show and breaks the line.
fn clip_polyline<I>(points: I, bounds: Bounds) -> Vec<Vec<(f64, f64)>>
where
    I: IntoIterator<Item = Option<(f64, f64)>>,
{
    let mut runs = Vec::new();
    let mut current: Vec<(f64, f64)> = Vec::new();
    let mut prev: Option<(f64, f64)> = None;
    for p in points {
        let clipped = match (prev, p) {
            (Some(a), Some(b)) => clip_segment(a, b, bounds),
            _ => None,
        };
        match clipped {
            Some((ca, cb)) => {
                if current.last() != Some(&ca) {
                    if current.len() > 1 {
                        runs.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(ca);
                }
                current.push(cb);
            }
            None => {
                if current.len() > 1 {
                    runs.push(std::mem::take(&mut current));
                }
                current.clear();
            }
        }
        prev = p;
    }
    if current.len() > 1 {
        runs.push(current);
    }
    runs
}

pub(crate) fn load_background(path: &Path) -> Result<DynamicImage> {
    let bytes = std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image::load_from_memory(&bytes)?)
}

/// Site map, either beside the data pane or carrying the data itself.
pub struct MapPlot<'a> {
    base: BasePlot<'a>,
    projection: Projection,
    mode: MapMode,
    extent: Extent,
    width_ratios: [u32; 2],
    background: Option<&'a DynamicImage>,
}

impl<'a> MapPlot<'a> {
    /// Fails when no series has a site or the sites fall outside the projection.
    /// `background` is the decoded `config.background_image`, loaded once by the caller.
    pub fn new(
        scene: &'a Scene,
        config: &MapConfig,
        background: Option<&'a DynamicImage>,
    ) -> Result<Self> {
        let extent = site_extent(scene.sites(), config.extent_offset, config.projection)
            .ok_or_else(|| Error::data("no dataset carries latitude/longitude for the map"))?;
        if projected_bounds(config.projection, &extent).is_none() {
            return Err(Error::data(format!(
                "sites are not visible in the {} projection",
                config.projection
            )));
        }
        debug!(
            "map extent {:?} in {} ({:?})",
            extent.as_array(),
            config.projection,
            config.mode
        );
        Ok(Self {
            base: BasePlot::new(scene),
            projection: config.projection,
            mode: config.mode,
            extent,
            width_ratios: config.width_ratios,
            background,
        })
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    /// Projected marker position of every series, in series order.
    pub fn site_positions(&self) -> Vec<Option<(f64, f64)>> {
        self.base
            .scene()
            .series
            .iter()
            .map(|s| s.site.as_ref().and_then(|site| project_site(self.projection, site)))
            .collect()
    }

    fn render_map<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let scene = self.base.scene();
        let with_data = self.mode == MapMode::OnMap;

        let area = if with_data && !scene.caption.is_empty() {
            let (w, _) = area.dim_in_pixel();
            let caption = truncate_to_width(&scene.caption, 16, w);
            area.titled(&caption, (FontFamily::SansSerif, 16))
                .map_err(Error::render)?
        } else {
            area.clone()
        };
        let pane = area.margin(MARGIN, MARGIN, MARGIN, MARGIN);
        let dims = pane.dim_in_pixel();

        let bounds = projected_bounds(self.projection, &self.extent)
            .ok_or_else(|| Error::data("map extent is empty"))?;
        let fitted = fit_aspect(bounds, dims);
        let (x0, x1, y0, y1) = fitted;
        let mut chart = ChartBuilder::on(&pane)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(Error::render)?;

        // ----------------------------
        // Background
        // ----------------------------
        match self.background {
            Some(img) => {
                let img = img.resize_exact(dims.0.max(1), dims.1.max(1), FilterType::Triangle);
                let elem: BitMapElement<(f64, f64)> = ((x0, y1), img).into();
                chart
                    .draw_series(std::iter::once(elem))
                    .map_err(Error::render)?;
            }
            None => pane.fill(&OCEAN).map_err(Error::render)?,
        }

        self.draw_coastlines(&mut chart, fitted)?;
        self.draw_graticule(&mut chart)?;

        // ----------------------------
        // Sites
        // ----------------------------
        let name_style = TextStyle::from((FontFamily::SansSerif, 14));
        for s in &scene.series {
            let Some(site) = &s.site else { continue };
            let Some(pos) = project_site(self.projection, site) else {
                continue;
            };
            let fill = s.color.filled();
            let anno = chart
                .draw_series(std::iter::once(Circle::new(pos, 5, fill)))
                .map_err(Error::render)?;
            if with_data {
                anno.label(s.label.as_str())
                    .legend(move |(x, y)| Circle::new((x + 10, y), 5, fill));
            }
            if let (Some(name), Some(at)) = (
                &site.name,
                self.projection
                    .project(site.lon, site.lat - SITE_LABEL_OFFSET_DEG),
            ) {
                chart
                    .draw_series(std::iter::once(Text::new(
                        name.clone(),
                        at,
                        name_style.color(&s.color),
                    )))
                    .map_err(Error::render)?;
            }
        }

        if with_data {
            self.draw_insets(&pane, &chart)?;
            draw_legend(&mut chart, SeriesLabelPosition::UpperRight)?;
        }
        Ok(())
    }

    fn draw_coastlines<'c, DB: DrawingBackend + 'c>(
        &self,
        chart: &mut Chart2d<'c, DB>,
        bounds: Bounds,
    ) -> Result<()> {
        let style = COAST.stroke_width(1);
        let runs: Vec<Vec<(f64, f64)>> = coastlines()
            .iter()
            .flat_map(|line| {
                let projected = line
                    .iter()
                    .map(|&(lon, lat)| self.projection.project(lon, lat));
                clip_polyline(projected, bounds)
            })
            .collect();
        debug!("coastline: {} visible runs", runs.len());
        chart
            .draw_series(runs.into_iter().map(|run| PathElement::new(run, style)))
            .map_err(Error::render)?;
        Ok(())
    }

    fn draw_graticule<'c, DB: DrawingBackend + 'c>(
        &self,
        chart: &mut Chart2d<'c, DB>,
    ) -> Result<()> {
        let e = self.extent;
        let line = GRID.mix(0.6).stroke_width(1);
        let label_style = TextStyle::from((FontFamily::SansSerif, 11)).color(&GRID);

        let multiples = |lo: f64, hi: f64| {
            let step = graticule_step(hi - lo);
            let first = (lo / step).ceil() as i64;
            let last = (hi / step).floor() as i64;
            (first..=last).map(move |k| k as f64 * step)
        };
        let samples = |a: f64, b: f64| {
            (0..=EDGE_SAMPLES).map(move |i| a + (b - a) * i as f64 / EDGE_SAMPLES as f64)
        };

        let mut paths: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut labels: Vec<(String, (f64, f64))> = Vec::new();
        for lon in multiples(e.left, e.right) {
            paths.push(
                samples(e.bottom, e.top)
                    .filter_map(|lat| self.projection.project(lon, lat))
                    .collect(),
            );
            if let Some(at) = self.projection.project(lon, e.bottom) {
                labels.push((format_deg(lon, 'E', 'W'), at));
            }
        }
        for lat in multiples(e.bottom, e.top) {
            paths.push(
                samples(e.left, e.right)
                    .filter_map(|lon| self.projection.project(lon, lat))
                    .collect(),
            );
            if let Some(at) = self.projection.project(e.left, lat) {
                labels.push((format_deg(lat, 'N', 'S'), at));
            }
        }

        chart
            .draw_series(
                paths
                    .into_iter()
                    .filter(|p| p.len() > 1)
                    .map(|p| PathElement::new(p, line)),
            )
            .map_err(Error::render)?;
        chart
            .draw_series(
                labels
                    .into_iter()
                    .map(|(text, at)| Text::new(text, at, label_style.clone())),
            )
            .map_err(Error::render)?;
        Ok(())
    }

    /// One small data plot per site, sharing x and y ranges across all series.
    /// Insets large enough for it carry ticks and axis descriptions.
    fn draw_insets<'c, DB: DrawingBackend + 'c>(
        &self,
        pane: &DrawingArea<DB, Shift>,
        map: &Chart2d<'c, DB>,
    ) -> Result<()> {
        let scene = self.base.scene();
        let Some((data_x, data_y)) = scene.data_ranges() else {
            return Ok(());
        };
        let xd = AxisDirection::new(scene.invert_x);
        let yd = AxisDirection::new(scene.invert_y);
        let (xr, yr) = (xd.range(data_x), yd.range(data_y));

        let (pw, ph) = pane.dim_in_pixel();
        let (px, py) = pane.get_base_pixel();
        let iw = ((pw as f64 * INSET_WIDTH_FRAC) as i32).max(8);
        let ih = ((ph as f64 * INSET_HEIGHT_FRAC) as i32).max(8);

        // Compact axes: ticks plus one line of description on each side.
        let widest_y_tick = [data_y.0, data_y.1, (data_y.0 + data_y.1) / 2.0]
            .iter()
            .map(|v| estimate_text_width_px(&format_tick(*v), INSET_FONT_PX))
            .max()
            .unwrap_or(0);
        let y_area = widest_y_tick + INSET_FONT_PX + 14;
        let x_area = 2 * INSET_FONT_PX + 12;
        let with_axes = iw as u32 > 2 * y_area && ih as u32 > 2 * x_area;
        let x_desc = truncate_to_width(&scene.x_label, INSET_FONT_PX, iw as u32);
        let y_desc = truncate_to_width(&scene.y_label, INSET_FONT_PX, ih as u32);
        let temporal_x = scene.x_kind == ColumnKind::Temporal;
        let x_fmt = |v: &f64| x_tick_label(scene, xd, *v);
        let y_fmt = |v: &f64| format_tick(yd.apply(*v));

        for s in &scene.series {
            let Some(pos) = s.site.as_ref().and_then(|site| project_site(self.projection, site))
            else {
                continue;
            };
            // Inset sits above its marker, centred, kept inside the pane.
            let (sx, sy) = map.backend_coord(&pos);
            let left = (sx - px - iw / 2).clamp(0, (pw as i32 - iw).max(0));
            let top = (sy - py - ih - 8).clamp(0, (ph as i32 - ih).max(0));
            let inset = pane.clone().shrink((left, top), (iw as u32, ih as u32));

            inset.fill(&WHITE.mix(0.8)).map_err(Error::render)?;
            inset
                .draw(&Rectangle::new(
                    [(0, 0), (iw - 1, ih - 1)],
                    s.color.stroke_width(1),
                ))
                .map_err(Error::render)?;

            let mut builder = ChartBuilder::on(&inset);
            builder.margin(INSET_MARGIN);
            if with_axes {
                builder
                    .set_label_area_size(LabelAreaPosition::Left, y_area)
                    .set_label_area_size(LabelAreaPosition::Bottom, x_area);
            }
            let mut chart = builder
                .build_cartesian_2d(xr.0..xr.1, yr.0..yr.1)
                .map_err(Error::render)?;
            if with_axes {
                chart
                    .configure_mesh()
                    .disable_mesh()
                    .x_desc(x_desc.as_str())
                    .y_desc(y_desc.as_str())
                    .x_labels(if temporal_x { 2 } else { 3 })
                    .y_labels(3)
                    .x_label_formatter(&x_fmt)
                    .y_label_formatter(&y_fmt)
                    .label_style((FontFamily::SansSerif, INSET_FONT_PX))
                    .axis_desc_style((FontFamily::SansSerif, INSET_FONT_PX))
                    .draw()
                    .map_err(Error::render)?;
            }
            let pts: Vec<(f64, f64)> = s
                .points
                .iter()
                .map(|(x, y)| (xd.apply(*x), yd.apply(*y)))
                .collect();
            draw_styled_series(&mut chart, &pts, s.color, &scene.style, None)?;
        }
        Ok(())
    }
}

impl Renderer for MapPlot<'_> {
    fn render<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        match self.mode {
            MapMode::Off => self.base.render(area),
            MapMode::OnMap => self.render_map(area),
            MapMode::Beside => {
                let (w, _) = area.dim_in_pixel();
                let [a, b] = self.width_ratios;
                let total = (a + b).max(1);
                let split = (w as u64 * a as u64 / total as u64) as u32;
                let (left, right) = area.split_horizontally(split);
                self.base.render(&left)?;
                self.render_map(&right)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(lon: f64, lat: f64) -> Site {
        Site {
            lon,
            lat,
            name: None,
        }
    }

    #[test]
    fn extent_adds_offset_around_sites() {
        let sites = [site(-78.16, -74.45), site(-65.46, -73.86)];
        let e = site_extent(&sites, 5.0, Projection::PlateCarree).unwrap();
        let want = [-83.16, -60.46, -79.45, -68.86];
        for (got, want) in e.as_array().iter().zip(want) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
    }

    #[test]
    fn extent_is_clamped() {
        let e = site_extent(&[site(178.0, 88.0)], 5.0, Projection::PlateCarree).unwrap();
        assert_eq!((e.right, e.top), (180.0, 90.0));
        let e = site_extent(&[site(0.0, 84.0)], 5.0, Projection::Mercator).unwrap();
        assert!(e.top < 85.1);
        assert!(site_extent(std::iter::empty(), 5.0, Projection::PlateCarree).is_none());
    }

    #[test]
    fn fitted_bounds_match_pane_aspect() {
        let (x0, x1, y0, y1) = fit_aspect((0.0, 10.0, 0.0, 2.0), (400, 400));
        assert!(((x1 - x0) - (y1 - y0)).abs() < 1e-9);
        assert_eq!((x0, x1), (0.0, 10.0));
        let (x0, x1, ..) = fit_aspect((0.0, 1.0, 0.0, 4.0), (200, 100));
        assert!(((x1 - x0) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn polar_bounds_cover_the_pole() {
        let e = Extent {
            left: -180.0,
            right: 180.0,
            bottom: -90.0,
            top: -60.0,
        };
        let (x0, x1, y0, y1) = projected_bounds(Projection::SouthPolarStereo, &e).unwrap();
        assert!(x0 < 0.0 && x1 > 0.0 && y0 < 0.0 && y1 > 0.0);
    }

    #[test]
    fn segments_are_clipped_to_the_bounds() {
        let b = (0.0, 10.0, 0.0, 10.0);
        assert_eq!(
            clip_segment((1.0, 1.0), (9.0, 9.0), b),
            Some(((1.0, 1.0), (9.0, 9.0)))
        );
        assert_eq!(
            clip_segment((5.0, 5.0), (15.0, 5.0), b),
            Some(((5.0, 5.0), (10.0, 5.0)))
        );
        assert_eq!(
            clip_segment((-5.0, 2.0), (15.0, 2.0), b),
            Some(((0.0, 2.0), (10.0, 2.0)))
        );
        assert_eq!(clip_segment((11.0, 0.0), (20.0, 5.0), b), None);
        assert_eq!(clip_segment((-1.0, -1.0), (-1.0, 20.0), b), None);
    }

    #[test]
    fn polylines_split_where_they_leave_the_bounds() {
        let b = (0.0, 10.0, 0.0, 10.0);
        let line = [
            Some((1.0, 1.0)),
            Some((6.0, 1.0)),
            Some((14.0, 1.0)),
            Some((14.0, 5.0)),
            Some((6.0, 5.0)),
            None,
            Some((2.0, 2.0)),
            Some((3.0, 3.0)),
        ];
        let runs = clip_polyline(line, b);
        assert_eq!(
            runs,
            vec![
                vec![(1.0, 1.0), (6.0, 1.0), (10.0, 1.0)],
                vec![(10.0, 5.0), (6.0, 5.0)],
                vec![(2.0, 2.0), (3.0, 3.0)],
            ]
        );
    }

    #[test]
    fn coastline_is_visible_around_the_fixture_sites() {
        let e = Extent {
            left: -83.16,
            right: -60.46,
            bottom: -79.45,
            top: -68.86,
        };
        for projection in [Projection::PlateCarree, Projection::SouthPolarStereo] {
            let bounds = projected_bounds(projection, &e).unwrap();
            let visible: usize = coastlines()
                .iter()
                .map(|line| {
                    let projected = line.iter().map(|&(lon, lat)| projection.project(lon, lat));
                    clip_polyline(projected, bounds).len()
                })
                .sum();
            assert!(visible > 0, "{projection}");
        }
    }

    #[test]
    fn degree_labels() {
        assert_eq!(format_deg(-70.0, 'E', 'W'), "70°W");
        assert_eq!(format_deg(0.0, 'N', 'S'), "0°");
        assert_eq!(format_deg(12.5, 'N', 'S'), "12.5°N");
    }
}
