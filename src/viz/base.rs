//! The data pane: one 2-D line/scatter chart of every series in the scene.

use super::Renderer;
use super::options::{LineKind, MarkerKind, SeriesStyle};
use super::scene::Scene;
use super::text::{estimate_text_width_px, truncate_to_width};
use super::util::{AxisDirection, format_tick, format_time_tick};
use crate::error::{Error, Result};
use crate::models::ColumnKind;
use plotters::chart::SeriesAnno;
use plotters::coord::Shift;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

pub(crate) type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

const MARGIN: u32 = 16;
const TICK_FONT_PX: u32 = 12;
const DESC_FONT_PX: u32 = 14;
const CAPTION_FONT_PX: u32 = 16;

/// Plain data plot, the building block [`super::MapPlot`] wraps.
pub struct BasePlot<'a> {
    scene: &'a Scene,
}

impl<'a> BasePlot<'a> {
    pub fn new(scene: &'a Scene) -> Self {
        Self { scene }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }
}

/// Width of the left label area: widest tick label plus room for the axis description.
fn left_label_area_px(lo: f64, hi: f64) -> u32 {
    let widest = [lo, hi, (lo + hi) / 2.0]
        .iter()
        .map(|v| estimate_text_width_px(&format_tick(*v), TICK_FONT_PX))
        .max()
        .unwrap_or(0);
    (widest + 18 + DESC_FONT_PX + 8).clamp(48, 140)
}

impl Renderer for BasePlot<'_> {
    fn render<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let scene = self.scene;
        let (xr, yr) = scene
            .data_ranges()
            .ok_or_else(|| Error::data("no numeric values to plot"))?;
        let xd = AxisDirection::new(scene.invert_x);
        let yd = AxisDirection::new(scene.invert_y);
        let (x0, x1) = xd.range(xr);
        let (y0, y1) = yd.range(yr);

        let (area_w, _) = area.dim_in_pixel();
        let mut builder = ChartBuilder::on(area);
        builder
            .margin(MARGIN)
            .set_label_area_size(LabelAreaPosition::Left, left_label_area_px(yr.0, yr.1))
            .set_label_area_size(LabelAreaPosition::Bottom, 48);
        if !scene.caption.is_empty() {
            let max_px = area_w.saturating_sub(2 * MARGIN);
            builder.caption(
                truncate_to_width(&scene.caption, CAPTION_FONT_PX, max_px),
                (FontFamily::SansSerif, CAPTION_FONT_PX),
            );
        }
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(Error::render)?;

        let temporal_x = scene.x_kind == ColumnKind::Temporal;
        let x_fmt = |v: &f64| x_tick_label(scene, xd, *v);
        let y_fmt = |v: &f64| format_tick(yd.apply(*v));

        chart
            .configure_mesh()
            .x_desc(scene.x_label.as_str())
            .y_desc(scene.y_label.as_str())
            .x_labels(if temporal_x { 6 } else { 10 })
            .y_labels(10)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .label_style((FontFamily::SansSerif, TICK_FONT_PX))
            .axis_desc_style((FontFamily::SansSerif, DESC_FONT_PX))
            .draw()
            .map_err(Error::render)?;

        for s in &scene.series {
            let pts: Vec<(f64, f64)> = s
                .points
                .iter()
                .map(|(x, y)| (xd.apply(*x), yd.apply(*y)))
                .collect();
            draw_styled_series(&mut chart, &pts, s.color, &scene.style, Some(&s.label))?;
        }

        if scene.style.marker.is_some() || scene.style.line.is_some() {
            draw_legend(&mut chart, SeriesLabelPosition::UpperRight)?;
        }
        Ok(())
    }
}

/// Tick label for a drawn x coordinate: undo the inversion, then format as a
/// number or a date.
pub(crate) fn x_tick_label(scene: &Scene, xd: AxisDirection, v: f64) -> String {
    let v = xd.apply(v);
    if scene.x_kind == ColumnKind::Temporal {
        format_time_tick(v)
    } else {
        format_tick(v)
    }
}

/// Draw one series (line and/or markers) in chart coordinates.
pub(crate) fn draw_styled_series<'a, DB: DrawingBackend + 'a>(
    chart: &mut Chart2d<'a, DB>,
    points: &[(f64, f64)],
    color: RGBColor,
    style: &SeriesStyle,
    label: Option<&str>,
) -> Result<()> {
    let c = color.mix(style.alpha);
    let stroke = ShapeStyle {
        color: c,
        filled: false,
        stroke_width: style.line_width,
    };
    let mut labelled = false;

    if let Some(line) = style.line {
        let pts = points.iter().copied();
        let anno = match line {
            LineKind::Solid => chart.draw_series(LineSeries::new(pts, stroke)),
            LineKind::Dashed => chart.draw_series(DashedLineSeries::new(pts, 8, 5, stroke)),
            LineKind::Dotted => chart.draw_series(DashedLineSeries::new(pts, 2, 4, stroke)),
            LineKind::DashDot => chart.draw_series(DashedLineSeries::new(pts, 10, 3, stroke)),
        }
        .map_err(Error::render)?;
        if let Some(l) = label {
            anno.label(l)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], stroke));
            labelled = true;
        }
    }

    if let Some(marker) = style.marker {
        let r = style.marker_size as i32;
        let anno = draw_markers(chart, points, marker, r, c)?;
        if let (Some(l), false) = (label, labelled) {
            let fill = c.filled();
            anno.label(l)
                .legend(move |(x, y)| Circle::new((x + 10, y), r.min(5), fill));
        }
    }
    Ok(())
}

fn draw_markers<'c, 'a, DB: DrawingBackend + 'a>(
    chart: &'c mut Chart2d<'a, DB>,
    points: &[(f64, f64)],
    marker: MarkerKind,
    r: i32,
    c: RGBAColor,
) -> Result<&'c mut SeriesAnno<'a, DB>> {
    let fill = c.filled();
    let thin = c.stroke_width(2);
    let pts = points.iter().copied();
    let drawn = match marker {
        MarkerKind::Point | MarkerKind::Circle => {
            chart.draw_series(pts.map(|p| Circle::new(p, r, fill)))
        }
        MarkerKind::Cross => chart.draw_series(pts.map(|p| Cross::new(p, r, thin))),
        MarkerKind::Plus => chart.draw_series(pts.map(|p| {
            EmptyElement::at(p)
                + PathElement::new(vec![(-r, 0), (r, 0)], thin)
                + PathElement::new(vec![(0, -r), (0, r)], thin)
        })),
        MarkerKind::Square => chart.draw_series(
            pts.map(|p| EmptyElement::at(p) + Rectangle::new([(-r, -r), (r, r)], fill)),
        ),
        MarkerKind::Triangle => chart.draw_series(pts.map(|p| TriangleMarker::new(p, r, fill))),
        MarkerKind::Diamond => chart.draw_series(pts.map(|p| {
            EmptyElement::at(p) + Polygon::new(vec![(0, -r), (r, 0), (0, r), (-r, 0)], fill)
        })),
    };
    drawn.map_err(Error::render)
}

/// Legend box inside the plotting area. Draws an empty box when no series is labelled.
pub(crate) fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut Chart2d<'a, DB>,
    position: SeriesLabelPosition,
) -> Result<()> {
    chart
        .configure_series_labels()
        .border_style(BLACK)
        .position(position)
        .background_style(WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 12))
        .draw()
        .map_err(Error::render)
}
