//! Turn datasets plus plot options into a render-ready [`Scene`].
//!
//! This is where axis selectors, default labels, legend labels and site
//! coordinates are resolved. Every configuration or data problem surfaces here,
//! before a drawing backend is created.

use super::options::SeriesStyle;
use super::types::{
    DEFAULT_CAPTION_KEY, DEFAULT_LABEL_KEY, DEFAULT_SITE_KEY, DEFAULT_TITLE_KEY, PlotConfig,
};
use super::util::{padded_range, series_color};
use crate::error::{Error, Result};
use crate::models::{AxisSelector, Column, ColumnKind, Dataset};
use log::warn;
use plotters::style::RGBColor;

/// Geographic location of a dataset, from its `longitude`/`latitude` header items.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub lon: f64,
    pub lat: f64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub color: RGBColor,
    /// (x, y) in data units; rows with a missing x or y are dropped.
    pub points: Vec<(f64, f64)>,
    pub site: Option<Site>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub title: String,
    pub caption: String,
    pub x_label: String,
    pub y_label: String,
    pub x_kind: ColumnKind,
    pub invert_x: bool,
    pub invert_y: bool,
    pub style: SeriesStyle,
    pub series: Vec<Series>,
}

/// Where the values of one axis come from.
enum AxisSource<'a> {
    RowIndex,
    Column(&'a Column),
}

impl AxisSource<'_> {
    fn value(&self, row: usize) -> Option<f64> {
        match self {
            AxisSource::RowIndex => Some(row as f64),
            AxisSource::Column(c) => c.values.get(row).copied().flatten(),
        }
    }

    fn label(&self) -> String {
        match self {
            AxisSource::RowIndex => String::new(),
            AxisSource::Column(c) => c.label.raw.clone(),
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            AxisSource::RowIndex => ColumnKind::Numeric,
            AxisSource::Column(c) => c.kind,
        }
    }
}

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn name(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

fn resolve_axis<'a>(
    ds: &'a Dataset,
    axis: Axis,
    selector: Option<&AxisSelector>,
) -> Result<AxisSource<'a>> {
    let n_cols = ds.columns().len();
    let column = match selector {
        Some(AxisSelector::Index(i)) => ds.column(*i).ok_or_else(|| {
            Error::config(format!(
                "{}-axis column index {} is out of range for {} ({} columns)",
                axis.name(),
                i,
                ds.describe(),
                n_cols
            ))
        })?,
        Some(AxisSelector::Label(l)) => {
            ds.column_by_label(l)
                .ok_or_else(|| {
                    Error::config(format!(
                        "{}-axis column `{}` not found in {}",
                        axis.name(),
                        l,
                        ds.describe()
                    ))
                })?
                .1
        }
        None => {
            // x: row index for a lone column, else the first column.
            // y: the second column when there is one, else the lone column.
            let idx = match axis {
                Axis::X if n_cols <= 1 => return Ok(AxisSource::RowIndex),
                Axis::X => 0,
                Axis::Y if n_cols >= 2 => 1,
                Axis::Y => 0,
            };
            ds.column(idx)
                .ok_or_else(|| Error::data(format!("{} has no data columns", ds.describe())))?
        }
    };
    if column.kind == ColumnKind::Text {
        return Err(Error::data(format!(
            "column `{}` in {} holds text and cannot be plotted on the {}-axis",
            column.label.raw,
            ds.describe(),
            axis.name()
        )));
    }
    Ok(AxisSource::Column(column))
}

/// Legend label: configured header key, then `id`, then file stem, then position.
pub fn legend_label(ds: &Dataset, label_key: Option<&str>, idx: usize) -> String {
    label_key
        .and_then(|k| ds.header_value(k))
        .or_else(|| ds.header_value(DEFAULT_LABEL_KEY))
        .map(|v| v.value.clone())
        .or_else(|| ds.name())
        .unwrap_or_else(|| format!("dataset {}", idx + 1))
}

/// Site of a dataset. Fails naming the first missing coordinate.
pub fn site_of(ds: &Dataset) -> Result<Site> {
    let lat = ds.coordinate("latitude")?;
    let lon = ds.coordinate("longitude")?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(Error::data(format!(
            "latitude {} in {} is outside -90..90",
            lat,
            ds.describe()
        )));
    }
    Ok(Site {
        lon,
        lat,
        name: ds.header_value(DEFAULT_SITE_KEY).map(|v| v.value.clone()),
    })
}

impl Scene {
    /// Resolve everything needed for drawing.
    ///
    /// With `require_sites`, every dataset must carry `latitude` and `longitude`;
    /// otherwise sites are attached where available.
    pub fn resolve(datasets: &[Dataset], plot: &PlotConfig, require_sites: bool) -> Result<Scene> {
        let first = datasets
            .first()
            .ok_or_else(|| Error::data("no datasets to plot"))?;
        let style = plot.style.style()?;

        let mut series = Vec::with_capacity(datasets.len());
        let mut x_label = String::new();
        let mut y_label = String::new();
        let mut x_kind = ColumnKind::Numeric;

        for (i, ds) in datasets.iter().enumerate() {
            let xs = resolve_axis(ds, Axis::X, plot.x.as_ref())?;
            let ys = resolve_axis(ds, Axis::Y, plot.y.as_ref())?;
            if i == 0 {
                x_label = xs.label();
                y_label = ys.label();
                x_kind = xs.kind();
            }

            let points: Vec<(f64, f64)> = (0..ds.n_rows())
                .filter_map(|row| Some((xs.value(row)?, ys.value(row)?)))
                .collect();
            if points.is_empty() {
                warn!("{} has no plottable rows", ds.describe());
            }

            let site = if require_sites {
                Some(site_of(ds)?)
            } else {
                site_of(ds).ok()
            };

            series.push(Series {
                label: legend_label(ds, plot.label_key.as_deref(), i),
                color: style.color.unwrap_or_else(|| series_color(i)),
                points,
                site,
            });
        }

        if series.iter().all(|s| s.points.is_empty()) {
            return Err(Error::data("no numeric values to plot"));
        }

        let header_text = |key: &str| {
            first
                .header_value(key)
                .map(|v| v.value.clone())
                .unwrap_or_default()
        };

        Ok(Scene {
            title: plot
                .title
                .clone()
                .unwrap_or_else(|| header_text(DEFAULT_TITLE_KEY)),
            caption: plot
                .caption
                .clone()
                .unwrap_or_else(|| header_text(DEFAULT_CAPTION_KEY)),
            x_label: plot.x_label.clone().unwrap_or(x_label),
            y_label: plot.y_label.clone().unwrap_or(y_label),
            x_kind,
            invert_x: plot.invert_x,
            invert_y: plot.invert_y,
            style,
            series,
        })
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.series.iter().filter_map(|s| s.site.as_ref())
    }

    /// Padded data range over all series, x then y.
    pub fn data_ranges(&self) -> Option<((f64, f64), (f64, f64))> {
        let pts = || self.series.iter().flat_map(|s| s.points.iter());
        let x = padded_range(pts().map(|p| p.0))?;
        let y = padded_range(pts().map(|p| p.1))?;
        Some((x, y))
    }
}
