//! Bundled world coastline, drawn on every map under the site markers.
//!
//! The outline is coarse (a few hundred vertices) and reads best at regional
//! scale. Lines are kept in geographic degrees and projected when drawn.

use crate::error::Result;
use geojson::{GeoJson, Value};
use log::warn;
use std::sync::OnceLock;

/// A polyline of `(lon, lat)` degrees.
pub type Coastline = Vec<(f64, f64)>;

const BUNDLED: &str = include_str!("../assets/coastline.geojson");

/// The bundled coastline, parsed on first use.
pub fn coastlines() -> &'static [Coastline] {
    static LINES: OnceLock<Vec<Coastline>> = OnceLock::new();
    LINES.get_or_init(|| {
        parse_geojson(BUNDLED).unwrap_or_else(|e| {
            warn!("bundled coastline unreadable, maps are drawn without it: {e}");
            Vec::new()
        })
    })
}

/// Collect every line and ring of a GeoJSON document. Points are ignored.
pub fn parse_geojson(text: &str) -> Result<Vec<Coastline>> {
    let mut out = Vec::new();
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(g) = feature.geometry {
                    collect(&g.value, &mut out);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(g) = feature.geometry {
                collect(&g.value, &mut out);
            }
        }
        GeoJson::Geometry(g) => collect(&g.value, &mut out),
    }
    out.retain(|line| line.len() > 1);
    Ok(out)
}

fn collect(value: &Value, out: &mut Vec<Coastline>) {
    match value {
        Value::LineString(line) => out.push(to_lon_lat(line)),
        Value::MultiLineString(lines) | Value::Polygon(lines) => {
            out.extend(lines.iter().map(|l| to_lon_lat(l)));
        }
        Value::MultiPolygon(polygons) => {
            for rings in polygons {
                out.extend(rings.iter().map(|l| to_lon_lat(l)));
            }
        }
        Value::GeometryCollection(geometries) => {
            for g in geometries {
                collect(&g.value, out);
            }
        }
        _ => {}
    }
}

fn to_lon_lat(line: &[Vec<f64>]) -> Coastline {
    line.iter()
        .filter(|p| p.len() >= 2)
        .map(|p| (p[0], p[1]))
        .collect()
}
