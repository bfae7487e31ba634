//! Utility functions for visualization: colors, ranges, axis direction, tick labels.

use chrono::DateTime;
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Colour of the n-th series (cycles through the Office palette).
#[inline]
pub fn series_color(idx: usize) -> RGBColor {
    OFFICE10[idx % OFFICE10.len()]
}

/// Parse a colour given in a plot option: `#rrggbb`, `C0`..`C9`, a one-letter
/// code (`b g r c m y k w`) or a basic colour name.
pub fn parse_color(s: &str) -> Option<RGBColor> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(RGBColor(byte(0)?, byte(2)?, byte(4)?));
    }
    if let Some(n) = s.strip_prefix('C') {
        if let Ok(i) = n.parse::<usize>() {
            return Some(series_color(i));
        }
    }
    let c = match s.to_ascii_lowercase().as_str() {
        "b" | "blue" => RGBColor(0, 0, 255),
        "g" | "green" => RGBColor(0, 128, 0),
        "r" | "red" => RGBColor(255, 0, 0),
        "c" | "cyan" => RGBColor(0, 191, 191),
        "m" | "magenta" => RGBColor(191, 0, 191),
        "y" | "yellow" => RGBColor(191, 191, 0),
        "k" | "black" => RGBColor(0, 0, 0),
        "w" | "white" => RGBColor(255, 255, 255),
        "orange" => RGBColor(255, 165, 0),
        "purple" => RGBColor(128, 0, 128),
        "brown" => RGBColor(165, 42, 42),
        "pink" => RGBColor(255, 192, 203),
        "gray" | "grey" => RGBColor(128, 128, 128),
        "navy" => RGBColor(0, 0, 128),
        _ => return None,
    };
    Some(c)
}

/// Min/max of the values with a 5 % margin; a flat range is widened by ±1.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (mut lo, mut hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return None;
    }
    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    } else {
        let pad = (hi - lo) * 0.05;
        lo -= pad;
        hi += pad;
    }
    Some((lo, hi))
}

/// Axis direction. An inverted axis is drawn on negated coordinates, with tick
/// labels negated back, so that the coordinate range stays increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisDirection {
    pub inverted: bool,
}

impl AxisDirection {
    pub fn new(inverted: bool) -> Self {
        Self { inverted }
    }

    #[inline]
    pub fn apply(&self, v: f64) -> f64 {
        if self.inverted { -v } else { v }
    }

    /// Coordinate range for data in `lo..hi`.
    pub fn range(&self, (lo, hi): (f64, f64)) -> (f64, f64) {
        if self.inverted { (-hi, -lo) } else { (lo, hi) }
    }
}

/// Numeric tick label with precision depending on magnitude.
pub fn format_tick(v: f64) -> String {
    let a = v.abs();
    if a != 0.0 && !(1e-3..1e6).contains(&a) {
        return format!("{:.2e}", v);
    }
    let prec = if a >= 100.0 {
        0
    } else if a >= 10.0 {
        1
    } else {
        2
    };
    format!("{:.*}", prec, v)
}

/// Tick label for seconds since the Unix epoch.
pub fn format_time_tick(secs: f64) -> String {
    match DateTime::from_timestamp(secs.round() as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => format_tick(secs),
    }
}

/// Graticule spacing in degrees giving at most six lines across `span_deg`.
pub fn graticule_step(span_deg: f64) -> f64 {
    const STEPS: [f64; 8] = [1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 45.0, 90.0];
    STEPS
        .iter()
        .copied()
        .find(|s| span_deg / s <= 6.0)
        .unwrap_or(90.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_parse() {
        assert_eq!(parse_color("#4472C4"), Some(RGBColor(68, 114, 196)));
        assert_eq!(parse_color("C1"), Some(series_color(1)));
        assert_eq!(parse_color("k"), Some(RGBColor(0, 0, 0)));
        assert_eq!(parse_color("Red"), Some(RGBColor(255, 0, 0)));
        assert_eq!(parse_color("#12"), None);
        assert_eq!(parse_color("chartreuse-ish"), None);
    }

    #[test]
    fn padded_range_handles_flat_and_empty() {
        assert_eq!(padded_range([2.0, 2.0]), Some((1.0, 3.0)));
        assert_eq!(padded_range(Vec::<f64>::new()), None);
        let (lo, hi) = padded_range([0.0, 10.0]).unwrap();
        assert!((lo + 0.5).abs() < 1e-12 && (hi - 10.5).abs() < 1e-12);
    }

    #[test]
    fn inverted_axis_negates() {
        let d = AxisDirection::new(true);
        assert_eq!(d.apply(3.0), -3.0);
        assert_eq!(d.range((1.0, 4.0)), (-4.0, -1.0));
        assert_eq!(AxisDirection::default().range((1.0, 4.0)), (1.0, 4.0));
    }

    #[test]
    fn graticule_steps() {
        assert_eq!(graticule_step(10.0), 2.0);
        assert_eq!(graticule_step(23.0), 5.0);
        assert_eq!(graticule_step(360.0), 90.0);
    }

    #[test]
    fn time_ticks() {
        assert_eq!(format_time_tick(1_577_836_800.0), "2020-01-01");
        assert_eq!(format_tick(12.345), "12.3");
    }
}
