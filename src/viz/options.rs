//! Plot style overrides given as a JSON object (`-P '{"marker": "x", "ls": "--"}'`).
//!
//! Keys follow the matplotlib keyword names users already know. Long aliases
//! (`linestyle`, `linewidth`, `markersize`, `c`) are folded onto the short keys
//! so that presets and user options merge key by key.

use super::util::parse_color;
use super::types::DPI;
use crate::error::{Error, Result};
use log::warn;
use plotters::style::RGBColor;
use serde::Deserialize;
use serde_json::{Map, Value, json};

const KNOWN_KEYS: [&str; 6] = ["marker", "ls", "lw", "ms", "color", "alpha"];

fn canonical_key(key: &str) -> &str {
    match key {
        "linestyle" => "ls",
        "linewidth" => "lw",
        "markersize" => "ms",
        "c" => "color",
        other => other,
    }
}

/// Raw, validated style overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotOptions {
    entries: Map<String, Value>,
}

impl PlotOptions {
    /// Parse a JSON object. Anything else is a configuration error.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("plot options are not valid JSON: {e}")))?;
        let Value::Object(obj) = value else {
            return Err(Error::config(format!(
                "plot options must be a JSON object, got `{}`",
                text.trim()
            )));
        };
        let opts = Self::from_map(obj);
        opts.style()?;
        Ok(opts)
    }

    fn from_map(obj: Map<String, Value>) -> Self {
        let mut entries = Map::new();
        for (k, v) in obj {
            let key = canonical_key(&k).to_string();
            if !KNOWN_KEYS.contains(&key.as_str()) {
                warn!("ignoring unsupported plot option `{k}`");
            }
            entries.insert(key, v);
        }
        Self { entries }
    }

    /// Markers only, no connecting line.
    pub fn scatter() -> Self {
        match json!({"marker": ".", "ls": ""}) {
            Value::Object(obj) => Self::from_map(obj),
            _ => Self::default(),
        }
    }

    /// Overlay `other` on `self`; keys present in `other` win.
    pub fn merged(mut self, other: &PlotOptions) -> Self {
        for (k, v) in &other.entries {
            self.entries.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(canonical_key(key))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Interpret the options as a concrete series style.
    pub fn style(&self) -> Result<SeriesStyle> {
        let raw: RawStyle = serde_json::from_value(Value::Object(self.entries.clone()))
            .map_err(|e| Error::config(format!("invalid plot option: {e}")))?;

        let mut style = SeriesStyle::default();
        if let Some(m) = raw.marker.as_deref() {
            style.marker = MarkerKind::parse(m)?;
        }
        if let Some(ls) = raw.ls.as_deref() {
            style.line = LineKind::parse(ls)?;
        }
        if let Some(lw) = raw.lw {
            style.line_width = points_to_px(lw).max(1);
        }
        if let Some(ms) = raw.ms {
            style.marker_size = (points_to_px(ms) / 2).max(1);
        } else if style.marker == Some(MarkerKind::Point) {
            style.marker_size = 2;
        }
        if let Some(c) = raw.color.as_deref() {
            style.color = Some(
                parse_color(c).ok_or_else(|| Error::config(format!("unknown colour `{c}`")))?,
            );
        }
        if let Some(a) = raw.alpha {
            if !(0.0..=1.0).contains(&a) {
                return Err(Error::config(format!("alpha must be within 0..1, got {a}")));
            }
            style.alpha = a;
        }
        if style.marker.is_none() && style.line.is_none() {
            warn!("plot options disable both line and marker; series will be invisible");
        }
        Ok(style)
    }
}

#[derive(Debug, Deserialize)]
struct RawStyle {
    marker: Option<String>,
    ls: Option<String>,
    lw: Option<f64>,
    ms: Option<f64>,
    color: Option<String>,
    alpha: Option<f64>,
}

fn points_to_px(pt: f64) -> u32 {
    (pt * DPI / 72.0).round().max(0.0) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// `.`
    Point,
    /// `o`
    Circle,
    /// `x`
    Cross,
    /// `+`
    Plus,
    /// `s`
    Square,
    /// `^`
    Triangle,
    /// `D`
    Diamond,
}

impl MarkerKind {
    fn parse(s: &str) -> Result<Option<Self>> {
        Ok(Some(match s {
            "" | "None" | "none" => return Ok(None),
            "." => MarkerKind::Point,
            "o" => MarkerKind::Circle,
            "x" => MarkerKind::Cross,
            "+" => MarkerKind::Plus,
            "s" => MarkerKind::Square,
            "^" => MarkerKind::Triangle,
            "D" | "d" => MarkerKind::Diamond,
            other => return Err(Error::config(format!("unsupported marker `{other}`"))),
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

impl LineKind {
    fn parse(s: &str) -> Result<Option<Self>> {
        Ok(Some(match s {
            "" | " " | "None" | "none" => return Ok(None),
            "-" | "solid" => LineKind::Solid,
            "--" | "dashed" => LineKind::Dashed,
            ":" | "dotted" => LineKind::Dotted,
            "-." | "dashdot" => LineKind::DashDot,
            other => return Err(Error::config(format!("unsupported line style `{other}`"))),
        }))
    }
}

/// Resolved drawing style shared by all series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesStyle {
    pub marker: Option<MarkerKind>,
    pub line: Option<LineKind>,
    pub line_width: u32,
    /// Marker radius in pixels.
    pub marker_size: u32,
    /// Overrides the per-series palette colour.
    pub color: Option<RGBColor>,
    pub alpha: f64,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            marker: None,
            line: Some(LineKind::Solid),
            line_width: 2,
            marker_size: 4,
            color: None,
            alpha: 1.0,
        }
    }
}
