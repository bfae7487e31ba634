//! Reader for extended CSV (XCSV) files.
//!
//! An XCSV file is a CSV table preceded by a metadata header:
//!
//! ```text
//! # id: 1
//! # title: The title
//! # latitude: -73.86 (degree_north)
//! # longitude: -65.46 (degree_east)
//! time (year) [a],depth (m)
//! 2012,0.575
//! 2011,1.125
//! ```
//!
//! Header lines start with `#` and hold `key: value` items, where a trailing
//! `(units)` is split off the value. A header line without a key continues the
//! previous item. The first line not starting with `#` is the table's header row.

use crate::error::{Error, Result};
use crate::models::{Column, ColumnKind, ColumnLabel, Dataset, HeaderValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const MISSING: [&str; 4] = ["", "NaN", "nan", "NA"];

fn value_units_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<value>.*?)\s*\((?P<units>[^()]*)\)$").unwrap())
}

fn column_label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<name>.*?)(?:\s*\((?P<units>[^()]*)\))?(?:\s*\[(?P<notes>[^\[\]]*)\])?$")
            .unwrap()
    })
}

/// Read every file in order. The first failure aborts.
pub fn read_datasets<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Dataset>> {
    paths.iter().map(read_path).collect()
}

pub fn read_path<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let ds = parse_str(&text, Some(path.to_path_buf()))?;
    debug!(
        "read {}: {} header items, {} columns, {} rows",
        path.display(),
        ds.header().count(),
        ds.columns().len(),
        ds.n_rows()
    );
    Ok(ds)
}

/// Parse XCSV text. `source` is only recorded on the dataset for labels and messages.
pub fn parse_str(text: &str, source: Option<PathBuf>) -> Result<Dataset> {
    let describe = || {
        source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "input".to_string())
    };
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(Error::data(format!("{} is an empty input file", describe())));
    }

    let mut header: Vec<(String, HeaderValue)> = Vec::new();
    // Raw (value text) per item; units are split off once the item is complete.
    let mut raw_items: Vec<(String, String)> = Vec::new();
    let mut body_start = text.len();
    let mut offset = 0usize;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if let Some(rest) = trimmed.strip_prefix('#') {
            let rest = rest.strip_prefix(' ').unwrap_or(rest);
            match rest.split_once(':') {
                Some((key, value)) if !key.trim().is_empty() && !key.contains(' ') => {
                    raw_items.push((key.trim().to_string(), value.trim().to_string()));
                }
                _ => {
                    let cont = rest.trim();
                    if let Some((_, value)) = raw_items.last_mut() {
                        if !cont.is_empty() {
                            if !value.is_empty() {
                                value.push(' ');
                            }
                            value.push_str(cont);
                        }
                    }
                }
            }
        } else if !trimmed.trim().is_empty() {
            body_start = offset;
            break;
        }
        offset += line.len();
    }
    for (key, value) in raw_items {
        header.push((key, split_units(&value)));
    }

    let body = &text[body_start..];
    if body.trim().is_empty() {
        return Err(Error::data(format!("{} has no data table", describe())));
    }
    let columns = parse_table(body)?;

    Ok(Dataset::new(source, header, columns))
}

fn split_units(value: &str) -> HeaderValue {
    match value_units_re().captures(value) {
        Some(caps) => HeaderValue::new(&caps["value"], Some(caps["units"].trim().to_string())),
        None => HeaderValue::new(value, None),
    }
}

/// Parse `name (units) [notes]`; both trailing parts are optional.
pub fn parse_column_label(raw: &str) -> ColumnLabel {
    let raw = raw.trim();
    let caps = column_label_re().captures(raw);
    let group = |name: &str| {
        caps.as_ref()
            .and_then(|c| c.name(name))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    };
    ColumnLabel {
        raw: raw.to_string(),
        name: group("name").unwrap_or_else(|| raw.to_string()),
        units: group("units"),
        notes: group("notes"),
    }
}

fn parse_table(body: &str) -> Result<Vec<Column>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(body.as_bytes());

    let labels: Vec<ColumnLabel> = rdr.headers()?.iter().map(parse_column_label).collect();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); labels.len()];
    for record in rdr.records() {
        let record = record?;
        for (i, cell) in record.iter().enumerate() {
            cells[i].push(cell.to_string());
        }
    }

    Ok(labels
        .into_iter()
        .zip(cells)
        .map(|(label, raw)| build_column(label, &raw))
        .collect())
}

fn build_column(label: ColumnLabel, raw: &[String]) -> Column {
    let present = || raw.iter().filter(|c| !MISSING.contains(&c.as_str()));

    let (kind, parse): (ColumnKind, fn(&str) -> Option<f64>) =
        if present().all(|c| parse_number(c).is_some()) {
            (ColumnKind::Numeric, parse_number)
        } else if present().all(|c| parse_timestamp(c).is_some()) {
            (ColumnKind::Temporal, parse_timestamp)
        } else {
            (ColumnKind::Text, parse_text)
        };

    let values = raw
        .iter()
        .map(|c| {
            if MISSING.contains(&c.as_str()) {
                None
            } else {
                parse(c)
            }
        })
        .collect();

    Column {
        label,
        kind,
        values,
    }
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok()
}

fn parse_text(_cell: &str) -> Option<f64> {
    None
}

/// Date/time cell to seconds since the Unix epoch (naive values are taken as UTC).
pub fn parse_timestamp(cell: &str) -> Option<f64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.timestamp() as f64);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, fmt) {
            return Some(dt.and_utc().timestamp() as f64);
        }
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# id: 1\n\
# title: The title\n\
# summary: This dataset is a\n\
#   two-line summary\n\
# latitude: -73.86 (degree_north)\n\
# longitude: -65.46 (degree_east)\n\
time (year) [a],depth (m)\n\
2012,0.575\n\
2011,1.125\n\
2010,\n";

    #[test]
    fn parses_header_and_table() {
        let ds = parse_str(SAMPLE, None).unwrap();
        let keys: Vec<&str> = ds.header().map(|(k, _)| k).collect();
        assert_eq!(keys, ["id", "title", "summary", "latitude", "longitude"]);
        assert_eq!(ds.header_value("title").unwrap().value, "The title");
        assert_eq!(
            ds.header_value("summary").unwrap().value,
            "This dataset is a two-line summary"
        );
        let lat = ds.header_value("latitude").unwrap();
        assert_eq!(lat.units.as_deref(), Some("degree_north"));
        assert_eq!(lat.as_f64(), Some(-73.86));

        assert_eq!(ds.columns().len(), 2);
        assert_eq!(ds.n_rows(), 3);
        let time = &ds.columns()[0];
        assert_eq!(time.label.name, "time");
        assert_eq!(time.label.units.as_deref(), Some("year"));
        assert_eq!(time.label.notes.as_deref(), Some("a"));
        assert_eq!(time.kind, ColumnKind::Numeric);
        assert_eq!(ds.columns()[1].values, vec![Some(0.575), Some(1.125), None]);
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let with_bom = format!("\u{feff}{SAMPLE}");
        let ds = parse_str(&with_bom, None).unwrap();
        assert_eq!(ds.header_value("id").unwrap().value, "1");
        assert_eq!(ds.columns().len(), 2);
        assert_eq!(ds.n_rows(), 3);
        assert!(matches!(parse_str("\u{feff}\n", None), Err(Error::Data(_))));
    }

    #[test]
    fn empty_input_is_data_error() {
        assert!(matches!(parse_str("  \n", None), Err(Error::Data(_))));
        assert!(matches!(parse_str("# id: 1\n", None), Err(Error::Data(_))));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_str("a,b\n1,2\n3\n", None).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn temporal_and_text_columns() {
        let ds = parse_str(
            "time,site,value\n2020-01-01,A,1\n2020-01-02T12:00:00Z,B,2\n",
            None,
        )
        .unwrap();
        assert_eq!(ds.columns()[0].kind, ColumnKind::Temporal);
        assert_eq!(ds.columns()[0].values[0], Some(1_577_836_800.0));
        assert_eq!(ds.columns()[1].kind, ColumnKind::Text);
        assert_eq!(ds.columns()[1].values, vec![None, None]);
    }

    #[test]
    fn column_labels() {
        let l = parse_column_label("depth (m)");
        assert_eq!((l.name.as_str(), l.units.as_deref()), ("depth", Some("m")));
        let l = parse_column_label("count");
        assert_eq!((l.name.as_str(), l.units, l.notes), ("count", None, None));
    }
}
