use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Value of a header item, with the physical unit split off when present.
///
/// `latitude: -73.86 (degree_north)` becomes `value = "-73.86"`, `units = Some("degree_north")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderValue {
    pub value: String,
    pub units: Option<String>,
}

impl HeaderValue {
    pub fn new(value: impl Into<String>, units: Option<String>) -> Self {
        Self {
            value: value.into(),
            units,
        }
    }

    /// Numeric interpretation of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.units {
            Some(u) => write!(f, "{} ({})", self.value, u),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Parsed column header, e.g. `time (year) [a]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLabel {
    /// Header text exactly as it appears in the file.
    pub raw: String,
    pub name: String,
    pub units: Option<String>,
    pub notes: Option<String>,
}

impl ColumnLabel {
    /// True when `label` names this column, either verbatim or by its bare name.
    pub fn matches(&self, label: &str) -> bool {
        let label = label.trim();
        self.raw == label || self.name == label
    }
}

/// How the cells of a column were interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    /// Date/time cells, stored as seconds since the Unix epoch (UTC).
    Temporal,
    /// Free text; cannot be placed on an axis.
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: ColumnLabel,
    pub kind: ColumnKind,
    /// One entry per row; `None` marks a missing or non-numeric cell.
    pub values: Vec<Option<f64>>,
}

/// One XCSV file: ordered metadata header plus a table of equal-length columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub source: Option<PathBuf>,
    header: Vec<(String, HeaderValue)>,
    columns: Vec<Column>,
}

impl Dataset {
    pub fn new(
        source: Option<PathBuf>,
        header: Vec<(String, HeaderValue)>,
        columns: Vec<Column>,
    ) -> Self {
        Self {
            source,
            header,
            columns,
        }
    }

    /// Header items in file order.
    pub fn header(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.header.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn header_value(&self, key: &str) -> Option<&HeaderValue> {
        self.header.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub fn column_by_label(&self, label: &str) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.label.matches(label))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.values.len()).unwrap_or(0)
    }

    /// Short name used in messages and as the last-resort legend label.
    pub fn name(&self) -> Option<String> {
        self.source
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
    }

    /// Numeric header value in degrees, e.g. `latitude`. Fails naming the missing field.
    pub fn coordinate(&self, key: &str) -> Result<f64> {
        let item = self.header_value(key).ok_or_else(|| {
            Error::data(format!(
                "header item `{}` missing from {}",
                key,
                self.describe()
            ))
        })?;
        item.as_f64().ok_or_else(|| {
            Error::data(format!(
                "header item `{}` in {} is not numeric: {:?}",
                key,
                self.describe(),
                item.value
            ))
        })
    }

    pub(crate) fn describe(&self) -> String {
        match &self.source {
            Some(p) => p.display().to_string(),
            None => "dataset".to_string(),
        }
    }
}

/// Which column feeds an axis. Index and label are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisSelector {
    /// Zero-based column index.
    Index(usize),
    /// Column header text or bare column name.
    Label(String),
}

impl AxisSelector {
    /// Combine the optional index and label given for one axis.
    ///
    /// Giving both is a configuration error; giving neither leaves the axis on its default.
    pub fn from_parts(axis: &str, index: Option<usize>, label: Option<String>) -> Result<Option<Self>> {
        match (index, label) {
            (Some(i), Some(l)) => Err(Error::config(format!(
                "{axis}-axis column given both as index {i} and as label `{l}`; use only one"
            ))),
            (Some(i), None) => Ok(Some(AxisSelector::Index(i))),
            (None, Some(l)) => Ok(Some(AxisSelector::Label(l))),
            (None, None) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(raw: &str, name: &str) -> ColumnLabel {
        ColumnLabel {
            raw: raw.into(),
            name: name.into(),
            units: None,
            notes: None,
        }
    }

    #[test]
    fn header_value_numeric() {
        let v = HeaderValue::new("-73.86", Some("degree_north".into()));
        assert_eq!(v.as_f64(), Some(-73.86));
        assert_eq!(v.to_string(), "-73.86 (degree_north)");
        assert_eq!(HeaderValue::new("The title", None).as_f64(), None);
    }

    #[test]
    fn selector_from_parts() {
        assert_eq!(
            AxisSelector::from_parts("x", Some(1), None).unwrap(),
            Some(AxisSelector::Index(1))
        );
        assert_eq!(AxisSelector::from_parts("y", None, None).unwrap(), None);
        let err = AxisSelector::from_parts("x", Some(0), Some("depth".into())).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_coordinate_names_field() {
        let ds = Dataset::new(None, vec![], vec![]);
        let err = ds.coordinate("latitude").unwrap_err();
        assert!(matches!(err, Error::Data(_)));
        assert!(err.to_string().contains("latitude"));
    }

    #[test]
    fn column_label_matching() {
        let l = label("time (year) [a]", "time");
        assert!(l.matches("time (year) [a]"));
        assert!(l.matches("time"));
        assert!(!l.matches("depth"));
    }
}
