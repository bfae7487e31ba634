//! Error type shared by the reader, the projections and the renderer.

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between reading an XCSV file and writing the figure.
#[derive(Debug, Error)]
pub enum Error {
    /// Conflicting or invalid options: axis selectors, projection names, plot options.
    #[error("configuration error: {0}")]
    Config(String),
    /// The input data cannot satisfy the request (missing header items, empty files, …).
    #[error("data error: {0}")]
    Data(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data table: {0}")]
    Csv(#[from] csv::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
    /// Drawing backend failures (plotters errors are not `Send + Sync`, so keep the text).
    #[error("render error: {0}")]
    Render(String),
    #[error("cannot open viewer window: {0}")]
    Viewer(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    pub(crate) fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Convert any plotters error into a render error.
    pub(crate) fn render<E: std::fmt::Debug>(e: E) -> Self {
        Error::Render(format!("{:?}", e))
    }
}
