use std::path::PathBuf;
use thiserror::Error;

/// Failure while loading one of the two input files.
///
/// A load failure only halts the chart that depends on the file; the
/// caller logs it and keeps running.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path} is missing required column `{column}`")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: simd_json::Error,
    },

    #[error("invalid GeoJSON in {path}: {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },

    #[error("{path} is not a GeoJSON FeatureCollection")]
    NotFeatureCollection { path: PathBuf },
}
