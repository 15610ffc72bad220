//! Error types for the history engine

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Gramps XML error: {0}")]
    Xml(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] bincode::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("unsupported snapshot version: {0}")]
    UnsupportedVersion(u8),

    #[error("invalid calendar day: {0}")]
    InvalidDay(String),
}

impl HistoryError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<quick_xml::Error> for HistoryError {
    fn from(err: quick_xml::Error) -> Self {
        HistoryError::Xml(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for HistoryError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        HistoryError::Xml(err.to_string())
    }
}

impl From<toml::de::Error> for HistoryError {
    fn from(err: toml::de::Error) -> Self {
        HistoryError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;
