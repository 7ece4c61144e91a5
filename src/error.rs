use std::path::PathBuf;

use thiserror::Error;

use crate::mol::{molfile::MolfileError, smiles::SmilesError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("delimited text error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid model {path}: {reason}")]
    InvalidModel { path: PathBuf, reason: String },

    #[error("invalid delimiter {0:?}: expected a single byte or one of tab, comma, space, pipe")]
    Delimiter(String),

    #[error("id column {0:?} is neither a column index nor a header name")]
    IdColumn(String),

    #[error("prediction does not match the {expected} output schema")]
    Misaligned { expected: &'static str },

    #[error(transparent)]
    Smiles(#[from] SmilesError),

    #[error(transparent)]
    Molfile(#[from] MolfileError),
}

impl Error {
    /// wrap an [std::io::Error] with the path that produced it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// reports whether `self` is an I/O error for a file that doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Io { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
