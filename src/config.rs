use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{error::Error, Result};

/// environment variable overriding the default model directory
pub const MODEL_DIR_VAR: &str = "MOLPREDICT_MODEL_DIR";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The directory holding `<id>.jmodel` and `<id>_meta.json` files.
    pub model_dir: Option<PathBuf>,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let s = read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&s).map_err(|source| Error::Toml {
            path: path.to_owned(),
            source,
        })
    }

    /// the model directory: the configured one, then [MODEL_DIR_VAR], then
    /// `models` next to the running executable
    pub fn model_dir(&self) -> PathBuf {
        if let Some(dir) = &self.model_dir {
            return dir.clone();
        }
        if let Some(dir) = std::env::var_os(MODEL_DIR_VAR) {
            return PathBuf::from(dir);
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("models")))
            .unwrap_or_else(|| PathBuf::from("models"))
    }
}
