use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

/// the title used when a model has no usable metadata
pub const DEFAULT_TITLE: &str = "N/A";

#[derive(Deserialize)]
struct MetaFile {
    meta: Meta,
}

#[derive(Deserialize)]
struct Meta {
    titles: Vec<String>,
}

/// the path of the metadata file for model `id` under `dir`
pub fn meta_path(dir: impl AsRef<Path>, id: &str) -> PathBuf {
    dir.as_ref().join(format!("{id}_meta.json"))
}

/// the first entry of `meta.titles` in the metadata file at `path`, or
/// [DEFAULT_TITLE] if the file is missing or doesn't have one
pub fn load_title(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    let meta = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            debug!("no metadata at {}: {e}", path.display());
            return DEFAULT_TITLE.to_owned();
        }
    };
    match serde_json::from_str::<MetaFile>(&meta) {
        Ok(MetaFile {
            meta: Meta { mut titles },
        }) if !titles.is_empty() => titles.swap_remove(0),
        Ok(_) => {
            debug!("metadata at {} has no titles", path.display());
            DEFAULT_TITLE.to_owned()
        }
        Err(e) => {
            debug!("malformed metadata at {}: {e}", path.display());
            DEFAULT_TITLE.to_owned()
        }
    }
}

/// the column name prefix for a model titled `title`: spaces become
/// underscores, then each doubled underscore is collapsed once
pub fn display_name(title: &str) -> String {
    title.replace(' ', "_").replace("__", "_")
}
