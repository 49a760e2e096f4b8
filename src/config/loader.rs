// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{Manifest, RawManifest};
use crate::errors::Result;

/// Load a manifest from a given path and return the raw `RawManifest`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawManifest> {
    let contents = fs::read_to_string(path.as_ref())?;
    parse_raw(&contents)
}

/// Deserialize manifest text without validating it.
pub fn parse_raw(contents: &str) -> Result<RawManifest> {
    let manifest: RawManifest = toml::from_str(contents)?;
    Ok(manifest)
}

/// Load a manifest from path and run semantic validation.
///
/// This is the entry point the binary uses: read TOML, apply defaults
/// (`serde` + `Default` impls), then check ids and references.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Manifest> {
    let raw = load_from_path(&path)?;
    Manifest::try_from(raw)
}

/// Parse and validate manifest text.
pub fn parse_and_validate(contents: &str) -> Result<Manifest> {
    Manifest::try_from(parse_raw(contents)?)
}

/// Default manifest location: `NeuroForge.toml` in the working directory.
pub fn default_manifest_path() -> PathBuf {
    PathBuf::from("NeuroForge.toml")
}
