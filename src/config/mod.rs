// src/config/mod.rs

//! Compile manifest loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a manifest from disk (`loader.rs`).
//! - Validate ids and references (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, parse_and_validate, parse_raw};
pub use model::{
    ConfigSection, GraphSection, HardwareSection, Manifest, OperatorSpec, RawManifest, TensorSpec,
};
pub use validate::validate_raw_manifest;
