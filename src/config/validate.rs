// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{Manifest, RawManifest};
use crate::errors::{NeuroforgeError, Result};

impl TryFrom<RawManifest> for Manifest {
    type Error = NeuroforgeError;

    fn try_from(raw: RawManifest) -> std::result::Result<Self, Self::Error> {
        validate_raw_manifest(&raw)?;
        Ok(Manifest::new_unchecked(raw))
    }
}

/// Semantic checks on a deserialized manifest.
///
/// Checks that:
/// - the target and graph name are non-empty
/// - there is at least one `[[operator]]`
/// - tensor ids and operator ids are unique
/// - every operator input/output names a declared tensor
/// - graph inputs/outputs name declared tensors
///
/// Producer conflicts and cycles are left to the graph itself, which reports
/// them as [`GraphError`](crate::errors::GraphError)s when the graph is built
/// and scheduled.
pub fn validate_raw_manifest(raw: &RawManifest) -> Result<()> {
    validate_global_config(raw)?;
    ensure_has_operators(raw)?;
    let tensors = validate_unique_ids(raw)?;
    validate_operator_references(raw, &tensors)?;
    validate_graph_interface(raw, &tensors)?;
    Ok(())
}

fn validate_global_config(raw: &RawManifest) -> Result<()> {
    if raw.config.target.trim().is_empty() {
        return Err(NeuroforgeError::ConfigError(
            "[config].target must not be empty".to_string(),
        ));
    }
    if raw.graph.name.trim().is_empty() {
        return Err(NeuroforgeError::ConfigError(
            "[graph].name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_operators(raw: &RawManifest) -> Result<()> {
    if raw.operator.is_empty() {
        return Err(NeuroforgeError::ConfigError(
            "manifest must contain at least one [[operator]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_unique_ids(raw: &RawManifest) -> Result<HashSet<&str>> {
    let mut tensors = HashSet::new();
    for t in raw.tensor.iter() {
        if !tensors.insert(t.id.as_str()) {
            return Err(NeuroforgeError::ConfigError(format!(
                "duplicate tensor id '{}'",
                t.id
            )));
        }
    }

    let mut operators = HashSet::new();
    for op in raw.operator.iter() {
        if !operators.insert(op.id.as_str()) {
            return Err(NeuroforgeError::ConfigError(format!(
                "duplicate operator id '{}'",
                op.id
            )));
        }
    }

    Ok(tensors)
}

fn validate_operator_references(raw: &RawManifest, tensors: &HashSet<&str>) -> Result<()> {
    for op in raw.operator.iter() {
        for t in op.inputs.iter().chain(op.outputs.iter()) {
            if !tensors.contains(t.as_str()) {
                return Err(NeuroforgeError::ConfigError(format!(
                    "operator '{}' references unknown tensor '{}'",
                    op.id, t
                )));
            }
        }
    }
    Ok(())
}

fn validate_graph_interface(raw: &RawManifest, tensors: &HashSet<&str>) -> Result<()> {
    for (role, ids) in [("inputs", &raw.graph.inputs), ("outputs", &raw.graph.outputs)] {
        for t in ids.iter() {
            if !tensors.contains(t.as_str()) {
                return Err(NeuroforgeError::ConfigError(format!(
                    "[graph].{role} names unknown tensor '{t}'"
                )));
            }
        }
    }
    Ok(())
}
