// src/pipeline/hal.rs

//! Hardware abstraction layer: what a target can run.

use std::collections::BTreeSet;

use tracing::debug;

use crate::config::Manifest;

/// Capability summary of a hardware target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareCapabilities {
    /// Operator type tags the target can execute.
    pub supported_ops: BTreeSet<String>,
    pub memory_gb: u64,
}

impl HardwareCapabilities {
    pub fn supports(&self, op_type: &str) -> bool {
        self.supported_ops.contains(op_type)
    }

    pub fn memory_bytes(&self) -> u64 {
        self.memory_gb.saturating_mul(1 << 30)
    }
}

/// Capability query consulted by code generation.
pub trait HardwareAbstraction {
    fn target(&self) -> &str;
    fn capabilities(&self) -> HardwareCapabilities;
}

/// A hardware layer whose capabilities are fixed up front, typically from
/// the manifest's `[hardware]` section.
#[derive(Debug, Clone)]
pub struct StaticHal {
    target: String,
    capabilities: HardwareCapabilities,
}

impl StaticHal {
    pub fn new(target: impl Into<String>, capabilities: HardwareCapabilities) -> Self {
        Self {
            target: target.into(),
            capabilities,
        }
    }

    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::new(
            manifest.config.target.clone(),
            HardwareCapabilities {
                supported_ops: manifest.hardware.supported_ops.iter().cloned().collect(),
                memory_gb: manifest.hardware.memory_gb,
            },
        )
    }
}

impl HardwareAbstraction for StaticHal {
    fn target(&self) -> &str {
        &self.target
    }

    fn capabilities(&self) -> HardwareCapabilities {
        debug!(target = %self.target, "querying hardware capabilities");
        self.capabilities.clone()
    }
}
