// src/pipeline/mod.rs

//! Compilation pipeline: parse → optimize → capability query → codegen.
//!
//! Each stage is a trait so the graph can be driven by other front ends,
//! passes or targets; [`Pipeline::from_manifest`] wires the default ones.

pub mod codegen;
pub mod hal;
pub mod optimizer;
pub mod parser;

use tracing::info;

use crate::config::Manifest;
use crate::errors::Result;

pub use codegen::{Artifact, CodeGenerator, EmittedOp, ScheduleCodeGenerator};
pub use hal::{HardwareAbstraction, HardwareCapabilities, StaticHal};
pub use optimizer::{Optimizer, PassThroughOptimizer};
pub use parser::{ManifestParser, ModelParser};

/// The four collaborating stages around the IR graph.
pub struct Pipeline {
    parser: Box<dyn ModelParser>,
    optimizer: Box<dyn Optimizer>,
    hal: Box<dyn HardwareAbstraction>,
    codegen: Box<dyn CodeGenerator>,
}

impl Pipeline {
    pub fn new(
        parser: impl ModelParser + 'static,
        optimizer: impl Optimizer + 'static,
        hal: impl HardwareAbstraction + 'static,
        codegen: impl CodeGenerator + 'static,
    ) -> Self {
        Self {
            parser: Box::new(parser),
            optimizer: Box::new(optimizer),
            hal: Box::new(hal),
            codegen: Box::new(codegen),
        }
    }

    /// Default stages configured from the manifest.
    pub fn from_manifest(manifest: &Manifest) -> Self {
        Self::new(
            ManifestParser,
            PassThroughOptimizer,
            StaticHal::from_manifest(manifest),
            ScheduleCodeGenerator::new(manifest.config.output_dir.clone()),
        )
    }

    /// Run every stage in order and return the generated artifact.
    pub fn run(&self, manifest: &Manifest) -> Result<Artifact> {
        info!(
            graph = %manifest.graph.name,
            target = %self.hal.target(),
            "starting compilation"
        );

        let graph = self.parser.parse(manifest)?;
        let mut graph = self.optimizer.optimize(graph)?;

        let capabilities = self.hal.capabilities();
        info!(
            target = %self.hal.target(),
            supported_ops = ?capabilities.supported_ops,
            memory_gb = capabilities.memory_gb,
            "target hardware capabilities"
        );

        let artifact = self.codegen.generate(&mut graph, self.hal.as_ref())?;
        info!(artifact = %artifact.path.display(), "compilation successful");
        Ok(artifact)
    }
}

/// Compile a manifest with the default stages.
pub fn compile(manifest: &Manifest) -> Result<Artifact> {
    Pipeline::from_manifest(manifest).run(manifest)
}
