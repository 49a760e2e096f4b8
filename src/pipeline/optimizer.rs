// src/pipeline/optimizer.rs

use tracing::{info, warn};

use crate::errors::Result;
use crate::ir::Graph;

/// A graph-to-graph stage run between parsing and code generation.
pub trait Optimizer {
    fn name(&self) -> &str;
    fn optimize(&self, graph: Graph) -> Result<Graph>;
}

/// Leaves the graph structurally untouched, but checks that it is
/// consistent and schedulable so later stages start from a known-good graph.
/// The computed order stays cached on the graph.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughOptimizer;

impl Optimizer for PassThroughOptimizer {
    fn name(&self) -> &str {
        "pass-through"
    }

    fn optimize(&self, mut graph: Graph) -> Result<Graph> {
        let report = graph.validate();
        if !report.is_ok() {
            warn!(graph = %graph.name(), "optimizer received an inconsistent graph:\n{report}");
        }

        let scheduled = graph.topologically_sort_operators()?.len();
        info!(
            graph = %graph.name(),
            optimizer = self.name(),
            operators = scheduled,
            "graph optimized"
        );
        Ok(graph)
    }
}
