// src/pipeline/parser.rs

use tracing::info;

use crate::config::Manifest;
use crate::errors::Result;
use crate::ir::Graph;

/// Builds a [`Graph`] from some model description.
pub trait ModelParser {
    fn parse(&self, manifest: &Manifest) -> Result<Graph>;
}

/// Builds the graph straight from the manifest's `[[tensor]]` and
/// `[[operator]]` tables, in declaration order: every tensor is added before
/// any operator, so operators may reference tensors declared after them in
/// the file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestParser;

impl ModelParser for ManifestParser {
    fn parse(&self, manifest: &Manifest) -> Result<Graph> {
        let mut graph = Graph::new(
            manifest.graph.name.clone(),
            manifest.graph.inputs.clone(),
            manifest.graph.outputs.clone(),
        );

        for spec in manifest.tensor.iter() {
            graph.add_tensor(spec.to_node())?;
        }
        for spec in manifest.operator.iter() {
            graph.add_operator(spec.to_node())?;
        }

        info!(
            graph = %graph.name(),
            tensors = graph.tensor_count(),
            operators = graph.operator_count(),
            "model parsed into graph"
        );
        Ok(graph)
    }
}
