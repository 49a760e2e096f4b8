// src/pipeline/codegen.rs

use std::path::PathBuf;

use tracing::{debug, info};

use crate::errors::{NeuroforgeError, Result};
use crate::ir::{Graph, OperatorId};
use crate::pipeline::hal::HardwareAbstraction;

/// One operator as handed to the target, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedOp {
    pub operator: OperatorId,
    pub op_type: String,
}

/// Reference to the generated output for one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub target: String,
    pub schedule: Vec<EmittedOp>,
    /// Bytes of tensor storage the graph needs, over tensors with a known
    /// element type.
    pub tensor_bytes: u64,
}

/// Turns a scheduled graph into an artifact for one target.
pub trait CodeGenerator {
    fn generate(&self, graph: &mut Graph, hal: &dyn HardwareAbstraction) -> Result<Artifact>;
}

/// Walks the topological order, checks every operator against the target's
/// capabilities and reports where the binary for the target goes.
#[derive(Debug, Clone)]
pub struct ScheduleCodeGenerator {
    output_dir: PathBuf,
}

impl ScheduleCodeGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    fn artifact_path(&self, target: &str) -> PathBuf {
        self.output_dir.join(format!("output_binary_{target}.bin"))
    }
}

impl CodeGenerator for ScheduleCodeGenerator {
    fn generate(&self, graph: &mut Graph, hal: &dyn HardwareAbstraction) -> Result<Artifact> {
        let target = hal.target().to_string();
        let capabilities = hal.capabilities();
        info!(graph = %graph.name(), target = %target, "generating code");

        let order = graph.topologically_sort_operators()?.to_vec();

        let mut schedule = Vec::with_capacity(order.len());
        for id in order {
            let op = graph.get_operator(&id)?;
            if !capabilities.supports(&op.op_type) {
                return Err(NeuroforgeError::UnsupportedOperator {
                    operator: id,
                    op_type: op.op_type.clone(),
                    target,
                });
            }
            debug!(operator = %id, op_type = %op.op_type, "emitting operator");
            schedule.push(EmittedOp {
                op_type: op.op_type.clone(),
                operator: id,
            });
        }

        let tensor_bytes = tensor_footprint(graph);
        let available = capabilities.memory_bytes();
        if tensor_bytes > available {
            return Err(NeuroforgeError::InsufficientMemory {
                target,
                required: tensor_bytes,
                available,
            });
        }

        let path = self.artifact_path(&target);
        info!(path = %path.display(), operators = schedule.len(), "code generated");
        Ok(Artifact {
            path,
            target,
            schedule,
            tensor_bytes,
        })
    }
}

/// Size in bytes of one element of `dtype`, for the tags we recognise.
pub fn dtype_size(dtype: &str) -> Option<u64> {
    match dtype {
        "bool" | "boolean" | "int8" | "uint8" => Some(1),
        "float16" | "bfloat16" | "int16" | "uint16" => Some(2),
        "float32" | "int32" | "uint32" => Some(4),
        "float64" | "int64" | "uint64" => Some(8),
        _ => None,
    }
}

/// Total tensor storage in bytes. A tensor whose byte size overflows `u64`
/// saturates the total, so it can never fit a target.
fn tensor_footprint(graph: &Graph) -> u64 {
    graph
        .tensors()
        .map(|t| match dtype_size(&t.dtype) {
            Some(size) => match t.num_elements().and_then(|n| n.checked_mul(size)) {
                Some(bytes) => bytes,
                None => {
                    debug!(tensor = %t.id, shape = ?t.shape, "tensor size overflows u64");
                    u64::MAX
                }
            },
            None => {
                debug!(tensor = %t.id, dtype = %t.dtype, "unknown dtype; not counted in footprint");
                0
            }
        })
        .fold(0u64, u64::saturating_add)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::ir::{OperatorNode, TensorId, TensorNode};
    use crate::pipeline::hal::{HardwareCapabilities, StaticHal};

    fn hal(ops: &[&str], memory_gb: u64) -> StaticHal {
        StaticHal::new(
            "dpu_v1",
            HardwareCapabilities {
                supported_ops: ops.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
                memory_gb,
            },
        )
    }

    fn relu_graph(shape: Vec<usize>) -> Graph {
        let mut g = Graph::new("g", vec!["x".into()], vec!["y".into()]);
        g.add_tensor(TensorNode::new("x", "x", shape.clone(), "float32")).unwrap();
        g.add_tensor(TensorNode::new("y", "y", shape, "float32")).unwrap();
        g.add_operator(OperatorNode::new(
            "act",
            "act",
            "relu",
            vec![TensorId::from("x")],
            vec![TensorId::from("y")],
        ))
        .unwrap();
        g
    }

    #[test]
    fn emits_schedule_and_artifact_path() {
        let mut g = relu_graph(vec![2, 3]);
        let artifact = ScheduleCodeGenerator::new("out")
            .generate(&mut g, &hal(&["relu"], 1))
            .unwrap();

        assert_eq!(artifact.path, PathBuf::from("out/output_binary_dpu_v1.bin"));
        assert_eq!(artifact.target, "dpu_v1");
        assert_eq!(
            artifact.schedule,
            vec![EmittedOp {
                operator: "act".into(),
                op_type: "relu".into()
            }]
        );
        assert_eq!(artifact.tensor_bytes, 2 * 6 * 4);
    }

    #[test]
    fn unsupported_operator_is_rejected() {
        let mut g = relu_graph(vec![1]);
        let err = ScheduleCodeGenerator::new(".")
            .generate(&mut g, &hal(&["conv2d"], 1))
            .unwrap_err();
        assert!(matches!(
            err,
            NeuroforgeError::UnsupportedOperator { ref op_type, .. } if op_type == "relu"
        ));
    }

    #[test]
    fn oversized_graph_is_rejected() {
        let mut g = relu_graph(vec![1 << 20, 1 << 10]);
        let err = ScheduleCodeGenerator::new(".")
            .generate(&mut g, &hal(&["relu"], 1))
            .unwrap_err();
        assert!(matches!(err, NeuroforgeError::InsufficientMemory { .. }));
    }

    #[test]
    fn overflowing_shape_is_insufficient_memory() {
        let mut g = relu_graph(vec![1 << 32, 1 << 32, 16]);
        let err = ScheduleCodeGenerator::new(".")
            .generate(&mut g, &hal(&["relu"], 2))
            .unwrap_err();
        match err {
            NeuroforgeError::InsufficientMemory {
                required,
                available,
                ..
            } => {
                assert_eq!(required, u64::MAX);
                assert_eq!(available, 2 << 30);
            }
            other => panic!("expected InsufficientMemory, got {other:?}"),
        }
    }

    #[test]
    fn dtype_sizes() {
        assert_eq!(dtype_size("float32"), Some(4));
        assert_eq!(dtype_size("bfloat16"), Some(2));
        assert_eq!(dtype_size("complex64"), None);
    }
}
