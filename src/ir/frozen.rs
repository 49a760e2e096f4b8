// src/ir/frozen.rs

use crate::errors::GraphError;
use crate::ir::graph::Graph;
use crate::ir::ids::OperatorId;
use crate::ir::operator::OperatorNode;

/// Read-only snapshot of a [`Graph`] with its schedule computed up front.
///
/// A frozen graph has no interior mutability, so it is `Send + Sync` and can
/// be shared (e.g. behind an `Arc`) by passes that only read. Call
/// [`FrozenGraph::thaw`] to get the mutable graph back.
#[derive(Debug, Clone, PartialEq)]
pub struct FrozenGraph {
    graph: Graph,
    schedule: Vec<OperatorId>,
}

impl Graph {
    /// Schedule the graph and seal it against mutation.
    pub fn freeze(mut self) -> Result<FrozenGraph, GraphError> {
        let schedule = self.topologically_sort_operators()?.to_vec();
        Ok(FrozenGraph {
            graph: self,
            schedule,
        })
    }
}

impl FrozenGraph {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Operator ids in topological order.
    pub fn schedule(&self) -> &[OperatorId] {
        &self.schedule
    }

    /// Operators in topological order.
    pub fn scheduled_operators(&self) -> impl Iterator<Item = &OperatorNode> {
        self.schedule
            .iter()
            .filter_map(|id| self.graph.operator(id))
    }

    pub fn thaw(self) -> Graph {
        self.graph
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::ir::{TensorId, TensorNode};

    fn assert_send_sync<T: Send + Sync>() {}

    fn unary(id: &str, op_type: &str, input: &str, output: &str) -> OperatorNode {
        OperatorNode::new(
            id,
            id,
            op_type,
            vec![TensorId::from(input)],
            vec![TensorId::from(output)],
        )
    }

    fn chain() -> Graph {
        let mut g = Graph::new("chain", vec!["a".into()], vec!["c".into()]);
        for id in ["a", "b", "c"] {
            g.add_tensor(TensorNode::new(id, id, vec![8], "float32")).unwrap();
        }
        g.add_operator(unary("g", "relu", "b", "c")).unwrap();
        g.add_operator(unary("f", "dense", "a", "b")).unwrap();
        g
    }

    #[test]
    fn frozen_graph_is_shareable_across_threads() {
        assert_send_sync::<FrozenGraph>();

        let frozen = Arc::new(chain().freeze().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let view = Arc::clone(&frozen);
                thread::spawn(move || {
                    view.scheduled_operators()
                        .map(|op| op.op_type.clone())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), vec!["dense", "relu"]);
        }
    }

    #[test]
    fn thaw_returns_the_same_graph() {
        let frozen = chain().freeze().unwrap();
        assert_eq!(frozen.schedule(), ["f", "g"]);
        assert_eq!(frozen.graph().operator_count(), 2);

        let mut g = frozen.thaw();
        assert!(g.remove_operator(&"g".into()).is_removed());
        assert_eq!(g.topologically_sort_operators().unwrap(), ["f"]);
    }

    #[test]
    fn freezing_a_cyclic_graph_fails() {
        let mut g = Graph::new("cyclic", vec![], vec![]);
        g.add_tensor(TensorNode::new("x", "x", vec![], "int32")).unwrap();
        g.add_operator(unary("loop", "add", "x", "x")).unwrap();
        assert!(matches!(g.freeze(), Err(GraphError::CycleDetected { .. })));
    }
}
