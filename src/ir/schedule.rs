// src/ir/schedule.rs

//! Topological scheduling of operators (Kahn's algorithm).
//!
//! Edge policy: operator A has one edge to operator B for every *distinct*
//! output tensor of A that B reads. Two different tensors flowing from A to
//! B therefore count twice towards B's in-degree and are decremented twice.
//! A tensor read at several input positions of B still counts once, since
//! consumers are a set.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, warn};

use crate::errors::GraphError;
use crate::ir::graph::Graph;
use crate::ir::ids::{OperatorId, TensorId};

/// Dependency structure derived from producer/consumer links, indexed by
/// operator insertion position.
#[derive(Debug)]
struct DependencyGraph<'g> {
    operators: &'g [OperatorId],
    in_degree: Vec<usize>,
    successors: Vec<Vec<usize>>,
}

impl<'g> DependencyGraph<'g> {
    fn build(graph: &'g Graph) -> Self {
        let operators = graph.operator_ids();
        let position: HashMap<&OperatorId, usize> = operators
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();

        let mut in_degree = vec![0usize; operators.len()];
        let mut successors = vec![Vec::new(); operators.len()];

        for (from, op_id) in operators.iter().enumerate() {
            let Some(op) = graph.operator(op_id) else {
                continue;
            };

            let mut seen: HashSet<&TensorId> = HashSet::new();
            for tensor_id in op.output_tensor_ids.iter() {
                if !seen.insert(tensor_id) {
                    continue;
                }
                let Some(tensor) = graph.tensor(tensor_id) else {
                    continue;
                };

                for consumer in tensor.consumers.iter() {
                    let Some(&to) = position.get(consumer) else {
                        continue;
                    };
                    let reads = graph
                        .operator(consumer)
                        .is_some_and(|c| c.reads(tensor_id));
                    if !reads {
                        continue;
                    }
                    successors[from].push(to);
                    in_degree[to] += 1;
                }
            }
        }

        Self {
            operators,
            in_degree,
            successors,
        }
    }

    /// Operators (by position) that lie on a cycle among `remaining`.
    fn cycle_members(&self, remaining: &[usize]) -> Vec<usize> {
        let mut dg: DiGraph<usize, ()> = DiGraph::new();
        let mut index: HashMap<usize, NodeIndex> = HashMap::new();

        for &pos in remaining {
            index.insert(pos, dg.add_node(pos));
        }
        for &pos in remaining {
            for succ in self.successors[pos].iter() {
                if let (Some(&a), Some(&b)) = (index.get(&pos), index.get(succ)) {
                    dg.update_edge(a, b, ());
                }
            }
        }

        let mut members: Vec<usize> = tarjan_scc(&dg)
            .into_iter()
            .filter(|scc| scc.len() > 1 || dg.contains_edge(scc[0], scc[0]))
            .flatten()
            .map(|node| dg[node])
            .collect();
        members.sort_unstable();
        members
    }
}

/// Order every operator of `graph` so producers precede consumers.
///
/// Ties between ready operators are broken by insertion order (the frontier
/// is seeded in insertion order and processed FIFO), so the same insertion
/// sequence always yields the same schedule.
pub(crate) fn kahn_order(graph: &Graph) -> Result<Vec<OperatorId>, GraphError> {
    let deps = DependencyGraph::build(graph);
    let total = deps.operators.len();
    let mut in_degree = deps.in_degree.clone();

    let mut frontier: VecDeque<usize> = (0..total).filter(|&i| in_degree[i] == 0).collect();
    let mut order: Vec<usize> = Vec::with_capacity(total);

    while let Some(current) = frontier.pop_front() {
        order.push(current);
        for &succ in deps.successors[current].iter() {
            in_degree[succ] -= 1;
            if in_degree[succ] == 0 {
                frontier.push_back(succ);
            }
        }
    }

    if order.len() < total {
        let remaining: Vec<usize> = (0..total).filter(|&i| in_degree[i] > 0).collect();
        let cycle = deps.cycle_members(&remaining);
        let to_ids = |positions: &[usize]| -> Vec<OperatorId> {
            positions.iter().map(|&i| deps.operators[i].clone()).collect()
        };

        warn!(
            graph = %graph.name(),
            scheduled = order.len(),
            total,
            "topological sort incomplete; graph contains a cycle"
        );

        return Err(GraphError::CycleDetected {
            scheduled: order.len(),
            total,
            unscheduled: to_ids(&remaining),
            cycle: to_ids(&cycle),
        });
    }

    debug!(graph = %graph.name(), operators = total, "kahn order computed");
    Ok(order.into_iter().map(|i| deps.operators[i].clone()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{OperatorNode, TensorNode};

    fn build(tensors: &[&str], ops: &[(&str, &[&str], &[&str])]) -> Graph {
        let mut g = Graph::new("sched", vec![], vec![]);
        for id in tensors {
            g.add_tensor(TensorNode::new(*id, *id, vec![], "float32")).unwrap();
        }
        for (id, ins, outs) in ops {
            g.add_operator(OperatorNode::new(
                *id,
                *id,
                "generic",
                ins.iter().map(|s| TensorId::from(*s)).collect(),
                outs.iter().map(|s| TensorId::from(*s)).collect(),
            ))
            .unwrap();
        }
        g
    }

    #[test]
    fn empty_graph_has_empty_order() {
        let g = Graph::new("empty", vec![], vec![]);
        assert!(kahn_order(&g).unwrap().is_empty());
    }

    #[test]
    fn independent_operators_keep_insertion_order() {
        let g = build(
            &["a", "b", "c", "x", "y", "z"],
            &[("z_op", &["c"], &["z"]), ("x_op", &["a"], &["x"]), ("y_op", &["b"], &["y"])],
        );
        assert_eq!(kahn_order(&g).unwrap(), vec!["z_op", "x_op", "y_op"]);
    }

    #[test]
    fn diamond_is_ordered_fifo() {
        //      top
        //     /   \
        //  left   right
        //     \   /
        //     bottom
        let g = build(
            &["in", "t", "l", "r", "out"],
            &[
                ("top", &["in"], &["t"]),
                ("left", &["t"], &["l"]),
                ("right", &["t"], &["r"]),
                ("bottom", &["l", "r"], &["out"]),
            ],
        );
        assert_eq!(kahn_order(&g).unwrap(), vec!["top", "left", "right", "bottom"]);
    }

    #[test]
    fn multiple_tensors_between_same_pair_count_per_tensor() {
        let g = build(
            &["in", "p", "q", "out"],
            &[("split", &["in"], &["p", "q"]), ("join", &["p", "q"], &["out"])],
        );
        let deps = DependencyGraph::build(&g);
        assert_eq!(deps.in_degree, vec![0, 2]);
        assert_eq!(deps.successors[0], vec![1, 1]);
        assert_eq!(kahn_order(&g).unwrap(), vec!["split", "join"]);
    }

    #[test]
    fn repeated_input_counts_once() {
        let g = build(
            &["in", "p", "out"],
            &[("f", &["in"], &["p"]), ("square", &["p", "p"], &["out"])],
        );
        let deps = DependencyGraph::build(&g);
        assert_eq!(deps.in_degree, vec![0, 1]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = build(&["s"], &[("loop", &["s"], &["s"])]);
        match kahn_order(&g) {
            Err(GraphError::CycleDetected {
                scheduled,
                total,
                cycle,
                ..
            }) => {
                assert_eq!(scheduled, 0);
                assert_eq!(total, 1);
                assert_eq!(cycle, vec!["loop"]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }

    #[test]
    fn cycle_report_separates_downstream_operators() {
        // src -> a <-> b -> tail
        let g = build(
            &["in", "s", "ab", "ba", "out"],
            &[
                ("src", &["in"], &["s"]),
                ("a", &["s", "ba"], &["ab"]),
                ("b", &["ab"], &["ba"]),
                ("tail", &["ab"], &["out"]),
            ],
        );
        match kahn_order(&g) {
            Err(GraphError::CycleDetected {
                scheduled,
                total,
                unscheduled,
                cycle,
            }) => {
                assert_eq!(scheduled, 1);
                assert_eq!(total, 4);
                assert_eq!(unscheduled, vec!["a", "b", "tail"]);
                assert_eq!(cycle, vec!["a", "b"]);
            }
            other => panic!("expected CycleDetected, got {other:?}"),
        }
    }
}
