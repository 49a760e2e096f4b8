use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use neuroforge::ir::{Graph, OperatorId};
use neuroforge_test_utils::builders::{operator, GraphBuilder};

/// (reads, insertion position) per operator. We ensure acyclicity by only
/// letting operator N read the outputs of operators 0..N-1; the operators
/// are then inserted in a shuffled order so the schedule has to reorder them.
type DagShape = (Vec<Vec<usize>>, Vec<usize>);

fn dag_strategy(max_ops: usize) -> impl Strategy<Value = DagShape> {
    (1..=max_ops).prop_flat_map(|num_ops| {
        let reads = proptest::collection::vec(
            proptest::collection::vec(any::<usize>(), 0..4),
            num_ops,
        )
        .prop_map(|raw| {
            raw.into_iter()
                .enumerate()
                .map(|(i, picks)| {
                    // Sanitize: only tensors written by earlier operators.
                    if i == 0 {
                        Vec::new()
                    } else {
                        picks.into_iter().map(|p| p % i).collect()
                    }
                })
                .collect::<Vec<_>>()
        });
        let order = Just((0..num_ops).collect::<Vec<_>>()).prop_shuffle();
        (reads, order)
    })
}

fn build((reads, order): &DagShape) -> Graph {
    let tensors: Vec<String> = (0..reads.len()).map(|i| format!("t{i}")).collect();
    let mut builder = GraphBuilder::new("random").tensor("src");
    for t in tensors.iter() {
        builder = builder.tensor(t);
    }

    for &i in order.iter() {
        let mut inputs: Vec<&str> = vec!["src"];
        inputs.extend(reads[i].iter().map(|&j| tensors[j].as_str()));
        let id = format!("op{i}");
        builder = builder.operator(operator(&id, "generic", &inputs, &[tensors[i].as_str()]));
    }
    builder.build()
}

proptest! {
    #[test]
    fn schedule_is_a_linearization(shape in dag_strategy(12)) {
        let mut graph = build(&shape);
        prop_assert!(graph.validate().is_ok());

        let schedule = graph.topologically_sort_operators().unwrap().to_vec();
        prop_assert_eq!(schedule.len(), graph.operator_count());

        let unique: HashSet<&OperatorId> = schedule.iter().collect();
        prop_assert_eq!(unique.len(), schedule.len());

        let position: HashMap<&OperatorId, usize> =
            schedule.iter().enumerate().map(|(i, id)| (id, i)).collect();
        for op in graph.operators() {
            for input in op.input_tensor_ids.iter() {
                if let Some(producer) = graph.get_tensor(input).unwrap().producer.as_ref() {
                    prop_assert!(position[producer] < position[&op.id]);
                }
            }
        }
    }

    #[test]
    fn schedule_is_deterministic(shape in dag_strategy(12)) {
        let first = build(&shape).topologically_sort_operators().unwrap().to_vec();
        let second = build(&shape).topologically_sort_operators().unwrap().to_vec();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn removing_an_operator_keeps_graph_valid(shape in dag_strategy(12), pick in any::<usize>()) {
        let mut graph = build(&shape);
        let victim = OperatorId::from(format!("op{}", pick % shape.0.len()));

        prop_assert!(graph.remove_operator(&victim).is_removed());
        prop_assert!(graph.validate().is_ok());
        prop_assert_eq!(
            graph.topologically_sort_operators().unwrap().len(),
            shape.0.len() - 1
        );
    }
}
