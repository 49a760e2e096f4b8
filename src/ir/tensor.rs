// src/ir/tensor.rs

use crate::ir::ids::{OperatorId, TensorId};

/// A typed, shaped data node in the dataflow graph.
///
/// `producer` and `consumers` are maintained by [`Graph`](crate::ir::Graph)
/// once the tensor is inserted; callers normally leave them empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorNode {
    pub id: TensorId,
    /// Human-readable label; not required to be unique.
    pub name: String,
    /// Dimension sizes. Empty for scalars.
    pub shape: Vec<usize>,
    /// Element type tag, e.g. `"float32"`.
    pub dtype: String,
    /// The single operator writing this tensor, if any.
    pub producer: Option<OperatorId>,
    /// Operators reading this tensor, each listed once, in the order they
    /// were added to the graph.
    pub consumers: Vec<OperatorId>,
}

impl TensorNode {
    pub fn new(
        id: impl Into<TensorId>,
        name: impl Into<String>,
        shape: Vec<usize>,
        dtype: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            shape,
            dtype: dtype.into(),
            producer: None,
            consumers: Vec::new(),
        }
    }

    /// Declare the tensor as already owned by `producer`.
    ///
    /// The graph accepts this at insertion; the named operator can then
    /// claim the tensor as an output without a producer conflict.
    pub fn with_producer(mut self, producer: impl Into<OperatorId>) -> Self {
        self.producer = Some(producer.into());
        self
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Total number of elements (1 for scalars), or `None` if the count
    /// does not fit in a `u64`.
    pub fn num_elements(&self) -> Option<u64> {
        self.shape
            .iter()
            .try_fold(1u64, |acc, &dim| acc.checked_mul(u64::try_from(dim).ok()?))
    }

    pub fn is_consumed_by(&self, op: &OperatorId) -> bool {
        self.consumers.contains(op)
    }
}
