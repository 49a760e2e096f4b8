// src/ir/graph.rs

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::errors::{GraphError, InterfaceRole, NodeKind};
use crate::ir::ids::{OperatorId, TensorId};
use crate::ir::operator::OperatorNode;
use crate::ir::schedule;
use crate::ir::tensor::TensorNode;

/// Outcome of [`Graph::remove_operator`].
///
/// Removing an operator that is not in the graph is not an error, but it is
/// reported distinctly so callers can tell "nothing happened" apart from a
/// successful removal.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Removal {
    /// The operator was unlinked and dropped; its record is handed back.
    Removed(OperatorNode),
    /// No operator with that id; the graph was left untouched.
    NotFound,
}

impl Removal {
    pub fn is_removed(&self) -> bool {
        matches!(self, Removal::Removed(_))
    }
}

/// Dataflow graph of tensors and operators.
///
/// The graph exclusively owns both node tables. Nodes refer to each other
/// only through [`TensorId`] / [`OperatorId`] handles resolved here, and
/// every mutation goes through `&mut self` so the producer/consumer links
/// and the cached schedule stay consistent.
///
/// Iteration follows insertion order for both tables, which is what makes
/// scheduling reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct Graph {
    name: String,
    tensors: HashMap<TensorId, TensorNode>,
    tensor_order: Vec<TensorId>,
    operators: HashMap<OperatorId, OperatorNode>,
    operator_order: Vec<OperatorId>,
    input_ids: Vec<TensorId>,
    output_ids: Vec<TensorId>,
    /// Cached topological order; `None` whenever a mutation may have
    /// changed the dependency structure.
    schedule: Option<Vec<OperatorId>>,
}

impl Graph {
    /// Create an empty graph.
    ///
    /// `input_ids` / `output_ids` may name tensors that are added later; they
    /// must all resolve before the graph is scheduled or frozen.
    pub fn new(
        name: impl Into<String>,
        input_ids: Vec<TensorId>,
        output_ids: Vec<TensorId>,
    ) -> Self {
        Self {
            name: name.into(),
            tensors: HashMap::new(),
            tensor_order: Vec::new(),
            operators: HashMap::new(),
            operator_order: Vec::new(),
            input_ids,
            output_ids,
            schedule: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn input_ids(&self) -> &[TensorId] {
        &self.input_ids
    }

    pub fn output_ids(&self) -> &[TensorId] {
        &self.output_ids
    }

    pub fn tensor_count(&self) -> usize {
        self.tensors.len()
    }

    pub fn operator_count(&self) -> usize {
        self.operators.len()
    }

    /// Insert a tensor. Only the id is checked.
    pub fn add_tensor(&mut self, tensor: TensorNode) -> Result<(), GraphError> {
        if self.tensors.contains_key(&tensor.id) {
            return Err(GraphError::DuplicateId {
                kind: NodeKind::Tensor,
                id: tensor.id.to_string(),
            });
        }

        debug!(graph = %self.name, tensor = %tensor.id, shape = ?tensor.shape, "added tensor");
        self.tensor_order.push(tensor.id.clone());
        self.tensors.insert(tensor.id.clone(), tensor);
        Ok(())
    }

    /// Insert an operator and link it to the tensors it references.
    ///
    /// Every check runs before anything is mutated, so an `Err` leaves the
    /// graph exactly as it was.
    pub fn add_operator(&mut self, operator: OperatorNode) -> Result<(), GraphError> {
        if self.operators.contains_key(&operator.id) {
            return Err(GraphError::DuplicateId {
                kind: NodeKind::Operator,
                id: operator.id.to_string(),
            });
        }

        for tensor_id in operator.referenced_tensors() {
            if !self.tensors.contains_key(tensor_id) {
                return Err(GraphError::UnknownTensor {
                    operator: operator.id.clone(),
                    tensor: tensor_id.clone(),
                });
            }
        }

        for tensor_id in operator.output_tensor_ids.iter() {
            let existing = self.tensors.get(tensor_id).and_then(|t| t.producer.as_ref());
            if let Some(existing) = existing {
                if *existing != operator.id {
                    return Err(GraphError::ConflictingProducer {
                        tensor: tensor_id.clone(),
                        existing: existing.clone(),
                        claimant: operator.id.clone(),
                    });
                }
            }
        }

        for tensor_id in operator.input_tensor_ids.iter() {
            if let Some(tensor) = self.tensors.get_mut(tensor_id) {
                if !tensor.is_consumed_by(&operator.id) {
                    tensor.consumers.push(operator.id.clone());
                }
            }
        }

        for tensor_id in operator.output_tensor_ids.iter() {
            if let Some(tensor) = self.tensors.get_mut(tensor_id) {
                tensor.producer = Some(operator.id.clone());
            }
        }

        debug!(
            graph = %self.name,
            operator = %operator.id,
            op_type = %operator.op_type,
            inputs = operator.input_tensor_ids.len(),
            outputs = operator.output_tensor_ids.len(),
            "added operator"
        );

        self.operator_order.push(operator.id.clone());
        self.operators.insert(operator.id.clone(), operator);
        self.invalidate_schedule();
        Ok(())
    }

    /// Remove an operator, clearing every link that pointed at it.
    ///
    /// Output tensors it produced stay in the graph without a producer
    /// (orphaned); they are not deleted.
    pub fn remove_operator(&mut self, id: &OperatorId) -> Removal {
        let Some(operator) = self.operators.remove(id) else {
            warn!(graph = %self.name, operator = %id, "operator not found; nothing removed");
            return Removal::NotFound;
        };

        self.operator_order.retain(|op| op != id);

        for tensor_id in operator.input_tensor_ids.iter() {
            if let Some(tensor) = self.tensors.get_mut(tensor_id) {
                tensor.consumers.retain(|c| c != id);
            }
        }

        for tensor_id in operator.output_tensor_ids.iter() {
            if let Some(tensor) = self.tensors.get_mut(tensor_id) {
                if tensor.producer.as_ref() == Some(id) {
                    tensor.producer = None;
                    debug!(tensor = %tensor_id, "tensor orphaned by operator removal");
                }
            }
        }

        self.invalidate_schedule();
        info!(graph = %self.name, operator = %id, "operator removed from graph");
        Removal::Removed(operator)
    }

    pub fn contains_tensor(&self, id: &TensorId) -> bool {
        self.tensors.contains_key(id)
    }

    pub fn contains_operator(&self, id: &OperatorId) -> bool {
        self.operators.contains_key(id)
    }

    pub fn get_tensor(&self, id: &TensorId) -> Result<&TensorNode, GraphError> {
        self.tensors
            .get(id)
            .ok_or_else(|| GraphError::tensor_not_found(id))
    }

    pub fn get_operator(&self, id: &OperatorId) -> Result<&OperatorNode, GraphError> {
        self.operators
            .get(id)
            .ok_or_else(|| GraphError::operator_not_found(id))
    }

    /// First tensor (in insertion order) carrying `name`.
    pub fn get_tensor_by_name(&self, name: &str) -> Option<&TensorNode> {
        self.tensors().find(|t| t.name == name)
    }

    /// First operator (in insertion order) carrying `name`.
    pub fn get_operator_by_name(&self, name: &str) -> Option<&OperatorNode> {
        self.operators().find(|op| op.name == name)
    }

    /// Tensors in insertion order.
    pub fn tensors(&self) -> impl Iterator<Item = &TensorNode> {
        self.tensor_order.iter().filter_map(|id| self.tensors.get(id))
    }

    /// Operators in insertion order.
    pub fn operators(&self) -> impl Iterator<Item = &OperatorNode> {
        self.operator_order
            .iter()
            .filter_map(|id| self.operators.get(id))
    }

    /// Resolve the declared graph inputs to their tensors.
    pub fn graph_inputs(&self) -> Result<Vec<&TensorNode>, GraphError> {
        self.input_ids.iter().map(|id| self.get_tensor(id)).collect()
    }

    /// Resolve the declared graph outputs to their tensors.
    pub fn graph_outputs(&self) -> Result<Vec<&TensorNode>, GraphError> {
        self.output_ids.iter().map(|id| self.get_tensor(id)).collect()
    }

    /// Check that every declared graph input/output names an existing tensor.
    pub fn ensure_interface_resolved(&self) -> Result<(), GraphError> {
        let declared = self
            .input_ids
            .iter()
            .map(|id| (InterfaceRole::Input, id))
            .chain(self.output_ids.iter().map(|id| (InterfaceRole::Output, id)));

        for (role, id) in declared {
            if !self.tensors.contains_key(id) {
                return Err(GraphError::UnresolvedInterface {
                    role,
                    id: id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Operator ids in a dependency-respecting order (producers before
    /// consumers), computed with Kahn's algorithm and cached until the next
    /// `add_operator` / `remove_operator`.
    ///
    /// Fails with [`GraphError::CycleDetected`] rather than returning a
    /// partial order, and with [`GraphError::UnresolvedInterface`] if a
    /// declared graph input/output was never added.
    pub fn topologically_sort_operators(&mut self) -> Result<&[OperatorId], GraphError> {
        self.ensure_interface_resolved()?;

        let order = match self.schedule.take() {
            Some(order) => order,
            None => {
                let order = schedule::kahn_order(self)?;
                info!(
                    graph = %self.name,
                    operators = order.len(),
                    "topological sort successful"
                );
                order
            }
        };

        Ok(self.schedule.insert(order).as_slice())
    }

    /// Same order as [`Graph::topologically_sort_operators`], computed
    /// fresh without touching the cache.
    pub fn compute_topological_order(&self) -> Result<Vec<OperatorId>, GraphError> {
        self.ensure_interface_resolved()?;
        schedule::kahn_order(self)
    }

    /// Operator ids in insertion order.
    pub(crate) fn operator_ids(&self) -> &[OperatorId] {
        &self.operator_order
    }

    pub(crate) fn tensor(&self, id: &TensorId) -> Option<&TensorNode> {
        self.tensors.get(id)
    }

    pub(crate) fn operator(&self, id: &OperatorId) -> Option<&OperatorNode> {
        self.operators.get(id)
    }

    fn invalidate_schedule(&mut self) {
        if self.schedule.take().is_some() {
            debug!(graph = %self.name, "cached topological order invalidated");
        }
    }
}
