// src/ir/validate.rs

//! Post-construction consistency checks.
//!
//! Validation re-derives every cross reference from scratch instead of
//! trusting the mutation paths, and reports what it finds as data. It never
//! fails or panics: a broken graph still produces a report.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, warn};

use crate::errors::InterfaceRole;
use crate::ir::graph::Graph;
use crate::ir::ids::{OperatorId, TensorId};

/// A single broken invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// An operator lists a tensor id that is not in the graph.
    MissingTensor { operator: OperatorId, tensor: TensorId },
    /// A tensor's producer is not in the graph.
    MissingProducer { tensor: TensorId, producer: OperatorId },
    /// A tensor's producer does not list the tensor among its outputs.
    ProducerMismatch { tensor: TensorId, producer: OperatorId },
    /// An operator lists a tensor as output but the tensor records a
    /// different (or no) producer.
    UnrecordedProducer { tensor: TensorId, operator: OperatorId },
    /// More than one operator lists the tensor as an output.
    MultipleProducers { tensor: TensorId, operators: Vec<OperatorId> },
    /// A tensor's consumer is not in the graph.
    MissingConsumer { tensor: TensorId, consumer: OperatorId },
    /// A tensor's consumer does not list the tensor among its inputs.
    ConsumerMismatch { tensor: TensorId, consumer: OperatorId },
    /// An operator reads a tensor that does not record it as a consumer.
    UnrecordedConsumer { tensor: TensorId, operator: OperatorId },
    /// A declared graph input/output is not in the graph.
    MissingInterfaceTensor { role: InterfaceRole, tensor: TensorId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingTensor { operator, tensor } => {
                write!(f, "operator {operator} references non-existent tensor {tensor}")
            }
            Violation::MissingProducer { tensor, producer } => {
                write!(f, "tensor {tensor} has non-existent producer {producer}")
            }
            Violation::ProducerMismatch { tensor, producer } => {
                write!(f, "tensor {tensor} producer {producer} does not list it as an output")
            }
            Violation::UnrecordedProducer { tensor, operator } => write!(
                f,
                "operator {operator} lists {tensor} as an output but the tensor does not record it as producer"
            ),
            Violation::MultipleProducers { tensor, operators } => write!(
                f,
                "tensor {tensor} is written by several operators: {}",
                crate::ir::ids::join_ids(operators)
            ),
            Violation::MissingConsumer { tensor, consumer } => {
                write!(f, "tensor {tensor} has non-existent consumer {consumer}")
            }
            Violation::ConsumerMismatch { tensor, consumer } => {
                write!(f, "tensor {tensor} consumer {consumer} does not list it as an input")
            }
            Violation::UnrecordedConsumer { tensor, operator } => write!(
                f,
                "operator {operator} reads {tensor} but the tensor does not record it as a consumer"
            ),
            Violation::MissingInterfaceTensor { role, tensor } => {
                write!(f, "graph {role} tensor {tensor} not found in graph tensors")
            }
        }
    }
}

/// Result of [`Graph::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return write!(f, "graph is valid");
        }
        writeln!(f, "{} violation(s):", self.violations.len())?;
        for v in self.violations.iter() {
            writeln!(f, "  - {v}")?;
        }
        Ok(())
    }
}

impl Graph {
    /// Re-check referential integrity, producer/consumer agreement and the
    /// graph interface.
    pub fn validate(&self) -> ValidationReport {
        let mut violations = Vec::new();

        // Operators -> tensors.
        let mut writers: HashMap<&TensorId, Vec<OperatorId>> = HashMap::new();
        for op in self.operators() {
            for tensor_id in op.referenced_tensors() {
                if !self.contains_tensor(tensor_id) {
                    violations.push(Violation::MissingTensor {
                        operator: op.id.clone(),
                        tensor: tensor_id.clone(),
                    });
                }
            }

            let mut seen: HashSet<&TensorId> = HashSet::new();
            for tensor_id in op.output_tensor_ids.iter().filter(|t| seen.insert(*t)) {
                writers.entry(tensor_id).or_default().push(op.id.clone());
                if let Some(tensor) = self.tensor(tensor_id) {
                    if tensor.producer.as_ref() != Some(&op.id) {
                        violations.push(Violation::UnrecordedProducer {
                            tensor: tensor_id.clone(),
                            operator: op.id.clone(),
                        });
                    }
                }
            }

            let mut seen: HashSet<&TensorId> = HashSet::new();
            for tensor_id in op.input_tensor_ids.iter().filter(|t| seen.insert(*t)) {
                if let Some(tensor) = self.tensor(tensor_id) {
                    if !tensor.is_consumed_by(&op.id) {
                        violations.push(Violation::UnrecordedConsumer {
                            tensor: tensor_id.clone(),
                            operator: op.id.clone(),
                        });
                    }
                }
            }
        }

        for tensor in self.tensors() {
            if let Some(ops) = writers.get(&tensor.id) {
                if ops.len() > 1 {
                    violations.push(Violation::MultipleProducers {
                        tensor: tensor.id.clone(),
                        operators: ops.clone(),
                    });
                }
            }
        }

        // Tensors -> operators.
        for tensor in self.tensors() {
            if let Some(producer) = tensor.producer.as_ref() {
                match self.operator(producer) {
                    None => violations.push(Violation::MissingProducer {
                        tensor: tensor.id.clone(),
                        producer: producer.clone(),
                    }),
                    Some(op) if !op.writes(&tensor.id) => {
                        violations.push(Violation::ProducerMismatch {
                            tensor: tensor.id.clone(),
                            producer: producer.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }

            for consumer in tensor.consumers.iter() {
                match self.operator(consumer) {
                    None => violations.push(Violation::MissingConsumer {
                        tensor: tensor.id.clone(),
                        consumer: consumer.clone(),
                    }),
                    Some(op) if !op.reads(&tensor.id) => {
                        violations.push(Violation::ConsumerMismatch {
                            tensor: tensor.id.clone(),
                            consumer: consumer.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        // Graph interface.
        let declared = self
            .input_ids()
            .iter()
            .map(|id| (InterfaceRole::Input, id))
            .chain(self.output_ids().iter().map(|id| (InterfaceRole::Output, id)));
        for (role, id) in declared {
            if !self.contains_tensor(id) {
                violations.push(Violation::MissingInterfaceTensor {
                    role,
                    tensor: id.clone(),
                });
            }
        }

        ValidationReport { violations }
    }

    /// `true` when [`Graph::validate`] finds nothing. Violations are logged.
    pub fn is_valid(&self) -> bool {
        let report = self.validate();
        if report.is_ok() {
            debug!(graph = %self.name(), "graph validation successful");
        } else {
            for v in report.violations() {
                warn!(graph = %self.name(), "{v}");
            }
            warn!(
                graph = %self.name(),
                violations = report.violations().len(),
                "graph validation failed"
            );
        }
        report.is_ok()
    }
}
