// src/errors.rs

//! Crate-wide error types.
//!
//! [`GraphError`] covers the IR graph contract and is what graph operations
//! return. [`NeuroforgeError`] wraps it together with config, IO and code
//! generation failures for the pipeline and the binary.

use std::fmt;

use thiserror::Error;

use crate::ir::ids::join_ids;
use crate::ir::{OperatorId, TensorId};

/// Which table of the graph an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Tensor,
    Operator,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Tensor => f.write_str("tensor"),
            NodeKind::Operator => f.write_str("operator"),
        }
    }
}

/// Which side of the graph's external interface an id was declared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceRole {
    Input,
    Output,
}

impl fmt::Display for InterfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceRole::Input => f.write_str("input"),
            InterfaceRole::Output => f.write_str("output"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("{kind} with id '{id}' already exists in the graph")]
    DuplicateId { kind: NodeKind, id: String },

    #[error(
        "tensor '{tensor}' (referenced by operator '{operator}') not found in graph; declare tensors before their operators"
    )]
    UnknownTensor { operator: OperatorId, tensor: TensorId },

    #[error("tensor '{tensor}' already has producer '{existing}', cannot be produced by '{claimant}'")]
    ConflictingProducer {
        tensor: TensorId,
        existing: OperatorId,
        claimant: OperatorId,
    },

    #[error("{kind} with id '{id}' not found")]
    NotFound { kind: NodeKind, id: String },

    /// Kahn's algorithm could not order every operator.
    ///
    /// `unscheduled` lists every operator left over (in insertion order);
    /// `cycle` is the subset that actually sits on a cycle, the rest are
    /// downstream of one.
    #[error(
        "cycle detected in operator graph: scheduled {scheduled} of {total} operators; operators on a cycle: [{}]",
        join_ids(.cycle)
    )]
    CycleDetected {
        scheduled: usize,
        total: usize,
        unscheduled: Vec<OperatorId>,
        cycle: Vec<OperatorId>,
    },

    #[error("graph {role} '{id}' does not resolve to a tensor in the graph")]
    UnresolvedInterface { role: InterfaceRole, id: TensorId },
}

impl GraphError {
    pub(crate) fn tensor_not_found(id: &TensorId) -> Self {
        GraphError::NotFound {
            kind: NodeKind::Tensor,
            id: id.to_string(),
        }
    }

    pub(crate) fn operator_not_found(id: &OperatorId) -> Self {
        GraphError::NotFound {
            kind: NodeKind::Operator,
            id: id.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum NeuroforgeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Graph error: {0}")]
    GraphError(#[from] GraphError),

    #[error("operator '{operator}' has type '{op_type}', which target '{target}' does not support")]
    UnsupportedOperator {
        operator: OperatorId,
        op_type: String,
        target: String,
    },

    #[error("graph needs {required} bytes of tensor storage but target '{target}' provides {available}")]
    InsufficientMemory {
        target: String,
        required: u64,
        available: u64,
    },
}

pub type Result<T> = std::result::Result<T, NeuroforgeError>;
