// src/ir/mod.rs

//! Intermediate representation: a dataflow graph of tensors and operators.
//!
//! - [`ids`] defines the opaque tensor / operator handles.
//! - [`tensor`] and [`operator`] are the node records.
//! - [`graph`] owns the nodes and keeps producer/consumer links consistent.
//! - [`schedule`] computes the topological operator order.
//! - [`validate`] re-checks graph invariants and reports violations.
//! - [`frozen`] is the read-only, shareable form of a scheduled graph.

pub mod frozen;
pub mod graph;
pub mod ids;
pub mod operator;
pub mod schedule;
pub mod tensor;
pub mod validate;

pub use frozen::FrozenGraph;
pub use graph::{Graph, Removal};
pub use ids::{OperatorId, TensorId};
pub use operator::{AttributeValue, OperatorNode};
pub use tensor::TensorNode;
pub use validate::{ValidationReport, Violation};
