// src/ir/operator.rs

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::ir::ids::{OperatorId, TensorId};

/// Free-form operator configuration value.
///
/// The graph never interprets attributes; they are carried through to
/// whatever consumes the operator (code generation, passes).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<AttributeValue>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Int(n) => write!(f, "{n}"),
            AttributeValue::Float(v) => write!(f, "{v}"),
            AttributeValue::Str(s) => write!(f, "\"{s}\""),
            AttributeValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Str(v.to_string())
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(v: Vec<i64>) -> Self {
        AttributeValue::List(v.into_iter().map(AttributeValue::Int).collect())
    }
}

/// A computation node.
///
/// Input and output lists are positional: their order is preserved exactly
/// as declared, duplicates included.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorNode {
    pub id: OperatorId,
    pub name: String,
    /// Operator kind tag (e.g. `"conv2d"`), used for codegen dispatch.
    pub op_type: String,
    pub input_tensor_ids: Vec<TensorId>,
    pub output_tensor_ids: Vec<TensorId>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl OperatorNode {
    pub fn new(
        id: impl Into<OperatorId>,
        name: impl Into<String>,
        op_type: impl Into<String>,
        input_tensor_ids: Vec<TensorId>,
        output_tensor_ids: Vec<TensorId>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            op_type: op_type.into(),
            input_tensor_ids,
            output_tensor_ids,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<AttributeValue>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Every tensor this operator references, inputs first.
    pub fn referenced_tensors(&self) -> impl Iterator<Item = &TensorId> {
        self.input_tensor_ids
            .iter()
            .chain(self.output_tensor_ids.iter())
    }

    pub fn reads(&self, tensor: &TensorId) -> bool {
        self.input_tensor_ids.contains(tensor)
    }

    pub fn writes(&self, tensor: &TensorId) -> bool {
        self.output_tensor_ids.contains(tensor)
    }
}
