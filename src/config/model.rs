// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::ir::{AttributeValue, OperatorId, OperatorNode, TensorId, TensorNode};

/// Compile manifest as read from a TOML file, before semantic validation.
///
/// ```toml
/// [config]
/// target = "dpu_v1"
/// output_dir = "build"
///
/// [hardware]
/// supported_ops = ["conv2d", "relu"]
/// memory_gb = 2
///
/// [graph]
/// name = "tiny"
/// inputs = ["in"]
/// outputs = ["relu_out"]
///
/// [[tensor]]
/// id = "in"
/// shape = [1, 3, 32, 32]
///
/// [[operator]]
/// id = "conv"
/// op_type = "conv2d"
/// inputs = ["in", "w", "b"]
/// outputs = ["conv_out"]
/// attributes = { strides = [1, 1] }
/// ```
///
/// Tensors and operators are arrays of tables so that declaration order is
/// kept: it becomes the graph's insertion order.
#[derive(Debug, Clone, Deserialize)]
pub struct RawManifest {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub hardware: HardwareSection,

    pub graph: GraphSection,

    #[serde(default)]
    pub tensor: Vec<TensorSpec>,

    #[serde(default)]
    pub operator: Vec<OperatorSpec>,
}

/// Validated manifest. Build it with `Manifest::try_from(raw)` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct Manifest {
    pub config: ConfigSection,
    pub hardware: HardwareSection,
    pub graph: GraphSection,
    pub tensor: Vec<TensorSpec>,
    pub operator: Vec<OperatorSpec>,
}

impl Manifest {
    pub(crate) fn new_unchecked(raw: RawManifest) -> Self {
        Self {
            config: raw.config,
            hardware: raw.hardware,
            graph: raw.graph,
            tensor: raw.tensor,
            operator: raw.operator,
        }
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Hardware target tag, e.g. `"dpu_v1"`.
    #[serde(default = "default_target")]
    pub target: String,

    /// Directory the artifact path is placed in.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_target() -> String {
    "dpu_v1".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            target: default_target(),
            output_dir: default_output_dir(),
        }
    }
}

/// `[hardware]` section: the capabilities the static hardware layer reports.
#[derive(Debug, Clone, Deserialize)]
pub struct HardwareSection {
    #[serde(default = "default_supported_ops")]
    pub supported_ops: Vec<String>,

    #[serde(default = "default_memory_gb")]
    pub memory_gb: u64,
}

fn default_supported_ops() -> Vec<String> {
    ["conv2d", "relu", "dense"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_memory_gb() -> u64 {
    2
}

impl Default for HardwareSection {
    fn default() -> Self {
        Self {
            supported_ops: default_supported_ops(),
            memory_gb: default_memory_gb(),
        }
    }
}

/// `[graph]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphSection {
    pub name: String,

    #[serde(default)]
    pub inputs: Vec<TensorId>,

    #[serde(default)]
    pub outputs: Vec<TensorId>,
}

/// One `[[tensor]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TensorSpec {
    pub id: TensorId,

    /// Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub shape: Vec<usize>,

    #[serde(default = "default_dtype")]
    pub dtype: String,
}

fn default_dtype() -> String {
    "float32".to_string()
}

impl TensorSpec {
    pub fn to_node(&self) -> TensorNode {
        let name = self.name.clone().unwrap_or_else(|| self.id.to_string());
        TensorNode::new(self.id.clone(), name, self.shape.clone(), self.dtype.clone())
    }
}

/// One `[[operator]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorSpec {
    pub id: OperatorId,

    /// Defaults to the id.
    #[serde(default)]
    pub name: Option<String>,

    pub op_type: String,

    #[serde(default)]
    pub inputs: Vec<TensorId>,

    #[serde(default)]
    pub outputs: Vec<TensorId>,

    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl OperatorSpec {
    pub fn to_node(&self) -> OperatorNode {
        let name = self.name.clone().unwrap_or_else(|| self.id.to_string());
        let mut node = OperatorNode::new(
            self.id.clone(),
            name,
            self.op_type.clone(),
            self.inputs.clone(),
            self.outputs.clone(),
        );
        node.attributes = self.attributes.clone();
        node
    }
}
