#![allow(dead_code)]

use neuroforge::ir::{Graph, OperatorNode, TensorId, TensorNode};

fn tensor_ids(ids: &[&str]) -> Vec<TensorId> {
    ids.iter().map(|s| TensorId::from(*s)).collect()
}

/// Builder for `Graph` that panics on any construction error, to keep test
/// setup short. Use the `Graph` API directly when the error is under test.
pub struct GraphBuilder {
    graph: Graph,
}

impl GraphBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            graph: Graph::new(name, Vec::new(), Vec::new()),
        }
    }

    pub fn with_interface(name: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        Self {
            graph: Graph::new(name, tensor_ids(inputs), tensor_ids(outputs)),
        }
    }

    /// Add a `float32` tensor of shape `[1]` whose name equals its id.
    pub fn tensor(self, id: &str) -> Self {
        self.tensor_with(id, vec![1], "float32")
    }

    pub fn tensors(mut self, ids: &[&str]) -> Self {
        for id in ids {
            self = self.tensor(id);
        }
        self
    }

    pub fn tensor_with(mut self, id: &str, shape: Vec<usize>, dtype: &str) -> Self {
        self.graph
            .add_tensor(TensorNode::new(id, id, shape, dtype))
            .expect("failed to add tensor");
        self
    }

    pub fn op(self, id: &str, op_type: &str, inputs: &[&str], outputs: &[&str]) -> Self {
        self.operator(operator(id, op_type, inputs, outputs))
    }

    pub fn operator(mut self, op: OperatorNode) -> Self {
        self.graph.add_operator(op).expect("failed to add operator");
        self
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

/// An operator whose name equals its id.
pub fn operator(id: &str, op_type: &str, inputs: &[&str], outputs: &[&str]) -> OperatorNode {
    OperatorNode::new(id, id, op_type, tensor_ids(inputs), tensor_ids(outputs))
}

/// `in, w, b -> conv -> conv_out -> relu -> relu_out`.
pub fn conv_relu_graph() -> Graph {
    GraphBuilder::with_interface("conv_relu", &["in"], &["relu_out"])
        .tensor_with("in", vec![1, 3, 8, 8], "float32")
        .tensor_with("w", vec![4, 3, 3, 3], "float32")
        .tensor_with("b", vec![4], "float32")
        .tensor_with("conv_out", vec![1, 4, 6, 6], "float32")
        .tensor_with("relu_out", vec![1, 4, 6, 6], "float32")
        .op("conv", "conv2d", &["in", "w", "b"], &["conv_out"])
        .op("relu", "relu", &["conv_out"], &["relu_out"])
        .build()
}

/// Manifest text for [`conv_relu_graph`], with an optional `[config]` body.
pub fn conv_relu_manifest(config: &str) -> String {
    format!(
        r#"
[config]
{config}

[graph]
name = "conv_relu"
inputs = ["in"]
outputs = ["relu_out"]

[[tensor]]
id = "in"
shape = [1, 3, 8, 8]

[[tensor]]
id = "w"
name = "conv.weight"
shape = [4, 3, 3, 3]

[[tensor]]
id = "b"
name = "conv.bias"
shape = [4]

[[tensor]]
id = "conv_out"
shape = [1, 4, 6, 6]

[[tensor]]
id = "relu_out"
shape = [1, 4, 6, 6]

[[operator]]
id = "conv"
op_type = "conv2d"
inputs = ["in", "w", "b"]
outputs = ["conv_out"]
attributes = {{ kernel_shape = [3, 3], strides = [1, 1], group = 1 }}

[[operator]]
id = "relu"
op_type = "relu"
inputs = ["conv_out"]
outputs = ["relu_out"]
"#
    )
}
