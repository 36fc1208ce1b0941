use std::fmt;

use super::raw_node::{NodeType, TraitNode};
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 节点在图中的唯一编号；编号随创建顺序递增，因此父节点的编号总小于子节点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 图中保存的节点：原始节点 + 值、梯度、父节点等图层面的信息
pub(in crate::nn) struct NodeHandle {
    id: NodeId,
    name: String,
    raw_node: NodeType,
    value: Tensor,
    grad: Option<Tensor>,
    parents: Vec<NodeId>,
    /// 在 no_grad 上下文中创建的节点，反向传播不会经过它
    detached: bool,
}

impl NodeHandle {
    pub(in crate::nn) fn new<T: Into<NodeType>>(
        id: NodeId,
        name: String,
        raw_node: T,
        value: Tensor,
        parents: Vec<NodeId>,
        detached: bool,
    ) -> Self {
        Self {
            id,
            name,
            raw_node: raw_node.into(),
            value,
            grad: None,
            parents,
            detached,
        }
    }

    pub(in crate::nn) const fn id(&self) -> NodeId {
        self.id
    }

    pub(in crate::nn) fn name(&self) -> &str {
        &self.name
    }

    pub(in crate::nn) const fn node_type(&self) -> &NodeType {
        &self.raw_node
    }

    pub(in crate::nn) fn node_type_mut(&mut self) -> &mut NodeType {
        &mut self.raw_node
    }

    pub(in crate::nn) const fn value(&self) -> &Tensor {
        &self.value
    }

    /// 只有叶子节点（参数、输入）的值允许被直接改写，且形状必须不变
    pub(in crate::nn) fn set_value(&mut self, value: &Tensor) -> Result<(), GraphError> {
        if !self.is_leaf() {
            return Err(GraphError::InvalidOperation(format!(
                "{self}是算子节点，其值不应该被手动设置"
            )));
        }
        if value.shape() != self.value.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.value.shape().to_vec(),
                got: value.shape().to_vec(),
                message: format!("{self}的新值形状与原值不一致"),
            });
        }
        self.value = value.clone();
        Ok(())
    }

    pub(in crate::nn) fn value_mut(&mut self) -> &mut Tensor {
        &mut self.value
    }

    pub(in crate::nn) const fn grad(&self) -> Option<&Tensor> {
        self.grad.as_ref()
    }

    pub(in crate::nn) fn accumulate_grad(&mut self, grad: Tensor) {
        self.grad = Some(match self.grad.take() {
            Some(existing) => existing + grad,
            None => grad,
        });
    }

    pub(in crate::nn) fn clear_grad(&mut self) {
        self.grad = None;
    }

    pub(in crate::nn) fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    pub(in crate::nn) const fn is_detached(&self) -> bool {
        self.detached
    }

    pub(in crate::nn) const fn is_parameter(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_))
    }

    pub(in crate::nn) const fn is_leaf(&self) -> bool {
        matches!(self.raw_node, NodeType::Parameter(_) | NodeType::Input(_))
    }

    /// 是否为需要梯度的参数节点
    pub(in crate::nn) const fn requires_grad(&self) -> bool {
        match &self.raw_node {
            NodeType::Parameter(p) => p.requires_grad(),
            _ => false,
        }
    }

    pub(in crate::nn) fn calc_grad_to_parent(
        &self,
        index: usize,
        upstream: &Tensor,
    ) -> Result<Tensor, GraphError> {
        self.raw_node.calc_grad_to_parent(index, upstream)
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "节点[id={}, name={}, type={}]",
            self.id,
            self.name,
            self.raw_node.type_name()
        )
    }
}
