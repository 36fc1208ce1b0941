/*
 * @Author       : 老董
 * @Description  : GraphInner 基础操作
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::{NodeHandle, NodeType};
use crate::tensor::Tensor;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

impl GraphInner {
    // ========== 创建 ==========

    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            grad_enabled: true,
            rng: None,
        }
    }

    /// 创建一个带固定种子的计算图（确保可重复性）
    pub fn new_with_seed(seed: u64) -> Self {
        Self {
            rng: Some(StdRng::seed_from_u64(seed)),
            ..Self::new()
        }
    }

    /// 取图的随机数生成器；未设种子时临时用系统熵建一个
    pub(in crate::nn) fn rng_mut(&mut self) -> &mut StdRng {
        self.rng.get_or_insert_with(StdRng::from_entropy)
    }

    // ========== 基础访问器 ==========

    pub fn nodes(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// 所有参数节点（按创建顺序）
    pub fn parameter_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .values()
            .filter(|n| n.is_parameter())
            .map(NodeHandle::id)
            .collect()
    }

    pub(in crate::nn) fn get_node(&self, id: NodeId) -> Result<&NodeHandle, GraphError> {
        self.nodes.get(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub(in crate::nn) fn get_node_mut(&mut self, id: NodeId) -> Result<&mut NodeHandle, GraphError> {
        self.nodes.get_mut(&id).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn get_node_name(&self, id: NodeId) -> Result<&str, GraphError> {
        Ok(self.get_node(id)?.name())
    }

    pub fn get_node_value(&self, id: NodeId) -> Result<&Tensor, GraphError> {
        Ok(self.get_node(id)?.value())
    }

    /// 改写叶子节点（参数/输入）的值
    pub fn set_node_value(&mut self, id: NodeId, value: &Tensor) -> Result<(), GraphError> {
        self.get_node_mut(id)?.set_value(value)
    }

    /// 原地修改参数的值（优化器、截断用）
    pub(in crate::nn) fn update_parameter<F>(&mut self, id: NodeId, f: F) -> Result<(), GraphError>
    where
        F: FnOnce(&mut Tensor),
    {
        let node = self.get_node_mut(id)?;
        if !node.is_parameter() {
            return Err(GraphError::InvalidOperation(format!(
                "{node}不是参数节点，不能被更新"
            )));
        }
        f(node.value_mut());
        Ok(())
    }

    pub fn get_node_grad(&self, id: NodeId) -> Result<Option<Tensor>, GraphError> {
        Ok(self.get_node(id)?.grad().cloned())
    }

    pub fn is_node_detached(&self, id: NodeId) -> Result<bool, GraphError> {
        Ok(self.get_node(id)?.is_detached())
    }

    // ========== 梯度开关（参数级） ==========

    pub fn requires_grad(&self, id: NodeId) -> Result<bool, GraphError> {
        let node = self.get_node(id)?;
        if node.is_parameter() {
            Ok(node.requires_grad())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "{node}不是参数节点，没有requires_grad标志"
            )))
        }
    }

    pub fn set_requires_grad(&mut self, id: NodeId, requires_grad: bool) -> Result<(), GraphError> {
        let node = self.get_node_mut(id)?;
        match node.node_type_mut() {
            NodeType::Parameter(p) => {
                p.set_requires_grad(requires_grad);
                Ok(())
            }
            _ => Err(GraphError::InvalidOperation(format!(
                "节点{id}不是参数节点，不能设置requires_grad"
            ))),
        }
    }

    /// 清零（丢弃）指定节点的梯度
    pub fn clear_grad_of(&mut self, ids: &[NodeId]) -> Result<(), GraphError> {
        for &id in ids {
            self.get_node_mut(id)?.clear_grad();
        }
        Ok(())
    }

    /// 清零所有节点的梯度
    pub fn clear_grad(&mut self) {
        for node in self.nodes.values_mut() {
            node.clear_grad();
        }
    }

    // ========== 生命周期 ==========

    /// 删除所有非参数节点（输入与算子）
    ///
    /// 每个批次的前向都会新建一批中间节点，训练循环在每批开始时调用本方法，
    /// 使图的规模不随批次增长。此后仍持有这些节点的 Var 将失效。
    pub fn prune_transient_nodes(&mut self) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| node.is_parameter());
        before - self.nodes.len()
    }

    pub(in crate::nn) const fn generate_new_id(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}
