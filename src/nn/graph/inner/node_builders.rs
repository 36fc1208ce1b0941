/*
 * @Author       : 老董
 * @Description  : GraphInner 节点创建。算子节点创建即完成前向计算
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use crate::nn::nodes::raw_node::{
    Add, AddScalar, Concat, Dropout, Exp, Input, LeakyReLU, MatMul, Mean, Multiply, Narrow, Negate,
    NodeType, Parameter, Reshape, SoftPlus, Tanh, TraitNode,
};
use crate::tensor::Tensor;
use rand::Rng;

impl GraphInner {
    /// 加入一个算子节点：取父节点的值，立即计算本节点的值
    fn add_op_node<T: Into<NodeType>>(
        &mut self,
        raw_node: T,
        parents: &[NodeId],
        name: Option<&str>,
    ) -> Result<NodeId, GraphError> {
        let mut raw_node: NodeType = raw_node.into();
        let value = {
            let parent_values = parents
                .iter()
                .map(|id| self.get_node(*id).map(NodeHandle::value))
                .collect::<Result<Vec<_>, _>>()?;
            raw_node.calc_value_by_parents(&parent_values)?
        };
        let detached = !self.grad_enabled;
        self.insert_node(raw_node, value, parents.to_vec(), name, detached)
    }

    fn insert_node(
        &mut self,
        raw_node: NodeType,
        value: Tensor,
        parents: Vec<NodeId>,
        name: Option<&str>,
        detached: bool,
    ) -> Result<NodeId, GraphError> {
        let id = self.generate_new_id();
        let name = match name {
            Some(name) => {
                if self.nodes.values().any(|n| n.name() == name) {
                    return Err(GraphError::InvalidOperation(format!(
                        "节点名称`{name}`在图中已存在"
                    )));
                }
                name.to_string()
            }
            None => format!("{}_{}", raw_node.type_name().to_lowercase(), id),
        };
        let node = NodeHandle::new(id, name, raw_node, value, parents, detached);
        self.nodes.insert(id, node);
        Ok(id)
    }

    // ========== 叶子节点 ==========

    pub fn new_parameter_node(&mut self, value: &Tensor, name: &str) -> Result<NodeId, GraphError> {
        self.insert_node(
            Parameter::new().into(),
            value.clone(),
            Vec::new(),
            Some(name),
            false,
        )
    }

    pub fn new_input_node(&mut self, value: &Tensor, name: Option<&str>) -> Result<NodeId, GraphError> {
        self.insert_node(Input.into(), value.clone(), Vec::new(), name, true)
    }

    // ========== 算子节点 ==========

    pub fn new_add_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Add::default(), &[a, b], None)
    }

    pub fn new_add_scalar_node(&mut self, parent: NodeId, scalar: f32) -> Result<NodeId, GraphError> {
        self.add_op_node(AddScalar::new(scalar), &[parent], None)
    }

    pub fn new_multiply_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Multiply::default(), &[a, b], None)
    }

    pub fn new_negate_node(&mut self, parent: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Negate, &[parent], None)
    }

    pub fn new_mat_mul_node(&mut self, a: NodeId, b: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(MatMul::default(), &[a, b], None)
    }

    pub fn new_exp_node(&mut self, parent: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Exp::default(), &[parent], None)
    }

    pub fn new_softplus_node(&mut self, parent: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(SoftPlus::default(), &[parent], None)
    }

    pub fn new_leaky_relu_node(&mut self, parent: NodeId, slope: f32) -> Result<NodeId, GraphError> {
        self.add_op_node(LeakyReLU::new(slope)?, &[parent], None)
    }

    pub fn new_tanh_node(&mut self, parent: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Tanh::default(), &[parent], None)
    }

    pub fn new_concat_node(&mut self, parents: &[NodeId], axis: usize) -> Result<NodeId, GraphError> {
        self.add_op_node(Concat::new(axis), parents, None)
    }

    pub fn new_narrow_node(
        &mut self,
        parent: NodeId,
        axis: usize,
        start: usize,
        len: usize,
    ) -> Result<NodeId, GraphError> {
        self.add_op_node(Narrow::new(axis, start, len), &[parent], None)
    }

    pub fn new_reshape_node(&mut self, parent: NodeId, shape: &[usize]) -> Result<NodeId, GraphError> {
        self.add_op_node(Reshape::new(shape), &[parent], None)
    }

    pub fn new_mean_node(&mut self, parent: NodeId) -> Result<NodeId, GraphError> {
        self.add_op_node(Mean::default(), &[parent], None)
    }

    /// 以概率`p`丢弃元素；掩码取自图的随机数生成器
    pub fn new_dropout_node(&mut self, parent: NodeId, p: f32) -> Result<NodeId, GraphError> {
        if !(0.0..1.0).contains(&p) {
            return Err(GraphError::InvalidOperation(format!(
                "dropout概率应在[0, 1)内，但得到: {p}"
            )));
        }
        let shape = self.get_node_value(parent)?.shape().to_vec();
        let keep = 1.0 - p;
        let rng = self.rng_mut();
        let mask_data = (0..shape.iter().product::<usize>())
            .map(|_| if rng.r#gen::<f32>() < keep { 1.0 / keep } else { 0.0 })
            .collect::<Vec<_>>();
        let mask = Tensor::try_new(&mask_data, &shape)?;
        self.add_op_node(Dropout::new(mask), &[parent], None)
    }
}
