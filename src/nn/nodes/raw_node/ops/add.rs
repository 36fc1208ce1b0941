use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 两个张量逐元素相加（支持广播）
///
/// backward: 上游梯度按各父节点的形状做 sum_to_shape（广播的逆操作）
#[derive(Default)]
pub(in crate::nn) struct Add {
    parent_shapes: Vec<Vec<usize>>,
}

impl TraitNode for Add {
    fn type_name(&self) -> &'static str {
        "Add"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 2, self.type_name())?;
        let value = parents[0].try_binary(parents[1], Operator::Add, |a, b| a + b)?;
        self.parent_shapes = parents.iter().map(|p| p.shape().to_vec()).collect();
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, self.parent_shapes.len(), self.type_name())?;
        Ok(upstream.sum_to_shape(&self.parent_shapes[index]))
    }
}
