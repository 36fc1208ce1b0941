use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 逐元素相乘（支持广播），如重参数化中的 sigma * noise
///
/// backward: d(a*b)/da = b，再按 a 的形状做 sum_to_shape
#[derive(Default)]
pub(in crate::nn) struct Multiply {
    left: Option<Tensor>,
    right: Option<Tensor>,
}

impl TraitNode for Multiply {
    fn type_name(&self) -> &'static str {
        "Multiply"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 2, self.type_name())?;
        let value = parents[0].try_binary(parents[1], Operator::Mul, |a, b| a * b)?;
        self.left = Some(parents[0].clone());
        self.right = Some(parents[1].clone());
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 2, self.type_name())?;
        let left = cached(&self.left, self.type_name())?;
        let right = cached(&self.right, self.type_name())?;
        let (this, other) = if index == 0 { (left, right) } else { (right, left) };
        let grad = upstream.try_binary(other, Operator::Mul, |a, b| a * b)?;
        Ok(grad.sum_to_shape(this.shape()))
    }
}
