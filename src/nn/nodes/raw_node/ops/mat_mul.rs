use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 矩阵乘法 C = A @ B（均为2阶张量）
///
/// backward:
/// - dL/dA = dL/dC @ B^T
/// - dL/dB = A^T @ dL/dC
#[derive(Default)]
pub(in crate::nn) struct MatMul {
    left: Option<Tensor>,
    right: Option<Tensor>,
}

impl TraitNode for MatMul {
    fn type_name(&self) -> &'static str {
        "MatMul"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 2, self.type_name())?;
        let value = parents[0].try_mat_mul(parents[1])?;
        self.left = Some(parents[0].clone());
        self.right = Some(parents[1].clone());
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 2, self.type_name())?;
        let grad = if index == 0 {
            let right = cached(&self.right, self.type_name())?;
            upstream.try_mat_mul(&right.transpose())?
        } else {
            let left = cached(&self.left, self.type_name())?;
            left.transpose().try_mat_mul(upstream)?
        };
        Ok(grad)
    }
}
