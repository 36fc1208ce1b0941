use crate::errors::Operator;
use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// Dropout（inverted dropout）：掩码在创建节点时由图的随机数生成器给出，
/// 被保留的元素乘以 1/(1-p)，故推理时无需缩放
pub(in crate::nn) struct Dropout {
    mask: Tensor,
}

impl Dropout {
    pub(in crate::nn) const fn new(mask: Tensor) -> Self {
        Self { mask }
    }
}

impl TraitNode for Dropout {
    fn type_name(&self) -> &'static str {
        "Dropout"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        if parents[0].shape() != self.mask.shape() {
            return Err(GraphError::ShapeMismatch {
                expected: self.mask.shape().to_vec(),
                got: parents[0].shape().to_vec(),
                message: "Dropout掩码与输入形状不一致".to_string(),
            });
        }
        Ok(parents[0].try_binary(&self.mask, Operator::Mul, |a, b| a * b)?)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        Ok(upstream * &self.mask)
    }
}
