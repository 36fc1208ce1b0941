use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 张量加上一个常数（如损失中的 eps），梯度原样回传
pub(in crate::nn) struct AddScalar {
    scalar: f32,
}

impl AddScalar {
    pub(in crate::nn) const fn new(scalar: f32) -> Self {
        Self { scalar }
    }
}

impl TraitNode for AddScalar {
    fn type_name(&self) -> &'static str {
        "AddScalar"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        Ok(parents[0] + self.scalar)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        Ok(upstream.clone())
    }
}
