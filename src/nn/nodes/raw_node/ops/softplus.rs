use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// SoftPlus 激活函数节点
///
/// forward: f(x) = ln(1 + e^x)（数值稳定版本）
/// backward: d(f)/dx = sigmoid(x)
#[derive(Default)]
pub(in crate::nn) struct SoftPlus {
    parent_value: Option<Tensor>,
}

impl TraitNode for SoftPlus {
    fn type_name(&self) -> &'static str {
        "SoftPlus"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        self.parent_value = Some(parents[0].clone());
        Ok(parents[0].softplus())
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        let parent_value = cached(&self.parent_value, self.type_name())?;
        Ok(upstream * parent_value.sigmoid())
    }
}
