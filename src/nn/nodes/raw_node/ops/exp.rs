use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 逐元素 e^x；导数即输出本身
#[derive(Default)]
pub(in crate::nn) struct Exp {
    output: Option<Tensor>,
}

impl TraitNode for Exp {
    fn type_name(&self) -> &'static str {
        "Exp"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        let value = parents[0].exp();
        self.output = Some(value.clone());
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        Ok(upstream * cached(&self.output, self.type_name())?)
    }
}
