use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// Tanh 激活函数节点；backward: 1 - tanh²(x)
#[derive(Default)]
pub(in crate::nn) struct Tanh {
    output: Option<Tensor>,
}

impl TraitNode for Tanh {
    fn type_name(&self) -> &'static str {
        "Tanh"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        let value = parents[0].tanh();
        self.output = Some(value.clone());
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        let derivative = cached(&self.output, self.type_name())?.map(|y| 1.0 - y * y);
        Ok(upstream * derivative)
    }
}
