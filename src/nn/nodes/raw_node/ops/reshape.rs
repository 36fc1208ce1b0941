use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 改变形状（元素总数不变）
pub(in crate::nn) struct Reshape {
    target_shape: Vec<usize>,
    parent_shape: Vec<usize>,
}

impl Reshape {
    pub(in crate::nn) fn new(target_shape: &[usize]) -> Self {
        Self {
            target_shape: target_shape.to_vec(),
            parent_shape: Vec::new(),
        }
    }
}

impl TraitNode for Reshape {
    fn type_name(&self) -> &'static str {
        "Reshape"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        let value = parents[0].try_reshape(&self.target_shape)?;
        self.parent_shape = parents[0].shape().to_vec();
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        Ok(upstream.try_reshape(&self.parent_shape)?)
    }
}
