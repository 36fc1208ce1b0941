use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 对所有元素求均值，输出形状[1, 1]
#[derive(Default)]
pub(in crate::nn) struct Mean {
    parent_shape: Vec<usize>,
}

impl TraitNode for Mean {
    fn type_name(&self) -> &'static str {
        "Mean"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        self.parent_shape = parents[0].shape().to_vec();
        Ok(parents[0].mean())
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        let upstream = upstream.get_data_number().ok_or_else(|| {
            GraphError::ComputationError(format!(
                "Mean节点的上游梯度应为标量，但形状为{:?}",
                upstream.shape()
            ))
        })?;
        let n = self.parent_shape.iter().product::<usize>().max(1) as f32;
        Ok(Tensor::full(upstream / n, &self.parent_shape))
    }
}
