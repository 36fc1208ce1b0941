use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, cached, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// Leaky ReLU 激活函数节点
///
/// forward: f(x) = x if x > 0, else negative_slope * x
/// backward: d(f)/dx = 1 if x > 0, else negative_slope
pub(in crate::nn) struct LeakyReLU {
    negative_slope: f32,
    parent_value: Option<Tensor>,
}

impl LeakyReLU {
    pub(in crate::nn) fn new(negative_slope: f32) -> Result<Self, GraphError> {
        if negative_slope < 0.0 {
            return Err(GraphError::InvalidOperation(format!(
                "LeakyReLU的negative_slope应为非负数，但得到: {negative_slope}"
            )));
        }
        Ok(Self {
            negative_slope,
            parent_value: None,
        })
    }
}

impl TraitNode for LeakyReLU {
    fn type_name(&self) -> &'static str {
        "LeakyReLU"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        self.parent_value = Some(parents[0].clone());
        Ok(parents[0].leaky_relu(self.negative_slope))
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        let slope = self.negative_slope;
        let derivative = cached(&self.parent_value, self.type_name())?
            .map(|x| if x > 0.0 { 1.0 } else { slope });
        Ok(upstream * derivative)
    }
}
