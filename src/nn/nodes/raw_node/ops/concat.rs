use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_index};
use crate::tensor::Tensor;

/// 沿某一维拼接多个张量；梯度按各父节点所占区间切回去
pub(in crate::nn) struct Concat {
    axis: usize,
    /// 每个父节点在拼接维上的 (起点, 长度)
    ranges: Vec<(usize, usize)>,
}

impl Concat {
    pub(in crate::nn) const fn new(axis: usize) -> Self {
        Self {
            axis,
            ranges: Vec::new(),
        }
    }
}

impl TraitNode for Concat {
    fn type_name(&self) -> &'static str {
        "Concat"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        let value = Tensor::concat(parents, self.axis)?;
        let mut start = 0;
        self.ranges = parents
            .iter()
            .map(|p| {
                let len = p.shape()[self.axis];
                let range = (start, len);
                start += len;
                range
            })
            .collect();
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, self.ranges.len(), self.type_name())?;
        let (start, len) = self.ranges[index];
        Ok(upstream.narrow(self.axis, start, len)?)
    }
}
