use crate::nn::GraphError;
use crate::nn::nodes::raw_node::{TraitNode, check_parent_count, check_parent_index};
use crate::tensor::Tensor;

/// 截取某一维上 [start, start + len) 的部分（如把 Gz 的输出拆成 mu 与 log-sigma）
///
/// backward: 梯度放回父节点形状的全零张量中对应位置
pub(in crate::nn) struct Narrow {
    axis: usize,
    start: usize,
    len: usize,
    parent_shape: Vec<usize>,
}

impl Narrow {
    pub(in crate::nn) const fn new(axis: usize, start: usize, len: usize) -> Self {
        Self {
            axis,
            start,
            len,
            parent_shape: Vec::new(),
        }
    }
}

impl TraitNode for Narrow {
    fn type_name(&self) -> &'static str {
        "Narrow"
    }

    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        check_parent_count(parents, 1, self.type_name())?;
        let value = parents[0].narrow(self.axis, self.start, self.len)?;
        self.parent_shape = parents[0].shape().to_vec();
        Ok(value)
    }

    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError> {
        check_parent_index(index, 1, self.type_name())?;
        Ok(upstream.embed_along(&self.parent_shape, self.axis, self.start)?)
    }
}
