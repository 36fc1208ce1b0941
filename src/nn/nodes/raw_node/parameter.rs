use super::TraitNode;
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 参数节点：跨批次保留，可被优化器更新
pub(in crate::nn) struct Parameter {
    requires_grad: bool,
}

impl Parameter {
    pub(in crate::nn) const fn new() -> Self {
        Self { requires_grad: true }
    }

    pub(in crate::nn) const fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    pub(in crate::nn) const fn set_requires_grad(&mut self, requires_grad: bool) {
        self.requires_grad = requires_grad;
    }
}

impl TraitNode for Parameter {
    fn type_name(&self) -> &'static str {
        "Parameter"
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "参数节点没有父节点，其值只能被直接设置".to_string(),
        ))
    }

    fn calc_grad_to_parent(&self, _index: usize, _upstream: &Tensor) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation("参数节点没有父节点".to_string()))
    }
}
