use super::TraitNode;
use crate::nn::GraphError;
use crate::tensor::Tensor;

/// 输入节点：承载数据（图像、隐变量、噪声等），永远不接收梯度
pub(in crate::nn) struct Input;

impl TraitNode for Input {
    fn type_name(&self) -> &'static str {
        "Input"
    }

    fn calc_value_by_parents(&mut self, _parents: &[&Tensor]) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation(
            "输入节点没有父节点，其值只能被直接设置".to_string(),
        ))
    }

    fn calc_grad_to_parent(&self, _index: usize, _upstream: &Tensor) -> Result<Tensor, GraphError> {
        Err(GraphError::InvalidOperation("输入节点没有父节点".to_string()))
    }
}
