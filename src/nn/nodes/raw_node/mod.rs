/*
 * @Author       : 老董
 * @Description  : 原始节点：参数、输入与各算子。
 *                 算子节点在创建时立即（eager）由父节点的值算出自身的值，
 *                 并缓存反向传播所需的量（通常是父节点当时的值），
 *                 因此之后即使参数被优化器改写，反向传播用的仍是前向当时的值。
 */

mod input;
mod ops;
mod parameter;

pub(in crate::nn) use input::Input;
pub(in crate::nn) use ops::*;
pub(in crate::nn) use parameter::Parameter;

use enum_dispatch::enum_dispatch;

use crate::nn::GraphError;
use crate::tensor::Tensor;

#[enum_dispatch]
pub(in crate::nn) enum NodeType {
    Parameter(Parameter),
    Input(Input),
    Add(Add),
    AddScalar(AddScalar),
    Multiply(Multiply),
    Negate(Negate),
    MatMul(MatMul),
    Exp(Exp),
    SoftPlus(SoftPlus),
    LeakyReLU(LeakyReLU),
    Tanh(Tanh),
    Concat(Concat),
    Narrow(Narrow),
    Reshape(Reshape),
    Mean(Mean),
    Dropout(Dropout),
}

#[enum_dispatch(NodeType)]
pub(in crate::nn) trait TraitNode {
    fn type_name(&self) -> &'static str;

    /// 根据父节点的值计算本节点的值（顺便缓存反向传播所需的量）
    fn calc_value_by_parents(&mut self, parents: &[&Tensor]) -> Result<Tensor, GraphError>;

    /// 已知损失对本节点的梯度`upstream`，计算损失对第`index`个父节点的梯度（VJP）
    fn calc_grad_to_parent(&self, index: usize, upstream: &Tensor) -> Result<Tensor, GraphError>;
}

/// 取出缓存值，缺失说明节点尚未前向计算
pub(in crate::nn) fn cached<'a>(
    cache: &'a Option<Tensor>,
    type_name: &str,
) -> Result<&'a Tensor, GraphError> {
    cache.as_ref().ok_or_else(|| {
        GraphError::ComputationError(format!(
            "{type_name}节点没有缓存的父节点值。不该触及本错误，否则说明crate代码有问题"
        ))
    })
}

/// 校验父节点数量
pub(in crate::nn) fn check_parent_count(
    parents: &[&Tensor],
    expected: usize,
    type_name: &str,
) -> Result<(), GraphError> {
    if parents.len() == expected {
        Ok(())
    } else {
        Err(GraphError::InvalidOperation(format!(
            "{type_name}节点需要{expected}个父节点，但得到{}个",
            parents.len()
        )))
    }
}

/// 校验父节点下标
pub(in crate::nn) fn check_parent_index(
    index: usize,
    count: usize,
    type_name: &str,
) -> Result<(), GraphError> {
    if index < count {
        Ok(())
    } else {
        Err(GraphError::InvalidOperation(format!(
            "{type_name}节点只有{count}个父节点，无法对第{index}个求梯度"
        )))
    }
}
