/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Module trait 定义
 */

use std::collections::BTreeMap;

use super::{GraphError, Var};
use crate::tensor::Tensor;

/// 模块 trait
///
/// - `forward()` **不是** trait 方法（签名各异）
/// - `new()` **不是** trait 方法（参数各异）
/// - `parameters()` 返回 `Vec<Var>`（签名一致，放入 trait）
pub trait Module {
    /// 获取所有参数
    fn parameters(&self) -> Vec<Var>;

    /// 获取参数数量
    fn num_params(&self) -> usize {
        self.parameters().len()
    }

    /// 参数元素总数
    fn num_elements(&self) -> Result<usize, GraphError> {
        self.parameters()
            .iter()
            .map(|p| -> Result<usize, GraphError> { Ok(p.value()?.size()) })
            .sum()
    }

    /// 设置所有参数是否需要梯度
    fn set_requires_grad(&self, requires_grad: bool) -> Result<(), GraphError> {
        self.parameters()
            .iter()
            .try_for_each(|p| p.set_requires_grad(requires_grad))
    }

    /// 导出参数状态字典（参数名 -> 值）
    fn state_dict(&self) -> Result<BTreeMap<String, Tensor>, GraphError> {
        let params = self.parameters();
        let Some(first) = params.first() else {
            return Ok(BTreeMap::new());
        };
        let ids = params.iter().map(Var::node_id).collect::<Vec<_>>();
        first.graph().borrow().params_state(&ids)
    }

    /// 载入参数状态字典：每个参数都须存在且形状一致，否则不做修改
    fn load_state_dict(&self, state: &BTreeMap<String, Tensor>) -> Result<(), GraphError> {
        let params = self.parameters();
        let Some(first) = params.first() else {
            return Ok(());
        };
        let ids = params.iter().map(Var::node_id).collect::<Vec<_>>();
        first.graph().borrow_mut().load_params_state(&ids, state)
    }
}
