/*
 * @Author       : 老董
 * @Date         : 2025-07-24 16:00:00
 * @LastEditors  : 老董
 * @LastEditTime : 2026-01-17
 * @Description  : 优化器模块（PyTorch 风格：优化器持有图引用并绑定一组参数）
 */

mod adam;

pub use adam::Adam;

use crate::nn::{GraphError, Var};

/// 优化器 trait
///
/// - 优化器绑定特定参数（通过 Var）
/// - `backward()` 计算所有可训练参数的梯度（由 Var 调用）
/// - `step()` 只更新优化器绑定的参数
///
/// ```ignore
/// let mut optimizer = Adam::new(&graph, &model.parameters(), 1e-4);
/// optimizer.zero_grad()?;
/// loss.backward()?;
/// optimizer.step()?;
/// ```
pub trait Optimizer {
    /// 清零绑定参数的梯度
    fn zero_grad(&mut self) -> Result<(), GraphError>;

    /// 更新参数（只更新持有梯度的绑定参数）
    fn step(&mut self) -> Result<(), GraphError>;

    /// 一步完成：zero_grad + backward + step，返回 loss 的标量值
    fn minimize(&mut self, loss: &Var) -> Result<f32, GraphError> {
        self.zero_grad()?;
        let loss_value = loss.backward()?;
        self.step()?;
        Ok(loss_value)
    }

    fn learning_rate(&self) -> f32;

    fn set_learning_rate(&mut self, lr: f32);

    /// 清空内部状态（动量等）
    fn reset(&mut self);
}
