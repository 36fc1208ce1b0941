//! 按组切换参数的`requires_grad`
//!
//! 反向传播时才读取这些标记：被冻结的参数不接收梯度，
//! 只通向被冻结参数的子图也不会计算梯度。

use tracing::debug;

use crate::ali::{ModelBundle, Role};
use crate::nn::GraphError;

/// 设置`role`组所有网络参数是否可训练
pub fn set_trainable(models: &ModelBundle, role: Role, trainable: bool) -> Result<(), GraphError> {
    models
        .iter()
        .filter(|n| n.role() == role)
        .try_for_each(|n| n.set_requires_grad(trainable))
}

/// 只让`role`组可训练，冻结另一组
pub fn hand_over(models: &ModelBundle, role: Role) -> Result<(), GraphError> {
    set_trainable(models, role.opponent(), false)?;
    set_trainable(models, role, true)?;
    debug!(?role, "参数控制权已交给该组");
    Ok(())
}
