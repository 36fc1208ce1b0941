/*
 * @Author       : 老董
 * @Description  : GraphInner 梯度开关、no_grad 上下文
 */

use super::GraphInner;

impl GraphInner {
    pub const fn set_grad_enabled(&mut self, enabled: bool) {
        self.grad_enabled = enabled;
    }

    pub const fn is_grad_enabled(&self) -> bool {
        self.grad_enabled
    }

    /// no_grad 上下文：其中创建的节点都不参与反向传播
    pub fn no_grad_scope<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let was_enabled = self.grad_enabled;
        self.grad_enabled = false;
        let result = f(self);
        self.grad_enabled = was_enabled;
        result
    }
}
