/*
 * @Author       : 老董
 * @Description  : Graph 句柄（用户级 API）
 */

use super::error::GraphError;
use super::inner::GraphInner;
use crate::nn::NodeId;
use crate::nn::var::{Init, Var};
use crate::tensor::Tensor;
use std::cell::RefCell;
use std::rc::Rc;

/// Graph - 计算图句柄（PyTorch 风格用户 API）
///
/// - 是 `Rc<RefCell<GraphInner>>` 的薄封装
/// - Clone 语义：多个 Graph 引用同一个 GraphInner
/// - 创建的 Var 自动持有图引用
#[derive(Clone)]
pub struct Graph {
    inner: Rc<RefCell<GraphInner>>,
}

impl Graph {
    // ==================== 创建 ====================

    pub fn new() -> Self {
        Self::from_inner(GraphInner::new())
    }

    /// 创建带种子的图（用于确定性训练）
    pub fn new_with_seed(seed: u64) -> Self {
        Self::from_inner(GraphInner::new_with_seed(seed))
    }

    pub fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    pub(crate) const fn from_rc(inner: Rc<RefCell<GraphInner>>) -> Self {
        Self { inner }
    }

    pub(crate) fn inner_rc(&self) -> Rc<RefCell<GraphInner>> {
        Rc::clone(&self.inner)
    }

    pub fn inner(&self) -> std::cell::Ref<'_, GraphInner> {
        self.inner.borrow()
    }

    pub fn inner_mut(&self) -> std::cell::RefMut<'_, GraphInner> {
        self.inner.borrow_mut()
    }

    /// 两个句柄是否指向同一张图
    pub fn same_as(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// 将 NodeId 包装成 Var
    pub fn wrap_node_id(&self, node_id: NodeId) -> Var {
        Var::new(node_id, Rc::clone(&self.inner))
    }

    // ==================== 创建变量 ====================

    /// 创建输入节点并设置数据
    pub fn input(&self, data: &Tensor) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, None)?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建命名输入节点
    pub fn input_named(&self, data: &Tensor, name: &str) -> Result<Var, GraphError> {
        let node_id = self.inner.borrow_mut().new_input_node(data, Some(name))?;
        Ok(self.wrap_node_id(node_id))
    }

    /// 创建参数节点（初始化使用图的 RNG）
    pub fn parameter(&self, shape: &[usize], init: Init, name: &str) -> Result<Var, GraphError> {
        let mut g = self.inner.borrow_mut();
        let init_data = init.generate_with_rng(shape, g.rng_mut());
        let node_id = g.new_parameter_node(&init_data, name)?;
        drop(g);
        Ok(self.wrap_node_id(node_id))
    }

    // ==================== 执行 ====================

    /// 反向传播，返回损失的标量值
    pub fn backward(&self, loss: &Var) -> Result<f32, GraphError> {
        loss.backward()
    }

    // ==================== 训练控制 ====================

    /// 清零所有参数的梯度
    pub fn zero_grad(&self) {
        self.inner.borrow_mut().clear_grad();
    }

    pub fn set_grad_enabled(&self, enabled: bool) {
        self.inner.borrow_mut().set_grad_enabled(enabled);
    }

    pub fn is_grad_enabled(&self) -> bool {
        self.inner.borrow().is_grad_enabled()
    }

    /// 在 no_grad 上下文中执行闭包（闭包内可以自由地通过 Var 建图）
    pub fn no_grad_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        let was_enabled = self.is_grad_enabled();
        self.set_grad_enabled(false);
        let result = f(self);
        self.set_grad_enabled(was_enabled);
        result
    }

    /// 删除所有非参数节点，返回删除的数量
    pub fn prune_transient_nodes(&self) -> usize {
        self.inner.borrow_mut().prune_transient_nodes()
    }

    pub fn node_count(&self) -> usize {
        self.inner.borrow().node_count()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
