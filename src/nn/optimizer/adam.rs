/*
 * @Author       : 老董
 * @Description  : Adam 优化器
 */

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::Optimizer;
use crate::nn::graph::GraphInner;
use crate::nn::{Graph, GraphError, NodeId, Var};
use crate::tensor::Tensor;

/// Adam 优化器
///
/// - m = β1·m + (1-β1)·g
/// - v = β2·v + (1-β2)·g²
/// - p -= lr · m̂ / (sqrt(v̂) + ε)，其中 m̂、v̂ 为偏差修正后的矩估计
///
/// 本轮没有梯度的参数（例如被冻结）不会被更新，其矩估计也保持不变。
pub struct Adam {
    graph: Rc<RefCell<GraphInner>>,
    /// 要优化的参数节点 ID
    params: Vec<NodeId>,
    lr: f32,
    /// β1 (一阶矩衰减)
    beta1: f32,
    /// β2 (二阶矩衰减)
    beta2: f32,
    /// 数值稳定项
    epsilon: f32,
    /// 一阶矩估计
    m: HashMap<NodeId, Tensor>,
    /// 二阶矩估计
    v: HashMap<NodeId, Tensor>,
    /// 时间步
    t: usize,
}

impl Adam {
    /// 默认 β1=0.9, β2=0.999, ε=1e-8
    pub fn new(graph: &Graph, params: &[Var], lr: f32) -> Self {
        Self::with_config(graph, params, lr, 0.9, 0.999, 1e-8)
    }

    pub fn with_config(
        graph: &Graph,
        params: &[Var],
        lr: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    ) -> Self {
        Self {
            graph: graph.inner_rc(),
            params: params.iter().map(Var::node_id).collect(),
            lr,
            beta1,
            beta2,
            epsilon,
            m: HashMap::new(),
            v: HashMap::new(),
            t: 0,
        }
    }

    /// 绑定的参数数量
    pub fn num_params(&self) -> usize {
        self.params.len()
    }

    /// 已执行的 step 次数
    pub const fn step_count(&self) -> usize {
        self.t
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) -> Result<(), GraphError> {
        self.graph.borrow_mut().clear_grad_of(&self.params)
    }

    fn step(&mut self) -> Result<(), GraphError> {
        self.t += 1;
        let t = i32::try_from(self.t).unwrap_or(i32::MAX);
        let bias_correction1 = 1.0 - self.beta1.powi(t);
        let bias_correction2 = 1.0 - self.beta2.powi(t);
        let mut g = self.graph.borrow_mut();

        for &node_id in &self.params {
            let Some(grad) = g.get_node_grad(node_id)? else {
                continue;
            };

            // 更新一阶矩
            let m = match self.m.remove(&node_id) {
                Some(m) => &m * self.beta1 + &grad * (1.0 - self.beta1),
                None => &grad * (1.0 - self.beta1),
            };
            // 更新二阶矩
            let grad_squared = &grad * &grad;
            let v = match self.v.remove(&node_id) {
                Some(v) => &v * self.beta2 + &grad_squared * (1.0 - self.beta2),
                None => &grad_squared * (1.0 - self.beta2),
            };

            // 偏差修正
            let m_hat = &m / bias_correction1;
            let v_hat = &v / bias_correction2;
            let update = &m_hat / &(v_hat.sqrt() + self.epsilon) * self.lr;

            g.update_parameter(node_id, |value| *value = &*value - &update)?;
            self.m.insert(node_id, m);
            self.v.insert(node_id, v);
        }
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.lr
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.lr = lr;
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }
}
