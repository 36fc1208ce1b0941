/*
 * @Author       : 老董
 * @Date         : 2026-01-08
 * @Description  : Var - 变量句柄，支持算子重载和链式调用
 */

use super::graph::GraphInner;
use super::{GraphError, NodeId};
use crate::tensor::Tensor;
use rand::rngs::StdRng;
use std::cell::RefCell;
use std::ops::{Add, Mul, Neg, Sub};
use std::rc::Rc;

// ==================== Init 枚举 ====================

/// 参数初始化策略
#[derive(Debug, Clone)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
}

impl Init {
    /// 生成初始化后的 Tensor（使用指定的 RNG）
    pub fn generate_with_rng(&self, shape: &[usize], rng: &mut StdRng) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::full(*v, shape),
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::normal_with_rng(*mean, *std, shape, rng),
        }
    }
}

// ==================== Var 结构 ====================

/// 变量句柄 - 携带图引用，支持算子重载和链式调用
///
/// - 持有 `Rc<RefCell<GraphInner>>` 引用，实现算子重载
/// - Clone 语义（非 Copy），开销极低（Rc clone）
/// - 节点创建即完成前向计算，`value()` 随时可取
///
/// ```ignore
/// let graph = Graph::new();
/// let x = graph.input(&images)?;
/// let h = x.matmul(&w)?.leaky_relu(0.01)?;
/// let loss = h.softplus()?.mean()?;
/// loss.backward()?;
/// ```
#[derive(Clone)]
pub struct Var {
    id: NodeId,
    graph: Rc<RefCell<GraphInner>>,
}

impl std::fmt::Debug for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Var").field("id", &self.id).finish()
    }
}

impl Var {
    pub(crate) const fn new(id: NodeId, graph: Rc<RefCell<GraphInner>>) -> Self {
        Self { id, graph }
    }

    pub const fn node_id(&self) -> NodeId {
        self.id
    }

    pub(crate) const fn graph(&self) -> &Rc<RefCell<GraphInner>> {
        &self.graph
    }

    pub fn same_graph(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }

    /// 获取 Var 所属的 Graph handle
    pub fn get_graph(&self) -> super::graph::Graph {
        super::graph::Graph::from_rc(Rc::clone(&self.graph))
    }

    /// 在同一张图上包装一个新节点
    pub(crate) fn wrap(&self, id: NodeId) -> Self {
        Self::new(id, Rc::clone(&self.graph))
    }

    pub(crate) fn check_same_graph(&self, other: &Self, op: &str) -> Result<(), GraphError> {
        if self.same_graph(other) {
            Ok(())
        } else {
            Err(GraphError::InvalidOperation(format!(
                "不能对来自不同 Graph 的 Var 进行{op}"
            )))
        }
    }

    pub fn name(&self) -> Result<String, GraphError> {
        Ok(self.graph.borrow().get_node_name(self.id)?.to_string())
    }

    // ==================== 执行 ====================

    /// 反向传播，返回 loss 的标量值
    pub fn backward(&self) -> Result<f32, GraphError> {
        self.graph.borrow_mut().backward(self.id)
    }

    // ==================== 值访问和设置 ====================

    /// 获取节点的值（克隆的 Tensor）
    pub fn value(&self) -> Result<Tensor, GraphError> {
        Ok(self.graph.borrow().get_node_value(self.id)?.clone())
    }

    /// 设置叶子节点的值
    pub fn set_value(&self, value: &Tensor) -> Result<(), GraphError> {
        self.graph.borrow_mut().set_node_value(self.id, value)
    }

    /// 把参数的每个元素原地截断到[lower, upper]
    pub fn clamp_parameter(&self, lower: f32, upper: f32) -> Result<(), GraphError> {
        self.graph
            .borrow_mut()
            .update_parameter(self.id, |value| value.clamp_mut(lower, upper))
    }

    /// 获取标量值
    pub fn item(&self) -> Result<f32, GraphError> {
        self.value()?
            .get_data_number()
            .ok_or_else(|| GraphError::InvalidOperation("Tensor 不是标量".to_string()))
    }

    /// 获取节点的梯度（None 表示本轮没有梯度流到此处）
    pub fn grad(&self) -> Result<Option<Tensor>, GraphError> {
        self.graph.borrow().get_node_grad(self.id)
    }

    // ==================== 梯度流控制 ====================

    pub fn requires_grad(&self) -> Result<bool, GraphError> {
        self.graph.borrow().requires_grad(self.id)
    }

    /// 设置参数是否需要梯度（只对参数节点有效）
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), GraphError> {
        self.graph
            .borrow_mut()
            .set_requires_grad(self.id, requires_grad)
    }

    pub fn is_detached(&self) -> Result<bool, GraphError> {
        self.graph.borrow().is_node_detached(self.id)
    }

    // ==================== 基本运算（返回 Result）====================

    pub fn try_add(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "加法")?;
        let id = self.graph.borrow_mut().new_add_node(self.id, other.id)?;
        Ok(self.wrap(id))
    }

    /// a - b = a + (-b)
    pub fn try_sub(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "减法")?;
        let mut g = self.graph.borrow_mut();
        let negated = g.new_negate_node(other.id)?;
        let id = g.new_add_node(self.id, negated)?;
        drop(g);
        Ok(self.wrap(id))
    }

    /// 逐元素乘法（支持广播）
    pub fn try_mul(&self, other: &Self) -> Result<Self, GraphError> {
        self.check_same_graph(other, "乘法")?;
        let id = self
            .graph
            .borrow_mut()
            .new_multiply_node(self.id, other.id)?;
        Ok(self.wrap(id))
    }

    pub fn try_neg(&self) -> Result<Self, GraphError> {
        let id = self.graph.borrow_mut().new_negate_node(self.id)?;
        Ok(self.wrap(id))
    }

    /// 加上常数
    pub fn add_scalar(&self, scalar: f32) -> Result<Self, GraphError> {
        let id = self
            .graph
            .borrow_mut()
            .new_add_scalar_node(self.id, scalar)?;
        Ok(self.wrap(id))
    }

    /// 以概率`p`随机置零（训练期使用；推理期由调用方跳过）
    pub fn dropout(&self, p: f32) -> Result<Self, GraphError> {
        let id = self.graph.borrow_mut().new_dropout_node(self.id, p)?;
        Ok(self.wrap(id))
    }
}

// ==================== 算子重载 ====================

macro_rules! impl_var_binary_op {
    ($trait:ident, $method:ident, $try_method:ident, $msg:literal) => {
        impl $trait for &Var {
            type Output = Var;

            fn $method(self, other: &Var) -> Var {
                match self.$try_method(other) {
                    Ok(var) => var,
                    Err(e) => panic!("{}: {e}", $msg),
                }
            }
        }

        impl $trait for Var {
            type Output = Self;

            fn $method(self, other: Self) -> Self {
                (&self).$method(&other)
            }
        }

        impl $trait<Var> for &Var {
            type Output = Var;

            fn $method(self, other: Var) -> Var {
                self.$method(&other)
            }
        }

        impl $trait<&Self> for Var {
            type Output = Self;

            fn $method(self, other: &Self) -> Self {
                (&self).$method(other)
            }
        }
    };
}

impl_var_binary_op!(Add, add, try_add, "Var 加法失败");
impl_var_binary_op!(Sub, sub, try_sub, "Var 减法失败");
impl_var_binary_op!(Mul, mul, try_mul, "Var 乘法失败");

impl Neg for &Var {
    type Output = Var;

    fn neg(self) -> Var {
        match self.try_neg() {
            Ok(var) => var,
            Err(e) => panic!("Var 取反失败: {e}"),
        }
    }
}

impl Neg for Var {
    type Output = Self;

    fn neg(self) -> Self {
        -&self
    }
}
