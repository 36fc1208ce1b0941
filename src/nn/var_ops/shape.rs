/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 形状变换扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 形状变换扩展 trait
pub trait VarShapeOps: Sized {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError>;

    /// 展平成 [batch, features]
    fn flatten(&self) -> Result<Var, GraphError>;

    /// 截取`axis`维上 [start, start + len) 的部分
    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError>;

    /// 沿`axis`维拼接（本变量在前）
    fn concat(&self, others: &[&Var], axis: usize) -> Result<Var, GraphError>;
}

impl VarShapeOps for Var {
    fn reshape(&self, shape: &[usize]) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_reshape_node(self.node_id(), shape)?;
        Ok(self.wrap(id))
    }

    fn flatten(&self) -> Result<Var, GraphError> {
        let shape = self.value()?.shape().to_vec();
        let batch = shape.first().copied().unwrap_or(1);
        let features = shape.iter().skip(1).product::<usize>();
        self.reshape(&[batch, features])
    }

    fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_narrow_node(self.node_id(), axis, start, len)?;
        Ok(self.wrap(id))
    }

    fn concat(&self, others: &[&Var], axis: usize) -> Result<Var, GraphError> {
        let mut ids = vec![self.node_id()];
        for other in others {
            self.check_same_graph(other, "拼接")?;
            ids.push(other.node_id());
        }
        let id = self.graph().borrow_mut().new_concat_node(&ids, axis)?;
        Ok(self.wrap(id))
    }
}
