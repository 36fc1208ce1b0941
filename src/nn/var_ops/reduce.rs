use crate::nn::{GraphError, Var};

/// 归约扩展 trait
pub trait VarReduceOps {
    /// 所有元素的均值，输出形状[1, 1]
    fn mean(&self) -> Result<Var, GraphError>;
}

impl VarReduceOps for Var {
    fn mean(&self) -> Result<Var, GraphError> {
        let id = self.graph().borrow_mut().new_mean_node(self.node_id())?;
        Ok(self.wrap(id))
    }
}
