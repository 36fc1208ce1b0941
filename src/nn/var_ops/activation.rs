/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 激活函数扩展 trait
 */

use crate::nn::{GraphError, Var};

/// 激活函数扩展 trait
///
/// ```ignore
/// use ali_torch::nn::VarActivationOps;
///
/// let h = x.leaky_relu(0.01)?;
/// let sigma = log_sigma.exp()?;
/// ```
pub trait VarActivationOps {
    /// e^x
    fn exp(&self) -> Result<Var, GraphError>;

    fn tanh(&self) -> Result<Var, GraphError>;

    /// `LeakyReLU` 激活：x if x > 0 else slope * x
    fn leaky_relu(&self, slope: f32) -> Result<Var, GraphError>;

    /// `SoftPlus` 激活：ln(1 + e^x)
    fn softplus(&self) -> Result<Var, GraphError>;
}

impl VarActivationOps for Var {
    fn exp(&self) -> Result<Var, GraphError> {
        let id = self.graph().borrow_mut().new_exp_node(self.node_id())?;
        Ok(self.wrap(id))
    }

    fn tanh(&self) -> Result<Var, GraphError> {
        let id = self.graph().borrow_mut().new_tanh_node(self.node_id())?;
        Ok(self.wrap(id))
    }

    fn leaky_relu(&self, slope: f32) -> Result<Var, GraphError> {
        let id = self
            .graph()
            .borrow_mut()
            .new_leaky_relu_node(self.node_id(), slope)?;
        Ok(self.wrap(id))
    }

    fn softplus(&self) -> Result<Var, GraphError> {
        let id = self.graph().borrow_mut().new_softplus_node(self.node_id())?;
        Ok(self.wrap(id))
    }
}
