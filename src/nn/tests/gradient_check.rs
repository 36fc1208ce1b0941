//! 有限差分数值梯度，用于校验各算子的 VJP

use crate::nn::{Graph, Var};
use crate::tensor::Tensor;

/// 用中心差分估计 d(loss)/d(param)。`build`每次都在当前参数值上重新建图并返回标量损失
pub(super) fn numeric_grad(graph: &Graph, param: &Var, build: impl Fn() -> Var) -> Tensor {
    const H: f32 = 1e-3;
    let original = param.value().unwrap();
    let mut data = original.to_vec();
    let mut grad = vec![0.0; data.len()];
    for i in 0..data.len() {
        let x = data[i];
        data[i] = x + H;
        param.set_value(&Tensor::new(&data, original.shape())).unwrap();
        let plus = build().item().unwrap();
        data[i] = x - H;
        param.set_value(&Tensor::new(&data, original.shape())).unwrap();
        let minus = build().item().unwrap();
        data[i] = x;
        grad[i] = (plus - minus) / (2.0 * H);
    }
    param.set_value(&original).unwrap();
    graph.prune_transient_nodes();
    Tensor::new(&grad, original.shape())
}
