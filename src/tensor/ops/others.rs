/*
 * @Author       : 老董
 * @Description  : 逐元素数学函数与归约
 */

use crate::tensor::Tensor;

/// 超过此阈值时 softplus(x) 直接取 x，避免 e^x 溢出
const SOFTPLUS_THRESHOLD: f32 = 20.0;

/// 数值稳定的 softplus：ln(1 + e^x)
pub(crate) fn stable_softplus(x: f32) -> f32 {
    if x > SOFTPLUS_THRESHOLD {
        x
    } else if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// 数值稳定的 sigmoid
pub(crate) fn stable_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

impl Tensor {
    /// 对每个元素应用`f`
    pub fn map(&self, f: impl Fn(f32) -> f32) -> Self {
        Self::from_array(self.data.mapv(f))
    }

    pub fn exp(&self) -> Self {
        self.map(f32::exp)
    }

    pub fn sqrt(&self) -> Self {
        self.map(f32::sqrt)
    }

    pub fn tanh(&self) -> Self {
        self.map(f32::tanh)
    }

    pub fn sigmoid(&self) -> Self {
        self.map(stable_sigmoid)
    }

    /// softplus(x) = ln(1 + e^x)（数值稳定版本）
    pub fn softplus(&self) -> Self {
        self.map(stable_softplus)
    }

    /// x > 0 时为 x，否则为 slope * x
    pub fn leaky_relu(&self, slope: f32) -> Self {
        self.map(|x| if x > 0.0 { x } else { slope * x })
    }

    /// 把每个元素截断到[lower, upper]闭区间
    pub fn clamp(&self, lower: f32, upper: f32) -> Self {
        let mut out = self.clone();
        out.clamp_mut(lower, upper);
        out
    }

    pub fn clamp_mut(&mut self, lower: f32, upper: f32) {
        self.data.mapv_inplace(|x| x.clamp(lower, upper));
    }

    /// 所有元素之和，返回形状为[1, 1]的张量
    pub fn sum(&self) -> Self {
        Self::new(&[self.data.sum()], &[1, 1])
    }

    /// 所有元素的均值，返回形状为[1, 1]的张量
    pub fn mean(&self) -> Self {
        let n = self.size().max(1) as f32;
        Self::new(&[self.data.sum() / n], &[1, 1])
    }

    pub fn min_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::min)
    }

    pub fn max_value(&self) -> Option<f32> {
        self.data.iter().copied().reduce(f32::max)
    }
}
