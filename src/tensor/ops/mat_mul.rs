use ndarray::Ix2;

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 实现矩阵乘法。只接受2阶张量，否则会触发panic。
    /// 需要保证前一个张量的列数（col）等于后一个张量的行数（row），否则也会触发panic。
    pub fn mat_mul(&self, other: &Self) -> Self {
        match self.try_mat_mul(other) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    /// `mat_mul`的安全版本
    pub fn try_mat_mul(&self, other: &Self) -> Result<Self, TensorError> {
        let mismatch = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        if self.dimension() != 2 || other.dimension() != 2 || self.shape()[1] != other.shape()[0] {
            return Err(mismatch());
        }
        // 将动态维度数组转换为常量维度数组
        let a = self.data.view().into_dimensionality::<Ix2>().map_err(|_| mismatch())?;
        let b = other.data.view().into_dimensionality::<Ix2>().map_err(|_| mismatch())?;
        Ok(Self::from_array(a.dot(&b).into_dyn()))
    }
}
