/*
 * @Author       : 老董
 * @Date         : 2023-08-17 17:24:24
 * @Description  : 张量的四则运算，实现了两个张量“逐元素”（或张量与纯数）运算，并返回一个新的张量。
 *                 该运算支持以下情况：
 *                 1. 其中一个操作数为纯数而另一个为张量：则返回的张量形状与该张量相同。
 *                 2. 两个操作数均为张量：支持 NumPy 风格的广播（broadcasting）。
 */

use std::ops::{Add, Div, Mul, Neg, Sub};

use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;

impl Tensor {
    /// 带广播的逐元素二元运算（安全版本）
    pub fn try_binary(
        &self,
        other: &Self,
        operator: Operator,
        f: impl Fn(f32, f32) -> f32,
    ) -> Result<Self, TensorError> {
        let shape = Self::broadcast_shape(self.shape(), other.shape()).ok_or_else(|| {
            TensorError::OperatorError {
                operator,
                tensor1_shape: self.shape().to_vec(),
                tensor2_shape: other.shape().to_vec(),
            }
        })?;
        let shape = ndarray::IxDyn(&shape);
        // 形状已校验，broadcast 不会失败
        let (Some(a), Some(b)) = (self.data.broadcast(shape.clone()), other.data.broadcast(shape))
        else {
            return Err(TensorError::IncompatibleShape);
        };
        let mut out = a.to_owned();
        out.zip_mut_with(&b, |x, &y| *x = f(*x, y));
        Ok(Self::from_array(out))
    }
}

macro_rules! impl_tensor_binary_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl<'a, 'b> $trait<&'b Tensor> for &'a Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                match self.try_binary(other, Operator::$trait, |a, b| a $op b) {
                    Ok(tensor) => tensor,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait for Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                &self $op &other
            }
        }

        impl<'b> $trait<&'b Tensor> for Tensor {
            type Output = Tensor;

            fn $method(self, other: &'b Tensor) -> Tensor {
                &self $op other
            }
        }

        impl<'a> $trait<Tensor> for &'a Tensor {
            type Output = Tensor;

            fn $method(self, other: Tensor) -> Tensor {
                self $op &other
            }
        }

        impl $trait<f32> for &Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                Tensor::from_array(self.data.mapv(|x| x $op scalar))
            }
        }

        impl $trait<f32> for Tensor {
            type Output = Tensor;

            fn $method(self, scalar: f32) -> Tensor {
                &self $op scalar
            }
        }

        impl $trait<&Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: &Tensor) -> Tensor {
                Tensor::from_array(tensor.data.mapv(|x| self $op x))
            }
        }

        impl $trait<Tensor> for f32 {
            type Output = Tensor;

            fn $method(self, tensor: Tensor) -> Tensor {
                self $op &tensor
            }
        }
    };
}

impl_tensor_binary_op!(Add, add, +);
impl_tensor_binary_op!(Sub, sub, -);
impl_tensor_binary_op!(Mul, mul, *);
impl_tensor_binary_op!(Div, div, /);

impl Neg for &Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        Tensor::from_array(self.data.mapv(|x| -x))
    }
}

impl Neg for Tensor {
    type Output = Tensor;

    fn neg(self) -> Tensor {
        -&self
    }
}
