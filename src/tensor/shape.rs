/*
 * @Author       : 老董
 * @Description  : 张量形状相关操作：重塑、拼接、截取、广播形状推断
 */

use ndarray::{Axis, IxDyn, Slice};

use super::Tensor;
use crate::errors::{Operator, TensorError};

impl Tensor {
    /// 重塑形状（元素总数须不变，否则panic）
    pub fn reshape(&self, shape: &[usize]) -> Self {
        match self.try_reshape(shape) {
            Ok(tensor) => tensor,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let data = self
            .data
            .to_shape(IxDyn(shape))
            .map_err(|_| TensorError::ReshapeMismatch {
                from: self.shape().to_vec(),
                to: shape.to_vec(),
            })?
            .into_owned();
        Ok(Self::from_array(data))
    }

    /// 沿`axis`维拼接多个张量，其余维度须一致
    pub fn concat(tensors: &[&Self], axis: usize) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if axis >= first.dimension() {
            return Err(TensorError::AxisOutOfRange {
                axis,
                dims: first.dimension(),
            });
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(axis), &views).map_err(|_| {
            let mismatched = tensors
                .iter()
                .find(|t| !same_except_axis(t.shape(), first.shape(), axis))
                .map_or_else(Vec::new, |t| t.shape().to_vec());
            TensorError::OperatorError {
                operator: Operator::Concat,
                tensor1_shape: first.shape().to_vec(),
                tensor2_shape: mismatched,
            }
        })?;
        Ok(Self::from_array(data))
    }

    /// 截取`axis`维上[start, start + len)的部分
    pub fn narrow(&self, axis: usize, start: usize, len: usize) -> Result<Self, TensorError> {
        self.check_range(axis, start, len)?;
        let data = self
            .data
            .slice_axis(Axis(axis), Slice::from(start..start + len))
            .to_owned();
        Ok(Self::from_array(data))
    }

    /// `narrow`的逆操作：把本张量放回形状为`shape`的全零张量中`axis`维的`start`处
    pub fn embed_along(&self, shape: &[usize], axis: usize, start: usize) -> Result<Self, TensorError> {
        let mut out = Self::zeros(shape);
        let len = self.shape().get(axis).copied().unwrap_or(0);
        out.check_range(axis, start, len)?;
        out.data
            .slice_axis_mut(Axis(axis), Slice::from(start..start + len))
            .assign(&self.data);
        Ok(out)
    }

    /// 按下标挑出`axis`维上的若干切片（下标可重复、可乱序）
    pub fn select(&self, axis: usize, indices: &[usize]) -> Result<Self, TensorError> {
        let dims = self.dimension();
        if axis >= dims {
            return Err(TensorError::AxisOutOfRange { axis, dims });
        }
        let len = self.shape()[axis];
        if let Some(&bad) = indices.iter().find(|&&i| i >= len) {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start: bad,
                end: bad + 1,
                len,
            });
        }
        Ok(Self::from_array(self.data.select(Axis(axis), indices)))
    }

    /// 2阶张量的转置
    pub fn transpose(&self) -> Self {
        assert!(self.dimension() == 2, "只有2阶张量才能转置");
        Self::from_array(self.data.t().to_owned())
    }

    /// 两个形状按NumPy规则广播后的形状，不兼容则返回None
    pub fn broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
        let ndim = a.len().max(b.len());
        let mut out = vec![0; ndim];
        for i in 0..ndim {
            let da = if i < ndim - a.len() { 1 } else { a[i - (ndim - a.len())] };
            let db = if i < ndim - b.len() { 1 } else { b[i - (ndim - b.len())] };
            out[i] = match (da, db) {
                (x, y) if x == y => x,
                (1, y) => y,
                (x, 1) => x,
                _ => return None,
            };
        }
        Some(out)
    }

    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        Self::broadcast_shape(self.shape(), other.shape()).is_some()
    }

    /// 广播的逆操作：对被广播出来的维度求和，使结果形状回到`shape`
    pub fn sum_to_shape(&self, shape: &[usize]) -> Self {
        if self.shape() == shape {
            return self.clone();
        }
        let mut data = self.data.clone();
        while data.ndim() > shape.len() {
            data = data.sum_axis(Axis(0));
        }
        for (axis, &dim) in shape.iter().enumerate() {
            if dim == 1 && data.shape()[axis] != 1 {
                data = data.sum_axis(Axis(axis)).insert_axis(Axis(axis));
            }
        }
        Self::from_array(data)
    }

    fn check_range(&self, axis: usize, start: usize, len: usize) -> Result<(), TensorError> {
        let dims = self.dimension();
        if axis >= dims {
            return Err(TensorError::AxisOutOfRange { axis, dims });
        }
        let axis_len = self.shape()[axis];
        if start + len > axis_len {
            return Err(TensorError::RangeOutOfBounds {
                axis,
                start,
                end: start + len,
                len: axis_len,
            });
        }
        Ok(())
    }
}

fn same_except_axis(a: &[usize], b: &[usize], axis: usize) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .enumerate()
            .all(|(i, (x, y))| i == axis || x == y)
}
