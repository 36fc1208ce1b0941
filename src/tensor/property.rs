use ndarray::{ArrayViewD, ArrayViewMutD};

use super::Tensor;

impl Tensor {
    pub fn view(&self) -> ArrayViewD<'_, f32> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMutD<'_, f32> {
        self.data.view_mut()
    }

    /// 张量的形状
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// 张量的阶数（维度数）
    pub fn dimension(&self) -> usize {
        self.data.ndim()
    }

    /// 张量的元素个数
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    /// 只含1个元素的张量视为标量（无论形状是[]、[1]还是[1,1]...）
    pub fn is_scalar(&self) -> bool {
        self.size() == 1
    }

    /// 若为标量则返回其值
    pub fn get_data_number(&self) -> Option<f32> {
        if self.is_scalar() {
            self.data.iter().next().copied()
        } else {
            None
        }
    }

    /// 按行优先顺序的底层数据切片
    pub fn data_as_slice(&self) -> &[f32] {
        match self.data.as_slice() {
            Some(slice) => slice,
            None => unreachable!("Tensor 内部数据始终为标准布局"),
        }
    }

    /// 按行优先顺序拷贝出所有元素
    pub fn to_vec(&self) -> Vec<f32> {
        self.data.iter().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.data.iter()
    }

    /// 所有元素是否均为有限值
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }
}
