//! 数据变换函数
//!
//! 图像批次统一为 [N, C, H, W]，依次经过：像素缩放到 [0, 1] → 必要时改变尺寸 → 归一化到 [-1, 1]。

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};

use crate::data::DataError;
use crate::tensor::Tensor;

/// 训练输入使用的归一化参数（各通道相同）
pub const NORMALIZE_MEAN: f32 = 0.5;
pub const NORMALIZE_STD: f32 = 0.5;

/// 按通道共用的均值/标准差归一化：(x - mean) / std
///
/// mean = std = 0.5 时把 [0, 1] 映射到 [-1, 1]
pub fn normalize(tensor: &Tensor, mean: f32, std: f32) -> Tensor {
    tensor.map(|x| (x - mean) / std)
}

/// `normalize`的逆变换：x * std + mean
pub fn denormalize(tensor: &Tensor, mean: f32, std: f32) -> Tensor {
    tensor.map(|x| x * std + mean)
}

fn to_u32(value: usize, what: &str) -> Result<u32, DataError> {
    u32::try_from(value).map_err(|_| DataError::FormatError(format!("{what}{value}过大")))
}

/// 双线性缩放单个通道平面（h x w → size x size）
fn resize_plane(plane: &[f32], h: usize, w: usize, size: usize) -> Result<Vec<f32>, DataError> {
    let buffer =
        ImageBuffer::<Luma<f32>, Vec<f32>>::from_raw(to_u32(w, "图像宽度")?, to_u32(h, "图像高度")?, plane.to_vec())
            .ok_or_else(|| DataError::FormatError("通道数据长度与图像尺寸不符".to_string()))?;
    let target = to_u32(size, "目标尺寸")?;
    Ok(imageops::resize(&buffer, target, target, FilterType::Triangle).into_raw())
}

/// 把 [N, C, H, W] 的每张图缩放到 size x size；尺寸已一致时原样返回
pub fn resize_images(tensor: &Tensor, size: usize) -> Result<Tensor, DataError> {
    let shape = tensor.shape();
    if shape.len() != 4 {
        return Err(DataError::ShapeMismatch {
            expected: vec![0, 0, size, size],
            got: shape.to_vec(),
        });
    }
    let (n, c, h, w) = (shape[0], shape[1], shape[2], shape[3]);
    if h == size && w == size {
        return Ok(tensor.clone());
    }
    let mut out = Vec::with_capacity(n * c * size * size);
    for plane in tensor.data_as_slice().chunks(h * w) {
        out.extend(resize_plane(plane, h, w, size)?);
    }
    Ok(Tensor::from_vec(out, &[n, c, size, size])?)
}

/// 原始像素（0-255，按 [N, C, H, W] 排列）→ 训练输入（[-1, 1]，尺寸为 image_size）
///
/// 逐通道平面处理，只分配一份输出。
pub fn prepare_images(
    pixels: &[u8],
    shape: [usize; 4],
    image_size: usize,
) -> Result<Tensor, DataError> {
    let [n, c, h, w] = shape;
    if pixels.len() != n * c * h * w {
        return Err(DataError::ShapeMismatch {
            expected: shape.to_vec(),
            got: vec![pixels.len()],
        });
    }
    let to_input = |x: f32| (x - NORMALIZE_MEAN) / NORMALIZE_STD;
    let mut out = Vec::with_capacity(n * c * image_size * image_size);
    if h == image_size && w == image_size {
        out.extend(pixels.iter().map(|&p| to_input(f32::from(p) / 255.0)));
    } else {
        for plane in pixels.chunks(h * w) {
            let unit = plane.iter().map(|&p| f32::from(p) / 255.0).collect::<Vec<_>>();
            out.extend(resize_plane(&unit, h, w, image_size)?.into_iter().map(to_input));
        }
    }
    Ok(Tensor::from_vec(out, &[n, c, image_size, image_size])?)
}
