/*
 * @Author       : 老董
 * @Description  : 本模块提供把图像批次拼成网格并保存的功能。
 *                 图像批次统一为[N, C, H, W]，取值范围[0, 1]；
 *                 C 为 1 时保存为灰度图，C 为 3 时保存为 RGB 图。
 */

use std::path::Path;

use image::{GrayImage, RgbImage};
use thiserror::Error;

use crate::tensor::Tensor;


/// 网格每行的图像数
pub const GRID_NROW: usize = 8;
/// 网格中图像之间（及四周）的间隔像素数
pub const GRID_PADDING: usize = 2;

#[derive(Debug, Error)]
pub enum VisionError {
    #[error("图像张量形状{0:?}无效，期望[N, C, H, W]且 C 为 1 或 3")]
    InvalidShape(Vec<usize>),

    #[error("图像批次为空")]
    EmptyBatch,

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub struct Vision;

impl Vision {
    /// 把[N, C, H, W]拼成[C, H', W']的网格（torchvision 的`make_grid`布局）：
    /// 每行`nrow`张，图像之间及四周留`padding`像素的 0 值间隔。只有一张图时原样返回。
    pub fn make_grid(batch: &Tensor, nrow: usize, padding: usize) -> Result<Tensor, VisionError> {
        let shape = batch.shape();
        let &[n, c, h, w] = shape else {
            return Err(VisionError::InvalidShape(shape.to_vec()));
        };
        if n == 0 {
            return Err(VisionError::EmptyBatch);
        }
        if n == 1 {
            return Ok(batch.reshape(&[c, h, w]));
        }

        let cols = nrow.clamp(1, n);
        let rows = n.div_ceil(cols);
        let cell_h = h + padding;
        let cell_w = w + padding;
        let grid_h = rows * cell_h + padding;
        let grid_w = cols * cell_w + padding;

        let src = batch.data_as_slice();
        let mut grid = vec![0.0; c * grid_h * grid_w];
        for k in 0..n {
            let top = (k / cols) * cell_h + padding;
            let left = (k % cols) * cell_w + padding;
            for ch in 0..c {
                for y in 0..h {
                    let from = ((k * c + ch) * h + y) * w;
                    let to = (ch * grid_h + top + y) * grid_w + left;
                    grid[to..to + w].copy_from_slice(&src[from..from + w]);
                }
            }
        }
        Tensor::from_vec(grid, &[c, grid_h, grid_w])
            .map_err(|_| VisionError::InvalidShape(shape.to_vec()))
    }

    /// 保存[C, H, W]张量为 PNG 等图像文件；值先截断到[0, 1]再映射到 0-255
    pub fn save_image(tensor: &Tensor, path: impl AsRef<Path>) -> Result<(), VisionError> {
        let shape = tensor.shape();
        let &[c, h, w] = shape else {
            return Err(VisionError::InvalidShape(shape.to_vec()));
        };
        let (Ok(width), Ok(height)) = (u32::try_from(w), u32::try_from(h)) else {
            return Err(VisionError::InvalidShape(shape.to_vec()));
        };
        let data = tensor.data_as_slice();
        let plane = h * w;
        match c {
            1 => {
                let pixels = data.iter().map(|&v| to_u8(v)).collect();
                GrayImage::from_raw(width, height, pixels)
                    .ok_or_else(|| VisionError::InvalidShape(shape.to_vec()))?
                    .save(path)?;
            }
            3 => {
                // CHW → HWC
                let pixels = (0..plane)
                    .flat_map(|i| (0..3).map(move |ch| to_u8(data[ch * plane + i])))
                    .collect();
                RgbImage::from_raw(width, height, pixels)
                    .ok_or_else(|| VisionError::InvalidShape(shape.to_vec()))?
                    .save(path)?;
            }
            _ => return Err(VisionError::InvalidShape(shape.to_vec())),
        }
        Ok(())
    }

    /// 把批次拼成每行 8 张、间隔 2 像素的网格并保存
    pub fn save_image_grid(batch: &Tensor, path: impl AsRef<Path>) -> Result<(), VisionError> {
        let grid = Self::make_grid(batch, GRID_NROW, GRID_PADDING)?;
        Self::save_image(&grid, path)
    }
}

fn to_u8(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}
