//! SVHN 数据集（Format 2：32x32 裁剪数字，MATLAB v5 格式）
//!
//! `X` 形状为 [32, 32, 3, N]（列优先存储），`y` 为 [N, 1]，其中数字 0 记作 10。

use std::path::Path;

use crate::data::DataError;
use crate::data::datasets::mat::{MatArray, MatData, MatFile};
use crate::tensor::Tensor;

const TRAIN_FILE: &str = "train_32x32.mat";
const SIZE: usize = 32;
const CHANNELS: usize = 3;

/// SVHN 训练集（73257 张 3x32x32 图像）
#[derive(Debug, Clone, Default)]
pub struct SvhnDataset {
    /// 像素 [N, 3, 32, 32]，0-255
    pixels: Vec<u8>,
    /// 标签 0-9
    labels: Vec<u8>,
}

impl SvhnDataset {
    /// 读取`{root}/train_32x32.mat`
    pub fn load(root: &Path) -> Result<Self, DataError> {
        let mut file = MatFile::open(&root.join(TRAIN_FILE))?;
        let images = file.take("X")?;
        let labels = file.take("y")?;
        Self::from_arrays(&images, &labels)
    }

    /// 由`X`、`y`两个矩阵构造，把列优先的 [H, W, C, N] 重排为 [N, C, H, W]
    pub fn from_arrays(images: &MatArray, labels: &MatArray) -> Result<Self, DataError> {
        let &[h, w, c, n] = images.dims.as_slice() else {
            return Err(DataError::ShapeMismatch {
                expected: vec![SIZE, SIZE, CHANNELS, 0],
                got: images.dims.clone(),
            });
        };
        if h != SIZE || w != SIZE || c != CHANNELS {
            return Err(DataError::ShapeMismatch {
                expected: vec![SIZE, SIZE, CHANNELS, n],
                got: images.dims.clone(),
            });
        }
        if labels.data.len() != n {
            return Err(DataError::ShapeMismatch {
                expected: vec![n, 1],
                got: labels.dims.clone(),
            });
        }

        let mut pixels = vec![0u8; n * c * h * w];
        for (dst, out) in pixels.iter_mut().enumerate() {
            // dst = ((s * c + ch) * h + y) * w + x
            let x = dst % w;
            let y = (dst / w) % h;
            let ch = (dst / (w * h)) % c;
            let s = dst / (w * h * c);
            let src = y + h * (x + w * (ch + c * s));
            *out = match &images.data {
                MatData::UInt8(v) => v[src],
                MatData::Numeric(v) => v[src].clamp(0.0, 255.0) as u8,
            };
        }

        let labels = (0..n)
            .map(|i| {
                let label = labels.data.get(i).unwrap_or_default();
                if !(0.0..=10.0).contains(&label) {
                    return Err(DataError::FormatError(format!("SVHN 标签{label}无效")));
                }
                Ok((label as u8) % 10)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { pixels, labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// (像素, 标签张量 [N, 1], 样本数)
    pub fn into_parts(self) -> (Vec<u8>, Tensor, usize) {
        let len = self.len();
        let labels = self.labels.iter().map(|&l| f32::from(l)).collect::<Vec<_>>();
        (self.pixels, Tensor::new(&labels, &[len, 1]), len)
    }
}
