//! CIFAR-10 数据集（二进制版本）
//!
//! 每条记录 3073 字节：1 字节标签 + 3072 字节像素（R、G、B 三个 32x32 平面，行优先）。

use std::fs;
use std::path::Path;

use crate::data::DataError;
use crate::tensor::Tensor;

const BATCH_DIR: &str = "cifar-10-batches-bin";
const TRAIN_FILES: [&str; 5] = [
    "data_batch_1.bin",
    "data_batch_2.bin",
    "data_batch_3.bin",
    "data_batch_4.bin",
    "data_batch_5.bin",
];
const IMAGE_BYTES: usize = 3 * 32 * 32;
const RECORD_BYTES: usize = 1 + IMAGE_BYTES;

/// CIFAR-10 训练集（50000 张 3x32x32 图像）
#[derive(Debug, Clone, Default)]
pub struct Cifar10Dataset {
    /// 像素 [N, 3, 32, 32]，0-255
    pixels: Vec<u8>,
    /// 标签 0-9
    labels: Vec<u8>,
}

impl Cifar10Dataset {
    /// 从`{root}/cifar-10-batches-bin/`读取全部训练批次
    pub fn load(root: &Path) -> Result<Self, DataError> {
        let dir = root.join(BATCH_DIR);
        let mut dataset = Self::default();
        for file in TRAIN_FILES {
            let path = dir.join(file);
            if !path.exists() {
                return Err(DataError::FileNotFound(path));
            }
            dataset.append_records(&fs::read(&path)?)?;
        }
        Ok(dataset)
    }

    /// 解析一段二进制记录并追加
    pub fn append_records(&mut self, bytes: &[u8]) -> Result<(), DataError> {
        if bytes.len() % RECORD_BYTES != 0 {
            return Err(DataError::FormatError(format!(
                "CIFAR-10 批次文件长度{}不是记录长度{RECORD_BYTES}的整数倍",
                bytes.len()
            )));
        }
        for record in bytes.chunks_exact(RECORD_BYTES) {
            self.labels.push(record[0]);
            self.pixels.extend_from_slice(&record[1..]);
        }
        Ok(())
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
