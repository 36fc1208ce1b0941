//! 内置数据集
//!
//! - CIFAR-10：二进制版本（`cifar-10-batches-bin/data_batch_{1..5}.bin`）
//! - SVHN：MATLAB v5 格式（`train_32x32.mat`）
//!
//! 两者都只读取训练集，输出图像 [N, 3, 32, 32]（0-255）与标签 [N, 1]，
//! 再经 `transforms::prepare_images` 变为训练输入。不提供下载。

mod cifar10;
mod mat;
mod svhn;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use cifar10::Cifar10Dataset;
pub use mat::{MatArray, MatData, MatFile};
pub use svhn::SvhnDataset;

use crate::config::ConfigError;
use crate::data::transforms::prepare_images;
use crate::data::{DataError, TensorDataset};

/// 支持的数据集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    Cifar10,
    Svhn,
}

impl DatasetKind {
    /// 图像原生通道数
    pub const fn channels(self) -> usize {
        match self {
            Self::Cifar10 | Self::Svhn => 3,
        }
    }

    /// 图像原生边长
    pub const fn native_size(self) -> usize {
        32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Cifar10 => "cifar10",
            Self::Svhn => "svhn",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cifar10" => Ok(Self::Cifar10),
            "svhn" => Ok(Self::Svhn),
            other => Err(ConfigError::UnsupportedDataset(other.to_string())),
        }
    }
}

/// 读取训练集并变换为训练输入：图像 [N, C, image_size, image_size]，取值 [-1, 1]
pub fn load_dataset(
    kind: DatasetKind,
    root: impl AsRef<Path>,
    image_size: usize,
) -> Result<TensorDataset, DataError> {
    let root = root.as_ref();
    let (pixels, labels, len) = match kind {
        DatasetKind::Cifar10 => Cifar10Dataset::load(root)?.into_parts(),
        DatasetKind::Svhn => SvhnDataset::load(root)?.into_parts(),
    };
    let size = kind.native_size();
    let images = prepare_images(&pixels, [len, kind.channels(), size, size], image_size)?;
    info!(dataset = %kind, samples = len, image_size, "数据集加载完成");
    TensorDataset::new(images, labels)
}
