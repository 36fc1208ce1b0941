//! 数据加载模块
//!
//! 提供数据集加载、变换和批处理功能。
//!
//! # 主要组件
//!
//! - [`DataLoader`]: `PyTorch` 风格的数据批量加载器（可选后台预取）
//! - [`TensorDataset`]: 持有特征和标签的数据集
//! - [`datasets`]: CIFAR-10、SVHN 读取器
//! - [`transforms`]: 像素缩放、尺寸变换、归一化
//! - [`DataError`]: 数据加载错误类型
//!
//! # 使用示例
//!
//! ```ignore
//! use ali_torch::data::{DataLoader, DatasetKind, load_dataset};
//!
//! let dataset = load_dataset(DatasetKind::Cifar10, "../data", 32)?;
//! let loader = DataLoader::new(dataset, 128)?
//!     .shuffle(true)
//!     .seed(42)
//!     .num_workers(1);
//!
//! for (images, _labels) in loader.iter() {
//!     // images: [B, 3, 32, 32]，取值 [-1, 1]
//! }
//! ```

mod dataloader;
pub mod datasets;
pub mod error;
pub mod transforms;


pub use dataloader::{Batch, DataLoader, DataLoaderIterator, TensorDataset};
pub use datasets::{DatasetKind, load_dataset};
pub use error::DataError;
