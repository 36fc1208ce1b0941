//! 训练错误类型定义

use thiserror::Error;

use crate::ali::CheckpointError;
use crate::config::ConfigError;
use crate::data::DataError;
use crate::errors::TensorError;
use crate::nn::GraphError;
use crate::vision::VisionError;

/// 训练过程中的所有错误
#[derive(Debug, Error)]
pub enum AliError {
    #[error(transparent)]
    Tensor(#[from] TensorError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Vision(#[from] VisionError),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("模型组合无效: {0}")]
    InvalidBundle(String),

    #[error("数据集为空，无法训练")]
    EmptyDataset,
}
