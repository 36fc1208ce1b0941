//! 配置错误类型定义

use thiserror::Error;

/// 命令行参数或运行配置不合法
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("不支持的数据集`{0}`（可选：cifar10 | svhn）")]
    UnsupportedDataset(String),

    #[error("数据集{dataset}的图像为{expected}通道，但 --nc 为{got}")]
    ChannelMismatch {
        dataset: String,
        expected: usize,
        got: usize,
    },

    #[error("截断区间无效: [{lower}, {upper}]")]
    InvalidClampRange { lower: f32, upper: f32 },

    #[error("批大小必须大于 0")]
    ZeroBatchSize,

    #[error("参数`{name}`取值无效: {reason}")]
    InvalidValue { name: &'static str, reason: String },

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置序列化失败: {0}")]
    Json(#[from] serde_json::Error),
}
