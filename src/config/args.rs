//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

/// ALI（Adversarially Learned Inference）训练器
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "ali_torch", version, about, allow_negative_numbers = true)]
pub struct TrainArgs {
    /// 数据集：cifar10 | svhn
    #[arg(long, default_value = "cifar10")]
    pub dataset: String,

    /// 数据集所在目录
    #[arg(long, default_value = "../data")]
    pub dataroot: PathBuf,

    /// 数据预取线程的队列规模（0 表示不预取）
    #[arg(long, default_value_t = 1)]
    pub workers: usize,

    #[arg(long, default_value_t = 128)]
    pub batch_size: usize,

    /// 输入图像的边长
    #[arg(long, default_value_t = 32)]
    pub image_size: usize,

    /// 输入图像的通道数
    #[arg(long, default_value_t = 3)]
    pub nc: usize,

    /// 隐变量 z 的维度
    #[arg(long, default_value_t = 256)]
    pub nz: usize,

    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam 学习率
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f32,

    #[arg(long, default_value_t = 0.5)]
    pub beta1: f32,

    #[arg(long, default_value_t = 0.999)]
    pub beta2: f32,

    /// LeakyReLU 负半轴斜率
    #[arg(long, default_value_t = 0.01)]
    pub leaky: f32,

    /// 权重初始化的标准差
    #[arg(long, default_value_t = 0.01)]
    pub std: f32,

    /// 判别器的 dropout 概率
    #[arg(long, default_value_t = 0.2)]
    pub dropout: f32,

    /// 使用 GPU（当前只有 CPU 实现，仅给出警告）
    #[arg(long)]
    pub cuda: bool,

    #[arg(long, default_value_t = 1)]
    pub ngpu: usize,

    /// 继续训练用的 netGx 检查点
    #[arg(long)]
    pub net_gx: Option<PathBuf>,

    #[arg(long)]
    pub net_gz: Option<PathBuf>,

    #[arg(long)]
    pub net_dx: Option<PathBuf>,

    #[arg(long)]
    pub net_dz: Option<PathBuf>,

    #[arg(long)]
    pub net_dxz: Option<PathBuf>,

    /// 参数截断区间下界
    #[arg(long, default_value_t = -0.01)]
    pub clamp_lower: f32,

    /// 参数截断区间上界
    #[arg(long, default_value_t = 0.01)]
    pub clamp_upper: f32,

    /// 图像与检查点的输出目录
    #[arg(long, default_value = "samples")]
    pub experiment: PathBuf,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,
}
