//! # ALI Torch
//!
//! 用纯rust实现的[ALI](https://arxiv.org/abs/1606.00704)（Adversarially Learned Inference）训练器。
//! 自带一个小型的动态计算图（define-by-run）自动微分引擎，
//! 生成器组（编码器 + 解码器）与判别器组交替优化，每个 epoch 保存重建图像与检查点。
//!

pub mod ali;
pub mod config;
pub mod data;
pub mod errors;
pub mod nn;
pub mod tensor;
pub mod vision;
