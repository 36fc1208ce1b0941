/*
 * @Author       : 老董
 * @Description  : ALI（Adversarially Learned Inference）训练核心
 *
 * 判别器组（Dx、Dz、Dxz）与生成器组（Gx、Gz）交替优化：
 * 每个批次先截断全部参数，构建两组损失，再依次“交出”参数控制权并各走一步 Adam。
 *
 * ```ignore
 * let graph = Graph::new_with_seed(config.seed);
 * let models = ModelBundle::create(&graph, &config.arch())?;
 * let mut session = TrainingSession::new(graph, models, config.session())?;
 * session.run(&loader)?;
 * ```
 */

pub mod checkpoint;
mod error;
pub mod gate;
pub mod loss;
mod models;
mod session;

#[cfg(test)]
mod tests;

pub use checkpoint::{CheckpointError, CheckpointKey, CheckpointPolicy, StateDict};
pub use error::AliError;
pub use models::{ArchConfig, MlpNetwork, ModelBundle, Network, NetworkKind, Role};
pub use session::{
    ADAM_EPS, EpochSummary, REAL_SAMPLES_FILE, RECONSTRUCTION_FILE, SessionConfig, StepLosses,
    TrainingSession,
};
