/*
 * @Author       : 老董
 * @Description  : 训练会话：持有五个网络、两个优化器与本批次的工作张量 (x, z, noise)，
 *                 负责单步优化、逐 epoch 训练、重建测试与检查点保存。
 */

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::ali::checkpoint::{self, CheckpointKey, CheckpointPolicy};
use crate::ali::{AliError, ModelBundle, NetworkKind, Role, gate, loss};
use crate::config::{ConfigError, invalid};
use crate::data::DataLoader;
use crate::data::transforms::{NORMALIZE_MEAN, NORMALIZE_STD, denormalize};
use crate::nn::{Adam, Graph, Optimizer, Var};
use crate::tensor::Tensor;
use crate::vision::Vision;

/// Adam 的数值稳定项
pub const ADAM_EPS: f32 = 1e-8;
pub const RECONSTRUCTION_FILE: &str = "reconstruction.png";
pub const REAL_SAMPLES_FILE: &str = "real_samples.png";

/// 训练会话参数
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub nz: usize,
    pub epochs: usize,
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub clamp_lower: f32,
    pub clamp_upper: f32,
    /// z 与 noise 的采样种子
    pub seed: u64,
    /// 图像与检查点的输出目录
    pub experiment: PathBuf,
}

impl SessionConfig {
    pub fn new(nz: usize, experiment: impl Into<PathBuf>) -> Self {
        Self {
            nz,
            epochs: 10,
            lr: 1e-4,
            beta1: 0.5,
            beta2: 0.999,
            clamp_lower: -0.01,
            clamp_upper: 0.01,
            seed: 0,
            experiment: experiment.into(),
        }
    }

    /// 截断区间为空或含 NaN、`nz`为 0、Adam 超参数越界时返回错误
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nz == 0 {
            return Err(invalid("nz", "必须大于 0"));
        }
        if !self.clamp_lower.is_finite()
            || !self.clamp_upper.is_finite()
            || self.clamp_lower > self.clamp_upper
        {
            return Err(ConfigError::InvalidClampRange {
                lower: self.clamp_lower,
                upper: self.clamp_upper,
            });
        }
        if !(self.lr.is_finite() && self.lr > 0.0) {
            return Err(invalid("lr", format!("{}不是正数", self.lr)));
        }
        for (name, beta) in [("beta1", self.beta1), ("beta2", self.beta2)] {
            if !(0.0..1.0).contains(&beta) {
                return Err(invalid(name, format!("{beta}不在[0, 1)内")));
            }
        }
        Ok(())
    }
}

/// 单个批次的两个损失值
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepLosses {
    pub d_loss: f32,
    pub g_loss: f32,
}

/// 一个 epoch 的训练统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochSummary {
    pub epoch: usize,
    pub batches: usize,
    pub mean_d_loss: f32,
    pub mean_g_loss: f32,
}

pub struct TrainingSession {
    graph: Graph,
    models: ModelBundle,
    optimizer_d: Adam,
    optimizer_g: Adam,
    config: SessionConfig,
    policy: CheckpointPolicy,
    rng: StdRng,
    x: Tensor,
    z: Tensor,
    noise: Tensor,
}

impl TrainingSession {
    /// 判别器组（Dx、Dz、Dxz）与生成器组（Gx、Gz）各用一个 Adam；配置先经`SessionConfig::validate`校验
    pub fn new(
        graph: Graph,
        models: ModelBundle,
        config: SessionConfig,
    ) -> Result<Self, AliError> {
        config.validate()?;
        let adam = |role| {
            Adam::with_config(
                &graph,
                &models.parameters_of(role),
                config.lr,
                config.beta1,
                config.beta2,
                ADAM_EPS,
            )
        };
        let optimizer_d = adam(Role::Discriminator);
        let optimizer_g = adam(Role::Generator);
        let policy = CheckpointPolicy::new(&config.experiment);
        let rng = StdRng::seed_from_u64(config.seed);
        Ok(Self {
            graph,
            models,
            optimizer_d,
            optimizer_g,
            config,
            policy,
            rng,
            x: Tensor::zeros(&[0]),
            z: Tensor::zeros(&[0]),
            noise: Tensor::zeros(&[0]),
        })
    }

    pub const fn graph(&self) -> &Graph {
        &self.graph
    }

    pub const fn models(&self) -> &ModelBundle {
        &self.models
    }

    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub const fn checkpoint_policy(&self) -> &CheckpointPolicy {
        &self.policy
    }

    /// 最近一个批次的输入
    pub const fn x(&self) -> &Tensor {
        &self.x
    }

    /// 最近一个批次采样的 z
    pub const fn z(&self) -> &Tensor {
        &self.z
    }

    /// 最近一个批次采样的 noise
    pub const fn noise(&self) -> &Tensor {
        &self.noise
    }

    pub const fn optimizers(&self) -> (&Adam, &Adam) {
        (&self.optimizer_d, &self.optimizer_g)
    }

    /// 用当前参数计算一组损失（`Discriminator`为判别器损失，`Generator`为生成器损失）
    pub fn compute_loss(
        &self,
        x: &Tensor,
        z: &Tensor,
        noise: &Tensor,
        role: Role,
    ) -> Result<Var, AliError> {
        let x = self.graph.input(x)?;
        let z = self.graph.input(z)?;
        let noise = self.graph.input(noise)?;
        Ok(loss::compute_loss(&self.models, &x, &z, &noise, self.config.nz, role)?)
    }

    /// 把五个网络的所有参数截断到[clamp_lower, clamp_upper]
    pub fn clamp_parameters(&self) -> Result<(), AliError> {
        let (lower, upper) = (self.config.clamp_lower, self.config.clamp_upper);
        for param in self.models.parameters() {
            param.clamp_parameter(lower, upper)?;
        }
        Ok(())
    }

    /// 对一个批次执行一次完整的对抗更新，顺序固定：
    /// 采样 z 与 noise → 截断参数 → 构建两个损失 → 更新判别器 → 更新生成器。
    /// 生成器损失的反向传播使用判别器更新前记录的前向值。
    pub fn train_step(&mut self, batch: &Tensor) -> Result<StepLosses, AliError> {
        self.graph.prune_transient_nodes();

        let batch_size = batch.shape().first().copied().unwrap_or(0);
        if batch_size == 0 {
            return Err(AliError::EmptyDataset);
        }
        let nz = self.config.nz;
        self.x = batch.clone();
        self.z = Tensor::normal_with_rng(0.0, 1.0, &[batch_size, nz, 1, 1], &mut self.rng);
        self.noise = Tensor::normal_with_rng(0.0, 1.0, &[batch_size, 1, 1, 1], &mut self.rng);

        self.clamp_parameters()?;

        let x = self.graph.input_named(&self.x, "x")?;
        let z = self.graph.input_named(&self.z, "z")?;
        let noise = self.graph.input_named(&self.noise, "noise")?;
        let d_loss = loss::compute_loss(&self.models, &x, &z, &noise, nz, Role::Discriminator)?;
        let g_loss = loss::compute_loss(&self.models, &x, &z, &noise, nz, Role::Generator)?;

        gate::hand_over(&self.models, Role::Discriminator)?;
        self.optimizer_d.zero_grad()?;
        let d_loss = d_loss.backward()?;
        self.optimizer_d.step()?;

        gate::hand_over(&self.models, Role::Generator)?;
        self.optimizer_g.zero_grad()?;
        let g_loss = g_loss.backward()?;
        self.optimizer_g.step()?;

        Ok(StepLosses { d_loss, g_loss })
    }

    /// 训练一个 epoch（epoch 从 0 计）：五个网络进入训练模式，每个批次执行一次`train_step`
    pub fn train_epoch(
        &mut self,
        loader: &DataLoader,
        epoch: usize,
    ) -> Result<EpochSummary, AliError> {
        self.models.set_training(true);
        let total = loader.num_batches();
        let (mut d_sum, mut g_sum, mut batches) = (0.0, 0.0, 0);

        for (batch_id, batch) in loader.iter().enumerate() {
            let (images, _labels) = batch?;
            let losses = self.train_step(&images)?;
            info!(
                "[{}/{}][{}/{}] Loss_D: {} Loss_G: {}",
                epoch + 1,
                self.config.epochs,
                batch_id + 1,
                total,
                losses.d_loss,
                losses.g_loss
            );
            d_sum += losses.d_loss;
            g_sum += losses.g_loss;
            batches += 1;
        }

        let mean = |sum: f32| if batches == 0 { 0.0 } else { sum / batches as f32 };
        Ok(EpochSummary {
            epoch,
            batches,
            mean_d_loss: mean(d_sum),
            mean_g_loss: mean(g_sum),
        })
    }

    /// 重建：recon = Gx(mu + sigma)，其中 (mu, sigma) 由 Gz(images) 给出。
    /// Gx、Gz 切换到推理模式，不记录梯度，不修改任何参数。
    pub fn reconstruct(&self, images: &Tensor) -> Result<Tensor, AliError> {
        self.graph.prune_transient_nodes();
        self.models.gx().eval();
        self.models.gz().eval();

        let nz = self.config.nz;
        let recon = self.graph.no_grad_scope(|graph| -> Result<Tensor, AliError> {
            let x = graph.input(images)?;
            let loss::Posterior { mu, sigma } = loss::posterior(&self.models, &x, nz)?;
            let code = mu.try_add(&sigma)?;
            Ok(self.models.gx().forward(&code)?.value()?)
        })?;

        self.graph.prune_transient_nodes();
        Ok(recon)
    }

    /// 取新一轮遍历的第一个批次，反归一化到[0, 1]后重建，
    /// 把重建结果与原图分别保存为`reconstruction.png`与`real_samples.png`
    pub fn test(&self, loader: &DataLoader, epoch: usize) -> Result<Option<Tensor>, AliError> {
        let Some(batch) = loader.iter().next() else {
            return Ok(None);
        };
        let (images, _labels) = batch?;
        let real = denormalize(&images, NORMALIZE_MEAN, NORMALIZE_STD);
        let recon = self.reconstruct(&real)?;

        let dir = &self.config.experiment;
        std::fs::create_dir_all(dir)?;
        Vision::save_image_grid(&recon, dir.join(RECONSTRUCTION_FILE))?;
        Vision::save_image_grid(&real, dir.join(REAL_SAMPLES_FILE))?;
        debug!(epoch, dir = %dir.display(), "重建图像已保存");
        Ok(Some(recon))
    }

    /// 按`(网络, epoch)`保存五个网络的参数，返回写出的文件路径
    pub fn save_checkpoints(&self, epoch: usize) -> Result<Vec<PathBuf>, AliError> {
        let mut paths = Vec::with_capacity(NetworkKind::ALL.len());
        for network in self.models.iter() {
            let path = self.policy.path(CheckpointKey {
                network: network.kind(),
                epoch,
            });
            checkpoint::save_network(network, &path)?;
            paths.push(path);
        }
        Ok(paths)
    }

    /// 从检查点恢复指定网络
    pub fn load_checkpoint(&self, kind: NetworkKind, path: &Path) -> Result<(), AliError> {
        checkpoint::load_network(self.models.get(kind), path)?;
        Ok(())
    }

    /// 完整训练：每个 epoch 依次训练、重建测试、保存检查点
    pub fn run(&mut self, loader: &DataLoader) -> Result<Vec<EpochSummary>, AliError> {
        if loader.is_empty() {
            return Err(AliError::EmptyDataset);
        }
        let mut summaries = Vec::with_capacity(self.config.epochs);
        for epoch in 0..self.config.epochs {
            let summary = self.train_epoch(loader, epoch)?;
            info!(
                epoch = epoch + 1,
                batches = summary.batches,
                mean_d_loss = summary.mean_d_loss,
                mean_g_loss = summary.mean_g_loss,
                "epoch 结束"
            );
            self.test(loader, epoch)?;
            self.save_checkpoints(epoch)?;
            summaries.push(summary);
        }
        Ok(summaries)
    }
}
