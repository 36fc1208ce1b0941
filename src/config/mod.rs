/*
 * @Author       : 老董
 * @Description  : 运行配置：命令行参数 → 校验后的训练配置
 */

mod args;
mod error;


use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use args::TrainArgs;
pub use error::ConfigError;

use crate::ali::{ArchConfig, NetworkKind, SessionConfig};
use crate::data::DatasetKind;

/// 写在实验目录下的配置文件名
pub const CONFIG_FILE: &str = "config.json";

/// 校验后的训练配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset: DatasetKind,
    pub dataroot: PathBuf,
    pub workers: usize,
    pub batch_size: usize,
    pub image_size: usize,
    pub nc: usize,
    pub nz: usize,
    pub epochs: usize,
    pub lr: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub leaky: f32,
    pub std: f32,
    pub dropout: f32,
    pub cuda: bool,
    pub ngpu: usize,
    /// 需要从检查点恢复的网络
    pub pretrained: BTreeMap<NetworkKind, PathBuf>,
    pub clamp_lower: f32,
    pub clamp_upper: f32,
    pub experiment: PathBuf,
    pub seed: u64,
}

impl TrainConfig {
    /// 由命令行参数构造并校验
    pub fn from_args(args: TrainArgs) -> Result<Self, ConfigError> {
        let dataset = args.dataset.parse::<DatasetKind>()?;
        let pretrained = [
            (NetworkKind::Gx, args.net_gx),
            (NetworkKind::Gz, args.net_gz),
            (NetworkKind::Dx, args.net_dx),
            (NetworkKind::Dz, args.net_dz),
            (NetworkKind::Dxz, args.net_dxz),
        ]
        .into_iter()
        .filter_map(|(kind, path)| path.map(|p| (kind, p)))
        .collect();

        let config = Self {
            dataset,
            dataroot: args.dataroot,
            workers: args.workers,
            batch_size: args.batch_size,
            image_size: args.image_size,
            nc: args.nc,
            nz: args.nz,
            epochs: args.epochs,
            lr: args.lr,
            beta1: args.beta1,
            beta2: args.beta2,
            leaky: args.leaky,
            std: args.std,
            dropout: args.dropout,
            cuda: args.cuda,
            ngpu: args.ngpu,
            pretrained,
            clamp_lower: args.clamp_lower,
            clamp_upper: args.clamp_upper,
            experiment: args.experiment,
            seed: args.seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::ZeroBatchSize);
        }
        if self.nc != self.dataset.channels() {
            return Err(ConfigError::ChannelMismatch {
                dataset: self.dataset.to_string(),
                expected: self.dataset.channels(),
                got: self.nc,
            });
        }
        if self.image_size == 0 {
            return Err(invalid("image_size", "必须大于 0"));
        }
        self.session().validate()?;
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(invalid("dropout", format!("{}不在[0, 1)内", self.dropout)));
        }
        if !(self.std.is_finite() && self.std >= 0.0) {
            return Err(invalid("std", format!("{}不是非负数", self.std)));
        }
        if !self.leaky.is_finite() {
            return Err(invalid("leaky", "必须是有限值"));
        }
        Ok(())
    }

    /// 网络结构参数
    pub fn arch(&self) -> ArchConfig {
        ArchConfig {
            leaky: self.leaky,
            std: self.std,
            dropout: self.dropout,
            ..ArchConfig::new(self.nc, self.image_size, self.nz)
        }
    }

    /// 训练会话参数
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            nz: self.nz,
            epochs: self.epochs,
            lr: self.lr,
            beta1: self.beta1,
            beta2: self.beta2,
            clamp_lower: self.clamp_lower,
            clamp_upper: self.clamp_upper,
            seed: self.seed,
            experiment: self.experiment.clone(),
        }
    }

    /// 当前只有 CPU 实现：要求 GPU 时给出警告
    pub fn warn_unsupported(&self) {
        if self.cuda {
            warn!(ngpu = self.ngpu, "没有可用的 GPU 后端，训练将在 CPU 上进行");
        }
    }

    /// 创建实验目录并写入`config.json`，返回文件路径
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        fs::create_dir_all(&self.experiment)?;
        let path = self.experiment.join(CONFIG_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        info!(path = %path.display(), "运行配置已保存");
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        config.validate()?;
        Ok(config)
    }
}

pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        name,
        reason: reason.into(),
    }
}
