/*
 * @Author       : 老董
 * @Description  : 检查点：(网络, epoch) → 文件路径；参数状态字典的保存与载入
 *
 * 文件格式：魔数`ALIC` + 版本号(u32, 小端) + bincode 编码的 BTreeMap<参数名, Tensor>
 */

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::ali::{Network, NetworkKind};
use crate::nn::GraphError;
use crate::tensor::Tensor;

const CHECKPOINT_MAGIC: &[u8; 4] = b"ALIC";
const CHECKPOINT_VERSION: u32 = 1;

/// 参数状态字典
pub type StateDict = BTreeMap<String, Tensor>;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("检查点 IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("检查点编码错误: {0}")]
    Encoding(#[from] bincode::Error),

    #[error("{path}不是检查点文件（魔数不匹配）")]
    BadMagic { path: PathBuf },

    #[error("不支持的检查点版本{found}（当前版本{}）", CHECKPOINT_VERSION)]
    UnsupportedVersion { found: u32 },

    /// 参数缺失或形状不一致
    #[error("检查点与网络{network}不匹配: {source}")]
    Mismatch {
        network: NetworkKind,
        #[source]
        source: GraphError,
    },
}

/// 检查点的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckpointKey {
    pub network: NetworkKind,
    pub epoch: usize,
}

/// 检查点文件的命名规则：`{dir}/{network}_epoch_{epoch}.{extension}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointPolicy {
    dir: PathBuf,
    extension: String,
}

impl CheckpointPolicy {
    pub const DEFAULT_EXTENSION: &'static str = "bin";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: Self::DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: CheckpointKey) -> PathBuf {
        self.dir.join(format!(
            "{}_epoch_{}.{}",
            key.network.name(),
            key.epoch,
            self.extension
        ))
    }
}

/// 把状态字典写入`path`
pub fn save_state_dict(state: &StateDict, path: &Path) -> Result<(), CheckpointError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(CHECKPOINT_MAGIC)?;
    writer.write_all(&CHECKPOINT_VERSION.to_le_bytes())?;
    bincode::serialize_into(&mut writer, state)?;
    writer.flush()?;
    Ok(())
}

/// 从`path`读取状态字典
pub fn load_state_dict(path: &Path) -> Result<StateDict, CheckpointError> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != CHECKPOINT_MAGIC {
        return Err(CheckpointError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let version = u32::from_le_bytes(version);
    if version != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion { found: version });
    }

    Ok(bincode::deserialize_from(reader)?)
}

/// 保存一个网络的参数
pub fn save_network(network: &dyn Network, path: &Path) -> Result<(), CheckpointError> {
    let state = network
        .state_dict()
        .map_err(|source| CheckpointError::Mismatch {
            network: network.kind(),
            source,
        })?;
    save_state_dict(&state, path)?;
    info!(network = %network.kind(), path = %path.display(), "检查点已保存");
    Ok(())
}

/// 从检查点恢复一个网络：每个参数都须存在且形状一致，否则网络保持不变
pub fn load_network(network: &dyn Network, path: &Path) -> Result<(), CheckpointError> {
    let state = load_state_dict(path)?;
    network
        .load_state_dict(&state)
        .map_err(|source| CheckpointError::Mismatch {
            network: network.kind(),
            source,
        })?;
    info!(network = %network.kind(), path = %path.display(), "已从检查点恢复");
    Ok(())
}
