/*
 * @Author       : 老董
 * @Description  : ALI 的五个网络：Gx（解码器 z→x）、Gz（编码器 x→(mu, log sigma)）、
 *                 Dx（数据路径特征）、Dz（隐变量路径特征）、Dxz（联合判别器）
 */

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ali::AliError;
use crate::nn::{
    Graph, GraphError, Init, Linear, Module, Var, VarActivationOps, VarShapeOps,
};

/// 网络所属的优化组
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Gx、Gz
    Generator,
    /// Dx、Dz、Dxz
    Discriminator,
}

impl Role {
    /// 对手组
    pub const fn opponent(self) -> Self {
        match self {
            Self::Generator => Self::Discriminator,
            Self::Discriminator => Self::Generator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NetworkKind {
    Gx,
    Gz,
    Dx,
    Dz,
    Dxz,
}

impl NetworkKind {
    /// 固定顺序：Gx, Gz, Dx, Dz, Dxz
    pub const ALL: [Self; 5] = [Self::Gx, Self::Gz, Self::Dx, Self::Dz, Self::Dxz];

    /// 参数名前缀，也是检查点文件名前缀
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gx => "netGx",
            Self::Gz => "netGz",
            Self::Dx => "netDx",
            Self::Dz => "netDz",
            Self::Dxz => "netDxz",
        }
    }

    pub const fn role(self) -> Role {
        match self {
            Self::Gx | Self::Gz => Role::Generator,
            Self::Dx | Self::Dz | Self::Dxz => Role::Discriminator,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Gx => 0,
            Self::Gz => 1,
            Self::Dx => 2,
            Self::Dz => 3,
            Self::Dxz => 4,
        }
    }
}

impl fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 网络结构参数
#[derive(Debug, Clone, PartialEq)]
pub struct ArchConfig {
    /// 图像通道数
    pub nc: usize,
    /// 图像边长
    pub image_size: usize,
    /// 隐变量维度
    pub nz: usize,
    /// 隐藏层宽度
    pub hidden: usize,
    /// Dx、Dz 输出的特征维度
    pub features: usize,
    /// LeakyReLU 负半轴斜率
    pub leaky: f32,
    /// 权重初始化 N(0, std)
    pub std: f32,
    /// 判别器 dropout 概率
    pub dropout: f32,
}

impl ArchConfig {
    pub const DEFAULT_HIDDEN: usize = 512;
    pub const DEFAULT_FEATURES: usize = 512;

    pub fn new(nc: usize, image_size: usize, nz: usize) -> Self {
        Self {
            nc,
            image_size,
            nz,
            hidden: Self::DEFAULT_HIDDEN,
            features: Self::DEFAULT_FEATURES,
            leaky: 0.01,
            std: 0.01,
            dropout: 0.2,
        }
    }

    /// 展平后的图像维度
    pub const fn image_dim(&self) -> usize {
        self.nc * self.image_size * self.image_size
    }
}

/// ALI 中的一个网络
///
/// 输入/输出形状：
/// - Gx: [B, nz, 1, 1] → [B, nc, H, W]（取值 (-1, 1)）
/// - Gz: [B, nc, H, W] → [B, 2nz, 1, 1]（前 nz 个通道为 mu，后 nz 个为 log sigma）
/// - Dx: [B, nc, H, W] → [B, F]
/// - Dz: [B, nz, 1, 1] → [B, F]
/// - Dxz: [B, 2F] → [B, 1]
pub trait Network: Module {
    fn kind(&self) -> NetworkKind;

    fn role(&self) -> Role {
        self.kind().role()
    }

    fn forward(&self, x: &Var) -> Result<Var, GraphError>;

    /// 训练模式下才启用 dropout 等随机层
    fn set_training(&self, training: bool);

    fn is_training(&self) -> bool;

    fn train(&self) {
        self.set_training(true);
    }

    fn eval(&self) {
        self.set_training(false);
    }
}

/// 最后一层之后的处理
#[derive(Debug, Clone, Copy)]
enum Head {
    /// tanh 后还原为 [B, C, H, W]
    Image { channels: usize, size: usize },
    /// 还原为 [B, channels, 1, 1]
    Latent { channels: usize },
    /// LeakyReLU 特征
    Features,
    /// 原始分数
    Logit,
}

/// 由若干 Linear + LeakyReLU 组成的多层感知机
pub struct MlpNetwork {
    kind: NetworkKind,
    layers: Vec<Linear>,
    head: Head,
    slope: f32,
    /// 每个 Linear 之前的 dropout 概率（0 表示不使用）
    dropout: f32,
    training: Cell<bool>,
}

impl MlpNetwork {
    /// 按`kind`创建对应结构的网络，参数名形如`netGx.fc1_W`
    pub fn new(graph: &Graph, kind: NetworkKind, arch: &ArchConfig) -> Result<Self, GraphError> {
        let image = arch.image_dim();
        let (dims, head) = match kind {
            NetworkKind::Gx => (
                vec![arch.nz, arch.hidden, arch.hidden, image],
                Head::Image {
                    channels: arch.nc,
                    size: arch.image_size,
                },
            ),
            NetworkKind::Gz => (
                vec![image, arch.hidden, arch.hidden, 2 * arch.nz],
                Head::Latent {
                    channels: 2 * arch.nz,
                },
            ),
            NetworkKind::Dx => (vec![image, arch.hidden, arch.features], Head::Features),
            NetworkKind::Dz => (vec![arch.nz, arch.hidden, arch.features], Head::Features),
            NetworkKind::Dxz => (vec![2 * arch.features, arch.hidden, 1], Head::Logit),
        };
        let dropout = match kind.role() {
            Role::Generator => 0.0,
            Role::Discriminator => arch.dropout,
        };
        let init = Init::Normal {
            mean: 0.0,
            std: arch.std,
        };

        let layers = dims
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let name = format!("{}.fc{}", kind.name(), i + 1);
                Linear::new(graph, pair[0], pair[1], true, init.clone(), &name)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            kind,
            layers,
            head,
            slope: arch.leaky,
            dropout,
            training: Cell::new(true),
        })
    }

    pub fn layers(&self) -> &[Linear] {
        &self.layers
    }
}

impl Module for MlpNetwork {
    fn parameters(&self) -> Vec<Var> {
        self.layers.iter().flat_map(Module::parameters).collect()
    }
}

impl Network for MlpNetwork {
    fn kind(&self) -> NetworkKind {
        self.kind
    }

    fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let batch = x.value()?.shape().first().copied().unwrap_or(1);
        let last = self.layers.len().saturating_sub(1);
        let mut h = x.flatten()?;
        for (i, layer) in self.layers.iter().enumerate() {
            if self.dropout > 0.0 && self.is_training() {
                h = h.dropout(self.dropout)?;
            }
            h = layer.forward(&h)?;
            if i < last {
                h = h.leaky_relu(self.slope)?;
            }
        }
        match self.head {
            Head::Image { channels, size } => h.tanh()?.reshape(&[batch, channels, size, size]),
            Head::Latent { channels } => h.reshape(&[batch, channels, 1, 1]),
            Head::Features => h.leaky_relu(self.slope),
            Head::Logit => Ok(h),
        }
    }

    fn set_training(&self, training: bool) {
        self.training.set(training);
    }

    fn is_training(&self) -> bool {
        self.training.get()
    }
}

/// 五个网络，按 Gx, Gz, Dx, Dz, Dxz 的固定顺序存放
pub struct ModelBundle {
    networks: Vec<Box<dyn Network>>,
}

impl ModelBundle {
    /// 在`graph`上创建五个 MLP 网络
    pub fn create(graph: &Graph, arch: &ArchConfig) -> Result<Self, AliError> {
        let networks = NetworkKind::ALL
            .into_iter()
            .map(|kind| -> Result<Box<dyn Network>, GraphError> {
                Ok(Box::new(MlpNetwork::new(graph, kind, arch)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_networks(networks)
    }

    /// 由任意五个网络组成，顺序必须是 Gx, Gz, Dx, Dz, Dxz
    pub fn from_networks(networks: Vec<Box<dyn Network>>) -> Result<Self, AliError> {
        let kinds = networks.iter().map(|n| n.kind()).collect::<Vec<_>>();
        if kinds != NetworkKind::ALL {
            return Err(AliError::InvalidBundle(format!(
                "需要按 Gx, Gz, Dx, Dz, Dxz 顺序给出五个网络，实际为{kinds:?}"
            )));
        }
        Ok(Self { networks })
    }

    pub fn get(&self, kind: NetworkKind) -> &dyn Network {
        self.networks[kind.index()].as_ref()
    }

    pub fn gx(&self) -> &dyn Network {
        self.get(NetworkKind::Gx)
    }

    pub fn gz(&self) -> &dyn Network {
        self.get(NetworkKind::Gz)
    }

    pub fn dx(&self) -> &dyn Network {
        self.get(NetworkKind::Dx)
    }

    pub fn dz(&self) -> &dyn Network {
        self.get(NetworkKind::Dz)
    }

    pub fn dxz(&self) -> &dyn Network {
        self.get(NetworkKind::Dxz)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Network> {
        self.networks.iter().map(AsRef::as_ref)
    }

    /// 某一组所有网络的参数
    pub fn parameters_of(&self, role: Role) -> Vec<Var> {
        self.iter()
            .filter(|n| n.role() == role)
            .flat_map(|n| n.parameters())
            .collect()
    }

    pub fn parameters(&self) -> Vec<Var> {
        self.iter().flat_map(|n| n.parameters()).collect()
    }

    pub fn set_training(&self, training: bool) {
        self.iter().for_each(|n| n.set_training(training));
    }
}
