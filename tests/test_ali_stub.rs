/*
 * @Author       : 老董
 * @Description  : 端到端：一个 epoch、批大小 4、nz = 8，五个网络都是权重已知的线性/恒等映射。
 *                 权重全为 0 时两组分数都等于 eps，判别器梯度可以手算：
 *                 dL_D/d(data_score) = -0.5 / B，dL_D/d(sample_score) = 0.5 / B；
 *                 于是 Dxz 的权重梯度为 0.125 * Σ_b (h_sample_b - h_data_b)，
 *                 Adam 第一步的更新量为 lr * g / (|g| + ε)。
 *                 生成器反向传播沿用判别器更新前的 Dxz 权重（全 0），因此生成器参数保持为 0。
 */
use std::cell::Cell;
use std::f32::consts::LN_2;

use approx::assert_abs_diff_eq;

use ali_torch::ali::{
    ADAM_EPS, ModelBundle, Network, NetworkKind, RECONSTRUCTION_FILE, SessionConfig,
    TrainingSession,
};
use ali_torch::data::{DataLoader, TensorDataset};
use ali_torch::nn::{Graph, GraphError, Init, Linear, Module, Var, VarShapeOps};
use ali_torch::tensor::Tensor;

const BATCH: usize = 4;
const NZ: usize = 8;
/// 1 通道 2x2 图像
const IMAGE_DIM: usize = 4;

/// 线性映射（权重全 0）或恒等映射，输出还原为`out_shape`
struct StubNetwork {
    kind: NetworkKind,
    linear: Option<Linear>,
    out_shape: Vec<usize>,
    training: Cell<bool>,
}

impl StubNetwork {
    fn linear(
        graph: &Graph,
        kind: NetworkKind,
        inputs: usize,
        outputs: usize,
        out_shape: &[usize],
    ) -> Result<Self, GraphError> {
        let linear = Linear::new(graph, inputs, outputs, true, Init::Zeros, kind.name())?;
        Ok(Self {
            kind,
            linear: Some(linear),
            out_shape: out_shape.to_vec(),
            training: Cell::new(true),
        })
    }

    fn identity(kind: NetworkKind, features: usize) -> Self {
        Self {
            kind,
            linear: None,
            out_shape: vec![features],
            training: Cell::new(true),
        }
    }
}

impl Module for StubNetwork {
    fn parameters(&self) -> Vec<Var> {
        self.linear.iter().flat_map(Module::parameters).collect()
    }
}

impl Network for StubNetwork {
    fn kind(&self) -> NetworkKind {
        self.kind
    }

    fn forward(&self, x: &Var) -> Result<Var, GraphError> {
        let batch = x.value()?.shape()[0];
        let h = x.flatten()?;
        let h = match &self.linear {
            Some(linear) => linear.forward(&h)?,
            None => h,
        };
        let mut shape = vec![batch];
        shape.extend(&self.out_shape);
        h.reshape(&shape)
    }

    fn set_training(&self, training: bool) {
        self.training.set(training);
    }

    fn is_training(&self) -> bool {
        self.training.get()
    }
}

fn stub_bundle(graph: &Graph) -> Result<ModelBundle, Box<dyn std::error::Error>> {
    let networks: Vec<Box<dyn Network>> = vec![
        Box::new(StubNetwork::linear(graph, NetworkKind::Gx, NZ, IMAGE_DIM, &[1, 2, 2])?),
        Box::new(StubNetwork::linear(graph, NetworkKind::Gz, IMAGE_DIM, 2 * NZ, &[2 * NZ, 1, 1])?),
        Box::new(StubNetwork::identity(NetworkKind::Dx, IMAGE_DIM)),
        Box::new(StubNetwork::identity(NetworkKind::Dz, NZ)),
        Box::new(StubNetwork::linear(graph, NetworkKind::Dxz, IMAGE_DIM + NZ, 1, &[1])?),
    ];
    Ok(ModelBundle::from_networks(networks)?)
}

/// Adam 第一步（m、v 均为 0）对梯度`g`给出的参数增量
fn first_adam_delta(g: f32, lr: f32, beta1: f32, beta2: f32) -> f32 {
    let m = g * (1.0 - beta1);
    let v = g * g * (1.0 - beta2);
    let m_hat = m / (1.0 - beta1);
    let v_hat = v / (1.0 - beta2);
    -(m_hat / (v_hat.sqrt() + ADAM_EPS) * lr)
}

#[test]
fn test_one_epoch_on_stub_bundle_matches_hand_computed_adam_step() {
    let dir = tempfile::tempdir().unwrap();
    let images = Tensor::new(
        &[
            0.5, -0.25, 0.75, -1.0, //
            0.1, 0.2, -0.3, 0.4, //
            -0.6, 0.9, 0.0, 0.35, //
            1.0, -0.8, 0.45, -0.15,
        ],
        &[BATCH, 1, 2, 2],
    );
    let dataset = TensorDataset::new(images.clone(), Tensor::zeros(&[BATCH, 1])).unwrap();
    let loader = DataLoader::new(dataset, BATCH).unwrap();

    let graph = Graph::new_with_seed(0);
    let models = stub_bundle(&graph).unwrap();
    let config = SessionConfig {
        epochs: 1,
        ..SessionConfig::new(NZ, dir.path())
    };
    let (lr, beta1, beta2) = (config.lr, config.beta1, config.beta2);
    let mut session = TrainingSession::new(graph, models, config).unwrap();

    let summaries = session.run(&loader).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].batches, 1);
    // 两组分数都等于 eps ≈ 0
    assert_abs_diff_eq!(summaries[0].mean_d_loss, 2.0 * LN_2, epsilon = 1e-6);
    assert_abs_diff_eq!(summaries[0].mean_g_loss, 2.0 * LN_2, epsilon = 1e-6);

    // 手算 Dxz 权重梯度：输入为 [Dx(·), Dz(·)]
    let x = images.to_vec();
    let z = session.z().to_vec();
    let noise = session.noise().to_vec();
    assert_eq!(z.len(), BATCH * NZ);
    assert_eq!(noise.len(), BATCH);
    let scale = 0.5 / BATCH as f64;
    let mut grad = vec![0.0f64; IMAGE_DIM + NZ];
    for b in 0..BATCH {
        for i in 0..IMAGE_DIM {
            // 数据路径为 x，样本路径为 Gx(z) = 0
            grad[i] -= scale * f64::from(x[b * IMAGE_DIM + i]);
        }
        for j in 0..NZ {
            // 数据路径为 z_hat = 0 + 1 * noise，样本路径为 z
            grad[IMAGE_DIM + j] +=
                scale * (f64::from(z[b * NZ + j]) - f64::from(noise[b]));
        }
    }

    let dxz = session.models().dxz().state_dict().unwrap();
    let weights = dxz["netDxz_W"].to_vec();
    assert_eq!(weights.len(), IMAGE_DIM + NZ);
    for (w, g) in weights.iter().zip(&grad) {
        let expected = first_adam_delta(*g as f32, lr, beta1, beta2);
        assert_abs_diff_eq!(*w, expected, epsilon = 1e-9);
        assert!(w.abs() <= lr * 1.000_1);
    }
    // 偏置的梯度两路正好抵消
    assert_eq!(dxz["netDxz_b"].to_vec(), vec![0.0]);

    // 生成器的梯度经过旧的 Dxz 权重（全 0），参数不变
    for kind in [NetworkKind::Gx, NetworkKind::Gz] {
        for (name, value) in session.models().get(kind).state_dict().unwrap() {
            assert!(value.iter().all(|&v| v == 0.0), "{name} 应保持为 0");
        }
    }

    // 一个 epoch 的产物
    assert!(dir.path().join(RECONSTRUCTION_FILE).exists());
    assert!(dir.path().join("netDxz_epoch_0.bin").exists());
    assert!(dir.path().join("netDx_epoch_0.bin").exists());
    let (optimizer_d, optimizer_g) = session.optimizers();
    assert_eq!(optimizer_d.step_count(), 1);
    assert_eq!(optimizer_g.step_count(), 1);
}
