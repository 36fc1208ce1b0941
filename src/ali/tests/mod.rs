mod checkpoint;
mod gate;
mod loss;
mod models;
mod session;

use crate::ali::{ArchConfig, ModelBundle, SessionConfig, TrainingSession};
use crate::nn::{Graph, Module};
use crate::tensor::Tensor;

/// 小尺寸结构：1 通道 2x2 图像，nz = 2
pub(super) fn tiny_arch() -> ArchConfig {
    ArchConfig {
        hidden: 4,
        features: 3,
        std: 0.5,
        dropout: 0.0,
        ..ArchConfig::new(1, 2, 2)
    }
}

pub(super) fn tiny_bundle(seed: u64) -> (Graph, ModelBundle) {
    let graph = Graph::new_with_seed(seed);
    let models = ModelBundle::create(&graph, &tiny_arch()).unwrap();
    (graph, models)
}

pub(super) fn tiny_session(seed: u64, experiment: &std::path::Path) -> TrainingSession {
    let (graph, models) = tiny_bundle(seed);
    let config = SessionConfig {
        epochs: 1,
        seed,
        ..SessionConfig::new(2, experiment)
    };
    TrainingSession::new(graph, models, config).unwrap()
}

/// 取值在[-1, 1]内的确定性批次 [n, 1, 2, 2]
pub(super) fn tiny_batch(n: usize) -> Tensor {
    let data = (0..n * 4)
        .map(|i| ((i * 7 % 11) as f32 / 5.0) - 1.0)
        .collect::<Vec<_>>();
    Tensor::new(&data, &[n, 1, 2, 2])
}

/// 所有参数的当前值（按网络、参数顺序）
pub(super) fn snapshot(models: &ModelBundle) -> Vec<Tensor> {
    models
        .parameters()
        .iter()
        .map(|p| p.value().unwrap())
        .collect()
}

pub(super) fn set_all<M: Module + ?Sized>(module: &M, value: f32) {
    for p in module.parameters() {
        let shape = p.value().unwrap().shape().to_vec();
        p.set_value(&Tensor::full(value, &shape)).unwrap();
    }
}
