use approx::assert_abs_diff_eq;

use crate::ali::gate::hand_over;
use crate::ali::tests::{set_all, snapshot, tiny_batch, tiny_bundle, tiny_session};
use crate::ali::{
    AliError, CheckpointKey, NetworkKind, REAL_SAMPLES_FILE, RECONSTRUCTION_FILE, Role,
    SessionConfig, TrainingSession,
};
use crate::config::ConfigError;
use crate::data::{DataLoader, TensorDataset};
use crate::nn::{Adam, Optimizer};
use crate::tensor::Tensor;

fn loader(n: usize, batch_size: usize) -> DataLoader {
    let dataset = TensorDataset::new(tiny_batch(n), Tensor::zeros(&[n, 1])).unwrap();
    DataLoader::new(dataset, batch_size).unwrap()
}

#[test]
fn test_clamp_invariant_over_all_networks() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(0, dir.path());
    // 初始权重 std = 0.5，远超截断区间
    assert!(
        snapshot(session.models())
            .iter()
            .any(|t| t.iter().any(|v| v.abs() > 0.01))
    );

    session.clamp_parameters().unwrap();
    for value in snapshot(session.models()) {
        assert!(value.iter().all(|&v| (-0.01..=0.01).contains(&v)));
    }
}

#[test]
fn test_train_step_moves_params_at_most_one_lr_outside_clamp() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = tiny_session(1, dir.path());
    let lr = session.config().lr;
    let losses = session.train_step(&tiny_batch(4)).unwrap();
    assert!(losses.d_loss.is_finite() && losses.g_loss.is_finite());

    let bound = 0.01 + lr * 1.001;
    for value in snapshot(session.models()) {
        assert!(value.iter().all(|v| v.abs() <= bound));
    }
    let (optimizer_d, optimizer_g) = session.optimizers();
    assert_eq!(optimizer_d.step_count(), 1);
    assert_eq!(optimizer_g.step_count(), 1);
}

#[test]
fn test_train_step_samples_working_tensors_per_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = tiny_session(2, dir.path());
    session.train_step(&tiny_batch(4)).unwrap();
    assert_eq!(session.x(), &tiny_batch(4));
    assert_eq!(session.z().shape(), &[4, 2, 1, 1]);
    assert_eq!(session.noise().shape(), &[4, 1, 1, 1]);
    let first_z = session.z().clone();

    // 最后一个不完整批次：工作张量按实际批大小重新采样
    session.train_step(&tiny_batch(3)).unwrap();
    assert_eq!(session.z().shape(), &[3, 2, 1, 1]);
    assert_eq!(session.noise().shape(), &[3, 1, 1, 1]);
    assert_ne!(&first_z.narrow(0, 0, 3).unwrap(), session.z());
}

#[test]
fn test_train_step_is_deterministic_for_same_seed() {
    let dir = tempfile::tempdir().unwrap();
    let mut a = tiny_session(9, dir.path());
    let mut b = tiny_session(9, dir.path());
    for _ in 0..2 {
        let la = a.train_step(&tiny_batch(4)).unwrap();
        let lb = b.train_step(&tiny_batch(4)).unwrap();
        assert_eq!(la.d_loss.to_bits(), lb.d_loss.to_bits());
        assert_eq!(la.g_loss.to_bits(), lb.g_loss.to_bits());
    }
    assert_eq!(snapshot(a.models()), snapshot(b.models()));
}

#[test]
fn test_train_step_prunes_transient_nodes() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = tiny_session(3, dir.path());
    let params = session.models().parameters().len();
    session.train_step(&tiny_batch(4)).unwrap();
    let after_one = session.graph().node_count();
    session.train_step(&tiny_batch(4)).unwrap();
    assert_eq!(session.graph().node_count(), after_one);
    assert_eq!(session.graph().prune_transient_nodes(), after_one - params);
}

#[test]
fn test_discriminator_update_leaves_generator_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(4, dir.path());
    let models = session.models();
    let z = Tensor::normal_seeded(0.0, 1.0, &[4, 2, 1, 1], 1);
    let noise = Tensor::normal_seeded(0.0, 1.0, &[4, 1, 1, 1], 2);
    let loss = session
        .compute_loss(&tiny_batch(4), &z, &noise, Role::Discriminator)
        .unwrap();

    hand_over(models, Role::Discriminator).unwrap();
    session.graph().zero_grad();
    loss.backward().unwrap();
    for p in models.parameters_of(Role::Generator) {
        assert_eq!(p.grad().unwrap(), None);
    }
    for p in models.parameters_of(Role::Discriminator) {
        assert!(p.grad().unwrap().is_some());
    }

    let generator_before = models
        .parameters_of(Role::Generator)
        .iter()
        .map(|p| p.value().unwrap())
        .collect::<Vec<_>>();
    let discriminator_before = snapshot(models);
    let mut optimizer = Adam::new(session.graph(), &models.parameters(), 1e-2);
    optimizer.step().unwrap();

    let generator_after = models
        .parameters_of(Role::Generator)
        .iter()
        .map(|p| p.value().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(generator_before, generator_after);
    assert_ne!(discriminator_before, snapshot(models));
}

#[test]
fn test_generator_update_leaves_discriminator_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(5, dir.path());
    let models = session.models();
    let z = Tensor::normal_seeded(0.0, 1.0, &[4, 2, 1, 1], 3);
    let noise = Tensor::normal_seeded(0.0, 1.0, &[4, 1, 1, 1], 4);
    let loss = session
        .compute_loss(&tiny_batch(4), &z, &noise, Role::Generator)
        .unwrap();

    hand_over(models, Role::Generator).unwrap();
    session.graph().zero_grad();
    loss.backward().unwrap();
    for p in models.parameters_of(Role::Discriminator) {
        assert_eq!(p.grad().unwrap(), None);
    }

    let discriminator_before = models
        .parameters_of(Role::Discriminator)
        .iter()
        .map(|p| p.value().unwrap())
        .collect::<Vec<_>>();
    let mut optimizer = Adam::new(session.graph(), &models.parameters(), 1e-2);
    optimizer.step().unwrap();
    let discriminator_after = models
        .parameters_of(Role::Discriminator)
        .iter()
        .map(|p| p.value().unwrap())
        .collect::<Vec<_>>();
    assert_eq!(discriminator_before, discriminator_after);
}

#[test]
fn test_reconstruct_does_not_mutate_and_is_repeatable() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(6, dir.path());
    let before = snapshot(session.models());
    let images = tiny_batch(3);

    let first = session.reconstruct(&images).unwrap();
    let second = session.reconstruct(&images).unwrap();
    assert_eq!(first.shape(), &[3, 1, 2, 2]);
    assert_eq!(first, second);
    assert_eq!(before, snapshot(session.models()));
    assert!(!session.models().gx().is_training());
    assert!(!session.models().gz().is_training());
    // 不记录梯度，也不残留临时节点
    assert_eq!(
        session.graph().node_count(),
        session.models().parameters().len()
    );
    for p in session.models().parameters() {
        assert_eq!(p.grad().unwrap(), None);
    }
}

#[test]
fn test_reconstruct_with_unit_posterior_decodes_ones() {
    let dir = tempfile::tempdir().unwrap();
    let session = tiny_session(7, dir.path());
    // Gz 输出全 0 ⇒ mu = 0, sigma = 1
    set_all(session.models().gz(), 0.0);
    let recon = session.reconstruct(&tiny_batch(2)).unwrap();

    let graph = session.graph();
    let expected = graph.no_grad_scope(|g| {
        let ones = g.input(&Tensor::ones(&[2, 2, 1, 1])).unwrap();
        session.models().gx().forward(&ones).unwrap().value().unwrap()
    });
    assert_abs_diff_eq!(recon, expected, epsilon = 1e-7);
}

#[test]
fn test_test_phase_writes_images() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = dir.path().join("samples");
    let session = tiny_session(8, &experiment);
    let before = snapshot(session.models());

    let recon = session.test(&loader(5, 4), 0).unwrap().unwrap();
    assert_eq!(recon.shape(), &[4, 1, 2, 2]);
    assert!(experiment.join(RECONSTRUCTION_FILE).exists());
    assert!(experiment.join(REAL_SAMPLES_FILE).exists());
    assert_eq!(before, snapshot(session.models()));
}

#[test]
fn test_train_epoch_visits_every_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = tiny_session(10, dir.path());
    session.models().set_training(false);

    let summary = session.train_epoch(&loader(5, 2), 0).unwrap();
    assert_eq!(summary.epoch, 0);
    assert_eq!(summary.batches, 3);
    assert!(summary.mean_d_loss.is_finite());
    assert!(session.models().iter().all(|n| n.is_training()));
    assert_eq!(session.optimizers().0.step_count(), 3);
    // 最后一个批次只有 1 个样本
    assert_eq!(session.x().shape(), &[1, 1, 2, 2]);
}

#[test]
fn test_run_writes_images_and_checkpoints_per_epoch() {
    let dir = tempfile::tempdir().unwrap();
    let experiment = dir.path().join("exp");
    let mut session = tiny_session(12, &experiment);

    let summaries = session.run(&loader(4, 4)).unwrap();
    assert_eq!(summaries.len(), 1);
    for name in ["netGx", "netGz", "netDx", "netDz", "netDxz"] {
        assert!(experiment.join(format!("{name}_epoch_0.bin")).exists());
    }
    assert!(experiment.join(RECONSTRUCTION_FILE).exists());

    let saved = session.save_checkpoints(0).unwrap();
    for (path, kind) in saved.iter().zip(NetworkKind::ALL) {
        let key = CheckpointKey {
            network: kind,
            epoch: 0,
        };
        assert_eq!(path, &session.checkpoint_policy().path(key));
    }
}

#[test]
fn test_new_rejects_invalid_clamp_range() {
    let dir = tempfile::tempdir().unwrap();
    for (lower, upper) in [(0.01, -0.01), (f32::NAN, 0.01), (-0.01, f32::NAN)] {
        let (graph, models) = tiny_bundle(14);
        let config = SessionConfig {
            clamp_lower: lower,
            clamp_upper: upper,
            ..SessionConfig::new(2, dir.path())
        };
        let result = TrainingSession::new(graph, models, config);
        assert!(
            matches!(
                result,
                Err(AliError::Config(ConfigError::InvalidClampRange { .. }))
            ),
            "[{lower}, {upper}] 应被拒绝"
        );
    }
}

#[test]
fn test_new_rejects_invalid_hyper_parameters() {
    let dir = tempfile::tempdir().unwrap();
    let base = SessionConfig::new(2, dir.path());
    for config in [
        SessionConfig { nz: 0, ..base.clone() },
        SessionConfig { lr: 0.0, ..base.clone() },
        SessionConfig { beta2: 1.0, ..base.clone() },
    ] {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
        let (graph, models) = tiny_bundle(15);
        assert!(TrainingSession::new(graph, models, config).is_err());
    }
    // 上下界相等是合法的
    let degenerate = SessionConfig {
        clamp_lower: 0.0,
        clamp_upper: 0.0,
        ..base
    };
    assert!(degenerate.validate().is_ok());
}

#[test]
fn test_run_rejects_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = tiny_session(13, dir.path());
    let empty = TensorDataset::new(Tensor::zeros(&[0, 1, 2, 2]), Tensor::zeros(&[0, 1])).unwrap();
    let loader = DataLoader::new(empty, 2).unwrap();
    assert!(matches!(
        session.run(&loader),
        Err(crate::ali::AliError::EmptyDataset)
    ));
}
