use std::f32::consts::LN_2;

use approx::assert_abs_diff_eq;

use crate::ali::loss::{SCORE_EPS, compute_loss, posterior};
use crate::ali::tests::{set_all, tiny_arch, tiny_bundle, tiny_batch};
use crate::ali::Role;
use crate::tensor::Tensor;

#[test]
fn test_softplus_values() {
    let x = Tensor::new(&[0.0, 1.0, -1.0, 100.0, -100.0], &[5]);
    let y = x.softplus().to_vec();
    assert_abs_diff_eq!(y[0], LN_2, epsilon = 1e-6);
    assert_abs_diff_eq!(y[1], 1.313_261_7, epsilon = 1e-5);
    assert_abs_diff_eq!(y[2], 0.313_261_7, epsilon = 1e-5);
    // 大正数不溢出，大负数趋于 0
    assert_abs_diff_eq!(y[3], 100.0, epsilon = 1e-4);
    assert!(y[4] >= 0.0 && y[4] < 1e-30);
    assert!(y.iter().all(|v| v.is_finite()));
}

#[test]
fn test_losses_at_zero_scores_are_two_ln_two() {
    let (graph, models) = tiny_bundle(0);
    for network in models.iter() {
        set_all(network, 0.0);
    }
    let arch = tiny_arch();
    let x = graph.input(&tiny_batch(4)).unwrap();
    let z = graph.input(&Tensor::ones(&[4, arch.nz, 1, 1])).unwrap();
    let noise = graph.input(&Tensor::ones(&[4, 1, 1, 1])).unwrap();

    for role in [Role::Discriminator, Role::Generator] {
        let loss = compute_loss(&models, &x, &z, &noise, arch.nz, role).unwrap();
        assert_eq!(loss.value().unwrap().shape(), &[1, 1]);
        assert_abs_diff_eq!(loss.item().unwrap(), 2.0 * LN_2, epsilon = 1e-6);
    }
    assert!(SCORE_EPS > 0.0);
}

#[test]
fn test_compute_loss_is_deterministic() {
    let (graph, models) = tiny_bundle(11);
    let arch = tiny_arch();
    let batch = tiny_batch(3);
    let z_data = Tensor::normal_seeded(0.0, 1.0, &[3, arch.nz, 1, 1], 1);
    let noise_data = Tensor::normal_seeded(0.0, 1.0, &[3, 1, 1, 1], 2);

    let eval = |role| {
        let x = graph.input(&batch).unwrap();
        let z = graph.input(&z_data).unwrap();
        let noise = graph.input(&noise_data).unwrap();
        compute_loss(&models, &x, &z, &noise, arch.nz, role)
            .unwrap()
            .item()
            .unwrap()
    };
    let d1 = eval(Role::Discriminator);
    let d2 = eval(Role::Discriminator);
    let g1 = eval(Role::Generator);
    assert_eq!(d1.to_bits(), d2.to_bits());
    assert!(d1.is_finite() && g1.is_finite());
    assert_ne!(d1, g1);
}

#[test]
fn test_posterior_splits_mu_and_sigma() {
    let (graph, models) = tiny_bundle(2);
    set_all(models.gz(), 0.0);
    let x = graph.input(&tiny_batch(2)).unwrap();
    let post = posterior(&models, &x, tiny_arch().nz).unwrap();
    assert_eq!(post.mu.value().unwrap(), Tensor::zeros(&[2, 2, 1, 1]));
    assert_eq!(post.sigma.value().unwrap(), Tensor::ones(&[2, 2, 1, 1]));
}

#[test]
fn test_posterior_rejects_wrong_latent_size() {
    let (graph, models) = tiny_bundle(2);
    let x = graph.input(&tiny_batch(2)).unwrap();
    assert!(posterior(&models, &x, 5).is_err());
}
