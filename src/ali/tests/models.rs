use crate::ali::tests::{tiny_arch, tiny_bundle, tiny_batch};
use crate::ali::{AliError, MlpNetwork, ModelBundle, Network, NetworkKind, Role};
use crate::nn::{Graph, Module, VarShapeOps};
use crate::tensor::Tensor;

#[test]
fn test_networks_in_fixed_order_with_roles() {
    let (_graph, models) = tiny_bundle(0);
    let kinds = models.iter().map(|n| n.kind()).collect::<Vec<_>>();
    assert_eq!(kinds, NetworkKind::ALL);
    assert_eq!(models.gx().role(), Role::Generator);
    assert_eq!(models.gz().role(), Role::Generator);
    assert_eq!(models.dx().role(), Role::Discriminator);
    assert_eq!(models.dz().role(), Role::Discriminator);
    assert_eq!(models.dxz().role(), Role::Discriminator);
    assert_eq!(Role::Generator.opponent(), Role::Discriminator);
}

#[test]
fn test_parameter_names_are_prefixed() {
    let (_graph, models) = tiny_bundle(0);
    for network in models.iter() {
        let state = network.state_dict().unwrap();
        assert!(!state.is_empty());
        for name in state.keys() {
            assert!(
                name.starts_with(&format!("{}.", network.kind().name())),
                "{name} 缺少网络前缀"
            );
        }
    }
    let gx = models.gx().state_dict().unwrap();
    assert!(gx.contains_key("netGx.fc1_W"));
    assert!(gx.contains_key("netGx.fc3_b"));
}

#[test]
fn test_forward_shapes() {
    let (graph, models) = tiny_bundle(1);
    let arch = tiny_arch();
    let x = graph.input(&tiny_batch(3)).unwrap();
    let z = graph.input(&Tensor::ones(&[3, arch.nz, 1, 1])).unwrap();

    let x_hat = models.gx().forward(&z).unwrap().value().unwrap();
    assert_eq!(x_hat.shape(), &[3, 1, 2, 2]);
    assert!(x_hat.iter().all(|v| v.abs() < 1.0));

    let raw = models.gz().forward(&x).unwrap().value().unwrap();
    assert_eq!(raw.shape(), &[3, 2 * arch.nz, 1, 1]);

    let fx = models.dx().forward(&x).unwrap();
    let fz = models.dz().forward(&z).unwrap();
    assert_eq!(fx.value().unwrap().shape(), &[3, arch.features]);
    assert_eq!(fz.value().unwrap().shape(), &[3, arch.features]);

    let joint = fx.concat(&[&fz], 1).unwrap();
    let score = models.dxz().forward(&joint).unwrap().value().unwrap();
    assert_eq!(score.shape(), &[3, 1]);
}

#[test]
fn test_dropout_only_in_discriminators_and_train_mode() {
    let graph = Graph::new_with_seed(3);
    let arch = crate::ali::ArchConfig {
        dropout: 0.5,
        ..tiny_arch()
    };
    let dx = MlpNetwork::new(&graph, NetworkKind::Dx, &arch).unwrap();
    let x = tiny_batch(8);

    let run = |net: &MlpNetwork| {
        let input = graph.input(&x).unwrap();
        net.forward(&input).unwrap().value().unwrap()
    };

    assert!(dx.is_training());
    dx.eval();
    let a = run(&dx);
    let b = run(&dx);
    assert_eq!(a, b);

    dx.train();
    let c = run(&dx);
    let d = run(&dx);
    assert_ne!(c, d);

    // 生成器不使用 dropout
    let gz = MlpNetwork::new(&graph, NetworkKind::Gz, &arch).unwrap();
    assert!(gz.is_training());
    assert_eq!(run(&gz), run(&gz));
}

#[test]
fn test_weights_follow_init_std() {
    let graph = Graph::new_with_seed(5);
    let arch = crate::ali::ArchConfig {
        std: 0.0,
        ..tiny_arch()
    };
    let gx = MlpNetwork::new(&graph, NetworkKind::Gx, &arch).unwrap();
    assert_eq!(gx.layers().len(), 3);
    for p in gx.parameters() {
        assert!(p.value().unwrap().iter().all(|&v| v == 0.0));
    }
}

#[test]
fn test_from_networks_rejects_wrong_order() {
    let graph = Graph::new_with_seed(0);
    let arch = tiny_arch();
    let order = [
        NetworkKind::Gz,
        NetworkKind::Gx,
        NetworkKind::Dx,
        NetworkKind::Dz,
        NetworkKind::Dxz,
    ];
    let networks = order
        .into_iter()
        .map(|kind| Box::new(MlpNetwork::new(&graph, kind, &arch).unwrap()) as Box<dyn Network>)
        .collect();
    assert!(matches!(
        ModelBundle::from_networks(networks),
        Err(AliError::InvalidBundle(_))
    ));
    assert!(matches!(
        ModelBundle::from_networks(Vec::new()),
        Err(AliError::InvalidBundle(_))
    ));
}

#[test]
fn test_parameters_of_role() {
    let (_graph, models) = tiny_bundle(0);
    let generator = models.parameters_of(Role::Generator).len();
    let discriminator = models.parameters_of(Role::Discriminator).len();
    // Gx、Gz 各 3 层；Dx、Dz、Dxz 各 2 层；每层 W 与 b
    assert_eq!(generator, 2 * 3 * 2);
    assert_eq!(discriminator, 3 * 2 * 2);
    assert_eq!(models.parameters().len(), generator + discriminator);
}
