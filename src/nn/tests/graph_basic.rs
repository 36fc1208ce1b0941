use approx::assert_abs_diff_eq;

use crate::nn::{Graph, GraphError, Init, VarActivationOps};
use crate::tensor::Tensor;

#[test]
fn test_nodes_are_computed_on_creation() {
    let graph = Graph::new();
    let x = graph.input(&Tensor::new(&[0.0, 1.0], &[1, 2])).unwrap();
    let y = x.exp().unwrap();
    assert_abs_diff_eq!(
        y.value().unwrap(),
        Tensor::new(&[1.0, std::f32::consts::E], &[1, 2]),
        epsilon = 1e-6
    );
}

#[test]
fn test_parameter_names_must_be_unique() {
    let graph = Graph::new_with_seed(1);
    graph.parameter(&[2, 2], Init::Zeros, "w").unwrap();
    let err = graph.parameter(&[2, 2], Init::Zeros, "w").unwrap_err();
    assert!(matches!(err, GraphError::InvalidOperation(_)));
}

#[test]
fn test_seeded_graphs_initialise_identically() {
    let init = Init::Normal { mean: 0.0, std: 0.01 };
    let a = Graph::new_with_seed(7).parameter(&[3, 4], init.clone(), "w").unwrap();
    let b = Graph::new_with_seed(7).parameter(&[3, 4], init, "w").unwrap();
    assert_eq!(a.value().unwrap(), b.value().unwrap());
}

#[test]
fn test_only_leaf_values_can_be_set() {
    let graph = Graph::new();
    let x = graph.input(&Tensor::zeros(&[1, 2])).unwrap();
    let y = x.tanh().unwrap();
    assert!(matches!(
        y.set_value(&Tensor::zeros(&[1, 2])),
        Err(GraphError::InvalidOperation(_))
    ));
    // 形状必须不变
    assert!(matches!(
        x.set_value(&Tensor::zeros(&[2, 2])),
        Err(GraphError::ShapeMismatch { .. })
    ));
    x.set_value(&Tensor::ones(&[1, 2])).unwrap();
    assert_eq!(x.value().unwrap(), Tensor::ones(&[1, 2]));
}

#[test]
fn test_prune_keeps_only_parameters() {
    let graph = Graph::new_with_seed(0);
    let w = graph.parameter(&[1, 2], Init::Constant(0.5), "w").unwrap();
    let x = graph.input(&Tensor::ones(&[1, 2])).unwrap();
    let y = (&x * &w).exp().unwrap();
    assert_eq!(graph.node_count(), 4);

    let removed = graph.prune_transient_nodes();
    assert_eq!(removed, 3);
    assert_eq!(graph.node_count(), 1);
    assert_eq!(w.value().unwrap(), Tensor::new(&[0.5, 0.5], &[1, 2]));
    assert!(matches!(y.value(), Err(GraphError::NodeNotFound(_))));
}

#[test]
fn test_backward_requires_scalar_loss() {
    let graph = Graph::new();
    let w = graph.parameter(&[1, 2], Init::Zeros, "w").unwrap();
    let y = w.exp().unwrap();
    assert!(matches!(y.backward(), Err(GraphError::InvalidOperation(_))));
}

#[test]
fn test_ops_across_graphs_are_rejected() {
    let a = Graph::new().input(&Tensor::ones(&[1, 1])).unwrap();
    let b = Graph::new().input(&Tensor::ones(&[1, 1])).unwrap();
    assert!(matches!(a.try_add(&b), Err(GraphError::InvalidOperation(_))));
}

#[test]
fn test_clamp_parameter_in_place() {
    let graph = Graph::new();
    let w = graph.parameter(&[1, 3], Init::Zeros, "w").unwrap();
    w.set_value(&Tensor::new(&[-0.5, 0.005, 0.5], &[1, 3])).unwrap();
    w.clamp_parameter(-0.01, 0.01).unwrap();
    assert_eq!(w.value().unwrap(), Tensor::new(&[-0.01, 0.005, 0.01], &[1, 3]));

    // 非参数节点不能被截断
    let x = graph.input(&Tensor::zeros(&[1, 3])).unwrap();
    assert!(matches!(
        x.clamp_parameter(-0.01, 0.01),
        Err(GraphError::InvalidOperation(_))
    ));
}
