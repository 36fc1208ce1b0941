use approx::assert_abs_diff_eq;

use crate::nn::{Graph, Init, Linear, Module};
use crate::tensor::Tensor;

#[test]
fn test_linear_shapes_and_names() {
    let graph = Graph::new_with_seed(0);
    let fc = Linear::new(&graph, 4, 3, true, Init::Normal { mean: 0.0, std: 0.01 }, "net.fc1").unwrap();
    assert_eq!(fc.in_features(), 4);
    assert_eq!(fc.out_features(), 3);
    assert_eq!(fc.num_params(), 2);
    assert_eq!(fc.num_elements().unwrap(), 4 * 3 + 3);
    assert_eq!(fc.weights().name().unwrap(), "net.fc1_W");
    assert_eq!(fc.bias().unwrap().name().unwrap(), "net.fc1_b");
    assert_eq!(fc.bias().unwrap().value().unwrap(), Tensor::zeros(&[1, 3]));

    let x = graph.input(&Tensor::ones(&[5, 4])).unwrap();
    assert_eq!(fc.forward(&x).unwrap().value().unwrap().shape(), &[5, 3]);
}

#[test]
fn test_linear_forward_values() {
    let graph = Graph::new();
    let fc = Linear::new(&graph, 2, 2, true, Init::Constant(1.0), "fc").unwrap();
    fc.bias()
        .unwrap()
        .set_value(&Tensor::new(&[0.5, -0.5], &[1, 2]))
        .unwrap();
    let x = graph.input(&Tensor::new(&[1., 2., 3., 4.], &[2, 2])).unwrap();
    let y = fc.forward(&x).unwrap().value().unwrap();
    assert_abs_diff_eq!(y, Tensor::new(&[3.5, 2.5, 7.5, 6.5], &[2, 2]), epsilon = 1e-6);
}

#[test]
fn test_linear_without_bias() {
    let graph = Graph::new();
    let fc = Linear::new(&graph, 3, 1, false, Init::Constant(2.0), "fc").unwrap();
    assert!(fc.bias().is_none());
    assert_eq!(fc.parameters().len(), 1);
    let x = graph.input(&Tensor::ones(&[1, 3])).unwrap();
    assert_eq!(fc.forward(&x).unwrap().value().unwrap(), Tensor::new(&[6.0], &[1, 1]));
}
