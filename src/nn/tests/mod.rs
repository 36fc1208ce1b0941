mod gradient_check;
mod graph_basic;
mod layer_linear;
