/*
 * @Author       : 老董
 * @Description  : 神经网络层
 */

mod linear;

pub use linear::Linear;
