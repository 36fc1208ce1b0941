/*
 * @Author       : 老董
 * @Date         : 2026-01-09
 * @Description  : Var 扩展 trait 模块
 *
 * 按功能领域组织 Var 的扩展方法，用户按需 import。
 *
 * # 模块结构
 * - `activation`: 逐元素函数（exp, tanh, leaky_relu, softplus）
 * - `matrix`: 矩阵运算（matmul）
 * - `reduce`: 归约（mean）
 * - `shape`: 形状变换（reshape, narrow, concat）
 */

mod activation;
mod matrix;
mod reduce;
mod shape;

pub use activation::VarActivationOps;
pub use matrix::VarMatrixOps;
pub use reduce::VarReduceOps;
pub use shape::VarShapeOps;
