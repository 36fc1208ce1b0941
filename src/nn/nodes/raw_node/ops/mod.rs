/*
 * @Author       : 老董
 * @Description  : 算子节点。每个节点只实现前向计算与 VJP（向量-雅可比积）两件事
 */

mod add;
mod add_scalar;
mod concat;
mod dropout;
mod exp;
mod leaky_relu;
mod mat_mul;
mod mean;
mod multiply;
mod narrow;
mod negate;
mod reshape;
mod softplus;
mod tanh;

pub(in crate::nn) use add::Add;
pub(in crate::nn) use add_scalar::AddScalar;
pub(in crate::nn) use concat::Concat;
pub(in crate::nn) use dropout::Dropout;
pub(in crate::nn) use exp::Exp;
pub(in crate::nn) use leaky_relu::LeakyReLU;
pub(in crate::nn) use mat_mul::MatMul;
pub(in crate::nn) use mean::Mean;
pub(in crate::nn) use multiply::Multiply;
pub(in crate::nn) use narrow::Narrow;
pub(in crate::nn) use negate::Negate;
pub(in crate::nn) use reshape::Reshape;
pub(in crate::nn) use softplus::SoftPlus;
pub(in crate::nn) use tanh::Tanh;
