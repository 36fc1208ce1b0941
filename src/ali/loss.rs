/*
 * @Author       : 老董
 * @Description  : ALI 的对抗损失
 *
 *  raw = Gz(x)，mu = raw[:, :nz]，sigma = exp(raw[:, nz:])
 *  z_hat = mu + sigma * noise
 *  x_hat = Gx(z)
 *  d = Dxz([Dx(x), Dz(z_hat)]) + eps，s = Dxz([Dx(x_hat), Dz(z)]) + eps
 *  判别器：mean(softplus(-d) + softplus(s))
 *  生成器：mean(softplus(d) + softplus(-s))
 */

use crate::ali::{ModelBundle, Role};
use crate::nn::{GraphError, Var, VarActivationOps, VarReduceOps, VarShapeOps};

/// 加到判别分数上的小常数
pub const SCORE_EPS: f32 = 1e-15;

/// 编码器输出的后验参数
pub struct Posterior {
    pub mu: Var,
    pub sigma: Var,
}

/// 把 Gz 的输出 [B, 2nz, 1, 1] 拆成 mu 与 sigma = exp(log sigma)
pub fn posterior(models: &ModelBundle, x: &Var, nz: usize) -> Result<Posterior, GraphError> {
    let raw = models.gz().forward(x)?;
    let channels = raw.value()?.shape().get(1).copied().unwrap_or(0);
    if channels != 2 * nz {
        return Err(GraphError::ShapeMismatch {
            expected: vec![2 * nz],
            got: vec![channels],
            message: "Gz 的输出通道数应为 2 * nz".to_string(),
        });
    }
    Ok(Posterior {
        mu: raw.narrow(1, 0, nz)?,
        sigma: raw.narrow(1, nz, nz)?.exp()?,
    })
}

/// 联合判别分数 Dxz([Dx(x), Dz(z)]) + eps
fn joint_score(models: &ModelBundle, x: &Var, z: &Var) -> Result<Var, GraphError> {
    let features = models.dx().forward(x)?.concat(&[&models.dz().forward(z)?], 1)?;
    models.dxz().forward(&features)?.add_scalar(SCORE_EPS)
}

/// 构建一组对抗损失（标量节点）
///
/// `x`为 [B, C, H, W]，`z`为 [B, nz, 1, 1]，`noise`为 [B, 1, 1, 1]（沿通道广播）。
/// `role`为`Discriminator`时返回判别器损失，否则返回生成器损失。
pub fn compute_loss(
    models: &ModelBundle,
    x: &Var,
    z: &Var,
    noise: &Var,
    nz: usize,
    role: Role,
) -> Result<Var, GraphError> {
    let Posterior { mu, sigma } = posterior(models, x, nz)?;
    let z_hat = mu.try_add(&sigma.try_mul(noise)?)?;
    let x_hat = models.gx().forward(z)?;

    let data_score = joint_score(models, x, &z_hat)?;
    let sample_score = joint_score(models, &x_hat, z)?;

    let per_sample = match role {
        Role::Discriminator => data_score
            .try_neg()?
            .softplus()?
            .try_add(&sample_score.softplus()?)?,
        Role::Generator => data_score
            .softplus()?
            .try_add(&sample_score.try_neg()?.softplus()?)?,
    };
    per_sample.mean()
}
