/*
 * @Author       : 老董
 * @Description  : GraphInner VJP 反向传播
 *
 * 是否需要梯度在反向传播时才判定：
 * 1. 从损失出发沿父边找出所有可达节点（不穿过 detached 节点）；
 * 2. 一个节点“需要梯度”当且仅当它是 requires_grad 的参数，或它的某个父节点需要梯度；
 * 3. 只对同时满足两者的节点计算梯度，冻结参数及只通向冻结参数的子图被整体跳过。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::collections::{BTreeSet, HashMap};

impl GraphInner {
    /// 反向传播：把损失对各可训练参数的梯度累加到参数节点上，返回损失的标量值
    pub fn backward(&mut self, loss: NodeId) -> Result<f32, GraphError> {
        let loss_value = self.get_node_value(loss)?;
        let loss_scalar = loss_value.get_data_number().ok_or_else(|| {
            GraphError::InvalidOperation(format!(
                "反向传播要求损失为标量 [1, 1]，但得到 {:?}",
                loss_value.shape()
            ))
        })?;
        let loss_shape = loss_value.shape().to_vec();

        let needs_grad = self.nodes_on_grad_path(loss)?;
        if !needs_grad.contains(&loss) {
            return Ok(loss_scalar);
        }

        let mut pending: HashMap<NodeId, Tensor> = HashMap::new();
        pending.insert(loss, Tensor::ones(&loss_shape));

        // id 降序即反向拓扑序
        for &node_id in needs_grad.iter().rev() {
            let Some(upstream) = pending.remove(&node_id) else {
                continue;
            };
            let node = self.get_node(node_id)?;
            if node.is_parameter() {
                self.get_node_mut(node_id)?.accumulate_grad(upstream);
                continue;
            }
            let mut parent_grads = Vec::new();
            for (index, parent) in node.parents().iter().enumerate() {
                if needs_grad.contains(parent) {
                    parent_grads.push((*parent, node.calc_grad_to_parent(index, &upstream)?));
                }
            }
            for (parent, grad) in parent_grads {
                let merged = match pending.remove(&parent) {
                    Some(existing) => existing + grad,
                    None => grad,
                };
                pending.insert(parent, merged);
            }
        }

        Ok(loss_scalar)
    }

    /// 从`loss`可达、且通向至少一个 requires_grad 参数的节点集合
    fn nodes_on_grad_path(&self, loss: NodeId) -> Result<BTreeSet<NodeId>, GraphError> {
        let mut reachable = BTreeSet::new();
        let mut stack = vec![loss];
        while let Some(id) = stack.pop() {
            if !reachable.insert(id) {
                continue;
            }
            let node = self.get_node(id)?;
            if node.is_detached() {
                continue;
            }
            stack.extend(node.parents().iter().copied());
        }

        // id 升序遍历保证父节点先于子节点被判定
        let mut needs_grad = BTreeSet::new();
        for &id in &reachable {
            let node = self.get_node(id)?;
            let needed = if node.is_parameter() {
                node.requires_grad()
            } else {
                !node.is_detached() && node.parents().iter().any(|p| needs_grad.contains(p))
            };
            if needed {
                needs_grad.insert(id);
            }
        }
        Ok(needs_grad)
    }
}
