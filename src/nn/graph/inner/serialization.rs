/*
 * @Author       : 老董
 * @Description  : GraphInner 参数状态字典（名称 -> 张量）的导出与载入
 *
 * 只处理内存中的映射；落盘格式由调用方（checkpoint）决定。
 */

use super::super::error::GraphError;
use super::GraphInner;
use crate::nn::NodeId;
use crate::tensor::Tensor;
use std::collections::BTreeMap;

impl GraphInner {
    /// 导出指定参数的当前值，键为参数节点名
    pub fn params_state(&self, ids: &[NodeId]) -> Result<BTreeMap<String, Tensor>, GraphError> {
        ids.iter()
            .map(|&id| {
                let node = self.get_node(id)?;
                if !node.is_parameter() {
                    return Err(GraphError::InvalidOperation(format!(
                        "{node}不是参数节点，不能导出到状态字典"
                    )));
                }
                Ok((node.name().to_string(), node.value().clone()))
            })
            .collect()
    }

    /// 用状态字典覆盖指定参数的值
    ///
    /// 每个参数都必须在字典中出现且形状一致，否则不做任何修改并返回错误；
    /// 字典中多余的条目被忽略。
    pub fn load_params_state(
        &mut self,
        ids: &[NodeId],
        state: &BTreeMap<String, Tensor>,
    ) -> Result<(), GraphError> {
        let mut updates = Vec::with_capacity(ids.len());
        for &id in ids {
            let node = self.get_node(id)?;
            let value = state
                .get(node.name())
                .ok_or_else(|| GraphError::MissingParameter(node.name().to_string()))?;
            if value.shape() != node.value().shape() {
                return Err(GraphError::ShapeMismatch {
                    expected: node.value().shape().to_vec(),
                    got: value.shape().to_vec(),
                    message: format!("状态字典中参数`{}`的形状不符", node.name()),
                });
            }
            updates.push((id, value));
        }
        for (id, value) in updates {
            self.set_node_value(id, value)?;
        }
        Ok(())
    }
}
