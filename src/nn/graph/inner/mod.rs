/*
 * @Author       : 老董
 * @Description  : GraphInner 计算图的底层实现
 *
 * 各 impl 块分散在子模块中：
 * - core.rs: 基础操作（增删查节点）
 * - node_builders.rs: new_*_node（创建即计算）
 * - backward.rs: VJP 反向传播
 * - mode.rs: 梯度开关 / no_grad
 * - serialization.rs: 参数状态字典的导出与载入
 */

mod backward;
mod core;
mod mode;
mod node_builders;
mod serialization;

use crate::nn::NodeId;
use crate::nn::nodes::NodeHandle;
use rand::rngs::StdRng;
use std::collections::BTreeMap;

/// 图的完整定义（核心实现）
///
/// 节点按 id 有序保存；id 随创建递增，所以按 id 降序遍历即为一种合法的反向拓扑序。
pub struct GraphInner {
    pub(in crate::nn::graph) nodes: BTreeMap<NodeId, NodeHandle>,
    pub(in crate::nn::graph) next_id: u64,
    /// 为 false 时（no_grad 上下文）新建的算子节点都是 detached 的
    pub(in crate::nn::graph) grad_enabled: bool,
    /// 图级别的随机数生成器（用于参数初始化与 dropout 掩码）
    /// None 表示使用默认的 thread_rng（非确定性）
    pub(in crate::nn::graph) rng: Option<StdRng>,
}

impl Default for GraphInner {
    fn default() -> Self {
        Self::new()
    }
}
