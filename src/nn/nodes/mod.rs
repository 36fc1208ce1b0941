/*
 * @Author       : 老董
 * @Description  : 计算图节点：节点句柄 + 各类原始节点（参数、输入、算子）
 */

mod node_handle;
pub(in crate::nn) mod raw_node;

pub use node_handle::NodeId;
pub(in crate::nn) use node_handle::NodeHandle;
pub(in crate::nn) use raw_node::NodeType;
