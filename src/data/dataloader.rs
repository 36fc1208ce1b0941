/*
 * @Author       : 老董
 * @Date         : 2025-01-21
 * @Description  : DataLoader - PyTorch 风格的数据批量加载器
 *
 * 提供统一的数据迭代 API，支持：
 * - 自动分批 (batch_size)，默认保留最后一个不完整批次
 * - 每一轮遍历重新随机打乱 (shuffle)，可设种子
 * - 丢弃不完整批次 (drop_last)
 * - 后台线程预取 (num_workers > 0)，通过有界通道交付批次
 */

use std::cell::Cell;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, SyncSender, sync_channel};
use std::thread::JoinHandle;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::data::DataError;
use crate::tensor::Tensor;

/// 一个批次：(特征, 标签)
pub type Batch = (Tensor, Tensor);

/// TensorDataset - 持有特征和标签的数据集，第一维为样本数
#[derive(Debug, Clone)]
pub struct TensorDataset {
    features: Tensor,
    labels: Tensor,
    len: usize,
}

impl TensorDataset {
    /// `features`与`labels`的样本数必须一致
    pub fn new(features: Tensor, labels: Tensor) -> Result<Self, DataError> {
        let len = features.shape().first().copied().unwrap_or(0);
        let label_len = labels.shape().first().copied().unwrap_or(0);
        if len != label_len {
            return Err(DataError::ShapeMismatch {
                expected: vec![len],
                got: vec![label_len],
            });
        }
        Ok(Self {
            features,
            labels,
            len,
        })
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn features(&self) -> &Tensor {
        &self.features
    }

    pub const fn labels(&self) -> &Tensor {
        &self.labels
    }

    /// 按样本下标取出一个批次
    pub fn batch(&self, indices: &[usize]) -> Result<Batch, DataError> {
        Ok((
            self.features.select(0, indices)?,
            self.labels.select(0, indices)?,
        ))
    }
}

/// DataLoader - PyTorch 风格的数据批量加载器
///
/// ```ignore
/// let loader = DataLoader::new(dataset, 32)?
///     .shuffle(true)
///     .num_workers(2);
///
/// for (x_batch, y_batch) in loader.iter() {
///     // ...
/// }
/// ```
pub struct DataLoader {
    dataset: Arc<TensorDataset>,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    seed: Option<u64>,
    num_workers: usize,
    /// 已开始的遍历轮数；有种子时每轮的打乱顺序由 (seed, 轮数) 决定
    passes: Cell<u64>,
}

impl DataLoader {
    pub fn new(dataset: TensorDataset, batch_size: usize) -> Result<Self, DataError> {
        if batch_size == 0 {
            return Err(DataError::ZeroBatchSize);
        }
        Ok(Self {
            dataset: Arc::new(dataset),
            batch_size,
            shuffle: false,
            drop_last: false,
            seed: None,
            num_workers: 0,
            passes: Cell::new(0),
        })
    }

    /// 设置是否打乱数据
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// 设置是否丢弃最后一个不完整的批次
    pub fn drop_last(mut self, drop_last: bool) -> Self {
        self.drop_last = drop_last;
        self
    }

    /// 设置随机种子（用于 shuffle）
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 大于 0 时由后台线程预取批次，预取队列长度为 2 * num_workers
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// 获取批次数量
    pub fn num_batches(&self) -> usize {
        let n = self.dataset.len();
        if self.drop_last {
            n / self.batch_size
        } else {
            n.div_ceil(self.batch_size)
        }
    }

    /// 获取数据集大小
    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    pub fn dataset(&self) -> &TensorDataset {
        &self.dataset
    }

    /// 开始新一轮遍历
    pub fn iter(&self) -> DataLoaderIterator {
        let pass = self.passes.get();
        self.passes.set(pass + 1);
        let batches = self.plan_batches(pass);

        if self.num_workers == 0 {
            return DataLoaderIterator::Inline {
                dataset: Arc::clone(&self.dataset),
                batches: batches.into_iter(),
            };
        }

        let (sender, receiver) = sync_channel(2 * self.num_workers);
        let dataset = Arc::clone(&self.dataset);
        let handle = std::thread::spawn(move || prefetch(&dataset, batches, &sender));
        DataLoaderIterator::Prefetch {
            receiver: Some(receiver),
            handle: Some(handle),
        }
    }

    /// 本轮每个批次包含的样本下标
    fn plan_batches(&self, pass: u64) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.shuffle {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(pass)),
                None => StdRng::from_entropy(),
            };
            indices.shuffle(&mut rng);
        }
        indices
            .chunks(self.batch_size)
            .filter(|chunk| !self.drop_last || chunk.len() == self.batch_size)
            .map(<[usize]>::to_vec)
            .collect()
    }
}

/// 后台线程：依次组装批次送入通道；接收端被丢弃时提前结束
fn prefetch(
    dataset: &TensorDataset,
    batches: Vec<Vec<usize>>,
    sender: &SyncSender<Result<Batch, DataError>>,
) {
    for indices in batches {
        if sender.send(dataset.batch(&indices)).is_err() {
            debug!("预取线程：接收端已关闭，提前结束");
            return;
        }
    }
}

/// DataLoader 迭代器
pub enum DataLoaderIterator {
    /// 在当前线程中按需组装批次
    Inline {
        dataset: Arc<TensorDataset>,
        batches: std::vec::IntoIter<Vec<usize>>,
    },
    /// 从预取线程接收批次
    Prefetch {
        receiver: Option<Receiver<Result<Batch, DataError>>>,
        handle: Option<JoinHandle<()>>,
    },
}

impl Iterator for DataLoaderIterator {
    type Item = Result<Batch, DataError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Inline { dataset, batches } => {
                batches.next().map(|indices| dataset.batch(&indices))
            }
            Self::Prefetch { receiver, .. } => receiver.as_ref()?.recv().ok(),
        }
    }
}

impl Drop for DataLoaderIterator {
    fn drop(&mut self) {
        if let Self::Prefetch { receiver, handle } = self {
            // 先关闭接收端，阻塞在 send 上的预取线程才能退出
            receiver.take();
            if let Some(handle) = handle.take() {
                join_prefetch_thread(handle);
            }
        }
    }
}

/// 等待预取线程退出；线程 panic 时记录警告并返回 false
pub(crate) fn join_prefetch_thread(handle: JoinHandle<()>) -> bool {
    match handle.join() {
        Ok(()) => true,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "未知原因".to_string());
            warn!(reason = %reason, "数据预取线程异常退出");
            false
        }
    }
}
