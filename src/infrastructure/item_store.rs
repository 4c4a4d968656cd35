//! 图片存储 - 基础设施层
//!
//! 整个系统唯一的共享可变资源。
//!
//! - `ItemStore` 是带版本号的整体值：每次修改都先基于当前集合算出新集合，再整体替换
//! - `SharedStore` 用一把互斥锁包住 `ItemStore`，锁只在同步代码里持有，不跨 `.await`

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{ImageItem, ItemId, ItemStatus, PendingImage, ToolMode, MAX_IMAGES};

/// 按插入顺序保存的图片集合
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: Arc<Vec<ImageItem>>,
    version: u64,
}

/// 合并新图片的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// 实际加入的图片 ID（按顺序）
    pub added: Vec<ItemId>,
    /// 因容量不足被丢弃的数量
    pub dropped: usize,
}

/// 单个模式分区的概况
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartitionSummary {
    pub mode: ToolMode,
    pub total: usize,
    pub capacity: usize,
    pub idle: usize,
    pub processing: usize,
    pub done: usize,
    pub error: usize,
}

impl PartitionSummary {
    /// 是否有可以下载的结果
    pub fn has_downloads(&self) -> bool {
        self.done > 0
    }

    /// 分区内是否全部处理完成（空分区也算）
    pub fn all_done(&self) -> bool {
        self.done == self.total
    }

    pub fn space_left(&self) -> usize {
        self.capacity.saturating_sub(self.total)
    }
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次整体替换后递增
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    fn replace(&mut self, next: Vec<ImageItem>) {
        self.items = Arc::new(next);
        self.version += 1;
    }

    /// 追加到末尾，保持到达顺序，不按内容去重
    pub fn add(&mut self, items: Vec<ImageItem>) {
        if items.is_empty() {
            return;
        }
        let mut next = Vec::with_capacity(self.items.len() + items.len());
        next.extend(self.items.iter().cloned());
        next.extend(items);
        self.replace(next);
    }

    /// 删除指定图片，不存在时什么都不做
    pub fn remove(&mut self, id: &ItemId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .items
            .iter()
            .filter(|item| &item.id != id)
            .cloned()
            .collect();
        self.replace(next);
        true
    }

    /// 清空指定模式的所有图片，其他模式不受影响，返回删除数量
    pub fn clear(&mut self, mode: ToolMode) -> usize {
        let before = self.items.len();
        let next: Vec<ImageItem> = self
            .items
            .iter()
            .filter(|item| item.mode() != mode)
            .cloned()
            .collect();
        let removed = before - next.len();
        if removed > 0 {
            self.replace(next);
        }
        removed
    }

    /// 指定模式的图片，按插入顺序
    pub fn view_for(&self, mode: ToolMode) -> Vec<ImageItem> {
        self.items
            .iter()
            .filter(|item| item.mode() == mode)
            .cloned()
            .collect()
    }

    pub fn count(&self, mode: ToolMode) -> usize {
        self.items.iter().filter(|item| item.mode() == mode).count()
    }

    /// 剩余容量
    pub fn space_left(&self, mode: ToolMode) -> usize {
        MAX_IMAGES.saturating_sub(self.count(mode))
    }

    /// 按剩余容量截断后合并到指定模式，超出部分直接丢弃
    pub fn merge_pending(&mut self, pending: Vec<PendingImage>, mode: ToolMode) -> MergeReport {
        let space_left = self.space_left(mode);
        let incoming = pending.len();
        if space_left == 0 {
            return MergeReport {
                added: Vec::new(),
                dropped: incoming,
            };
        }

        let items: Vec<ImageItem> = pending
            .into_iter()
            .take(space_left)
            .map(|p| p.into_item(mode))
            .collect();
        let added: Vec<ItemId> = items.iter().map(|item| item.id.clone()).collect();
        let dropped = incoming - added.len();
        self.add(items);

        MergeReport { added, dropped }
    }

    /// 替换指定图片的状态，图片不存在时返回 false
    pub fn set_status(&mut self, id: &ItemId, status: ItemStatus) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        let next = self
            .items
            .iter()
            .map(|item| {
                if &item.id == id {
                    let mut updated = item.clone();
                    updated.status = status.clone();
                    updated
                } else {
                    item.clone()
                }
            })
            .collect();
        self.replace(next);
        true
    }

    pub fn summary(&self, mode: ToolMode) -> PartitionSummary {
        let mut summary = PartitionSummary {
            mode,
            total: 0,
            capacity: MAX_IMAGES,
            idle: 0,
            processing: 0,
            done: 0,
            error: 0,
        };
        for item in self.items.iter().filter(|item| item.mode() == mode) {
            summary.total += 1;
            match item.status {
                ItemStatus::Idle => summary.idle += 1,
                ItemStatus::Processing => summary.processing += 1,
                ItemStatus::Done { .. } => summary.done += 1,
                ItemStatus::Error { .. } => summary.error += 1,
            }
        }
        summary
    }
}

/// 删除操作的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
    /// 正在处理中的图片不能删除
    Busy,
}

/// 线程安全的共享存储句柄
#[derive(Debug, Clone, Default)]
pub struct SharedStore {
    inner: Arc<Mutex<ItemStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ItemStore> {
        // 锁内只有同步的整体替换，中毒时数据依然一致
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 在锁内执行一次读改写
    pub fn update<R>(&self, f: impl FnOnce(&mut ItemStore) -> R) -> R {
        let mut store = self.lock();
        f(&mut store)
    }

    pub fn get(&self, id: &ItemId) -> Option<ImageItem> {
        self.lock().get(id).cloned()
    }

    pub fn view_for(&self, mode: ToolMode) -> Vec<ImageItem> {
        self.lock().view_for(mode)
    }

    pub fn count(&self, mode: ToolMode) -> usize {
        self.lock().count(mode)
    }

    pub fn summary(&self, mode: ToolMode) -> PartitionSummary {
        self.lock().summary(mode)
    }

    pub fn merge_pending(&self, pending: Vec<PendingImage>, mode: ToolMode) -> MergeReport {
        self.update(|store| store.merge_pending(pending, mode))
    }

    pub fn clear(&self, mode: ToolMode) -> usize {
        self.update(|store| store.clear(mode))
    }

    /// 删除图片；正在处理的图片保持不动
    pub fn remove(&self, id: &ItemId) -> RemoveOutcome {
        self.update(|store| {
            let busy = match store.get(id) {
                None => return RemoveOutcome::NotFound,
                Some(item) => item.status.is_processing(),
            };
            if busy {
                return RemoveOutcome::Busy;
            }
            store.remove(id);
            RemoveOutcome::Removed
        })
    }

    /// 原子地检查并进入 processing
    ///
    /// 只有 idle / error 的图片会被切换，返回切换后的图片；
    /// 其他情况（不存在、正在处理、已完成）返回 `None`
    pub fn begin_processing(&self, id: &ItemId) -> Option<ImageItem> {
        self.update(|store| {
            let processable = store.get(id)?.status.is_processable();
            if !processable {
                return None;
            }
            store.set_status(id, ItemStatus::Processing);
            store.get(id).cloned()
        })
    }

    /// 写入处理结果；图片已被删除时返回 false
    pub fn finish(&self, id: &ItemId, status: ItemStatus) -> bool {
        self.update(|store| store.set_status(id, status))
    }
}
