//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 处理某个模式下所有未完成的图片（idle 和 error，失败的图片在批量中会自动重试）。
//!
//! ## 设计特点
//!
//! - **快照**：开始时取出待处理 ID 列表，中途新加入的图片不属于本次批量
//! - **单 worker 队列**：ID 依次送入 channel，只有一个 worker 消费，
//!   同一时刻最多一个请求在进行
//! - **失败隔离**：单张失败只记录，不会中断后续图片
//! - **不重入**：批量进行中再次调用直接返回 `None`

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::models::{ItemId, ToolMode};
use crate::services::FailureWriter;
use crate::utils::logging;
use crate::workflow::{ItemCtx, ItemFlow, ProcessResult};

/// 批量处理结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// 快照中的图片数量
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 轮到时已不可处理（被删除或正被单独处理）
    pub skipped: usize,
}

impl BatchReport {
    fn record(&mut self, result: &ProcessResult) {
        match result {
            ProcessResult::Done => self.succeeded += 1,
            ProcessResult::Failed(_) => self.failed += 1,
            ProcessResult::Skipped => self.skipped += 1,
        }
    }
}

/// 批量进行中的标记，离开作用域时自动清除
struct RunningGuard(Arc<AtomicBool>);

impl RunningGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag.clone()))
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// 批量处理器
pub struct BatchProcessor {
    flow: Arc<ItemFlow>,
    running: Arc<AtomicBool>,
    failure_writer: Option<Arc<FailureWriter>>,
}

impl BatchProcessor {
    pub fn new(flow: Arc<ItemFlow>) -> Self {
        Self {
            flow,
            running: Arc::new(AtomicBool::new(false)),
            failure_writer: None,
        }
    }

    /// 批量结束时把失败的图片写入记录文件
    pub fn with_failure_writer(mut self, writer: FailureWriter) -> Self {
        self.failure_writer = Some(Arc::new(writer));
        self
    }

    /// 是否有批量正在进行
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// 依次处理指定模式下所有未完成的图片
    ///
    /// 已有批量在进行时返回 `None`。
    ///
    /// 运行标记由 worker 持有：调用方的 future 被丢弃后，worker 仍会处理完快照，
    /// 期间新的批量请求依然被拒绝
    pub async fn process_all_pending(&self, mode: ToolMode) -> Option<BatchReport> {
        let Some(guard) = RunningGuard::acquire(&self.running) else {
            warn!("⚠️ 已有批量处理在进行，忽略本次请求");
            return None;
        };

        let queue: Vec<(ItemId, String)> = self
            .flow
            .store()
            .view_for(mode)
            .into_iter()
            .filter(|item| !item.status.is_done())
            .map(|item| (item.id, item.source_file.name))
            .collect();

        let total = queue.len();
        logging::log_batch_start(mode, total);

        let (tx, rx) = mpsc::unbounded_channel();
        for (index, (id, name)) in queue.into_iter().enumerate() {
            // 接收端在 worker 里，worker 启动前不会被丢弃
            let _ = tx.send((ItemCtx::new(mode, index + 1, total, name), id));
        }
        drop(tx);

        let worker = tokio::spawn(run_worker(
            self.flow.clone(),
            rx,
            self.failure_writer.clone(),
            guard,
        ));

        let report = match worker.await {
            Ok(report) => report,
            Err(e) => {
                error!("[{}] 批量处理任务异常退出: {}", mode, e);
                BatchReport {
                    attempted: total,
                    failed: total,
                    ..Default::default()
                }
            }
        };

        logging::log_batch_complete(mode, &report);
        Some(report)
    }
}

/// 唯一的 worker：逐个取出 ID，等上一张有结果后才开始下一张
///
/// `_guard` 在 worker 结束（包括 panic）时才释放运行标记
async fn run_worker(
    flow: Arc<ItemFlow>,
    mut rx: mpsc::UnboundedReceiver<(ItemCtx, ItemId)>,
    failure_writer: Option<Arc<FailureWriter>>,
    _guard: RunningGuard,
) -> BatchReport {
    let mut report = BatchReport::default();

    while let Some((ctx, id)) = rx.recv().await {
        report.attempted += 1;
        info!("{} 开始处理", ctx);

        let result = flow.run(&id).await;
        if let (ProcessResult::Failed(message), Some(writer)) = (&result, &failure_writer) {
            if let Err(e) = writer.write(ctx.mode, &ctx.file_name, message) {
                warn!("{} 写入失败记录出错: {}", ctx, e);
            }
        }
        report.record(&result);
    }

    report
}
