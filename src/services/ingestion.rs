//! 图片导入服务 - 业务能力层
//!
//! 把用户选择的一批文件变成待处理图片：
//! 1. 跳过非图片类型
//! 2. 按剩余容量截断（在读取顺序上取前 N 个）
//! 3. 读取、base64 编码并生成预览
//!
//! 读取失败的文件只记录日志并跳过，不影响同一批的其他文件

use std::sync::Arc;
use tracing::{debug, warn};

use crate::infrastructure::SharedStore;
use crate::models::{ItemId, PendingImage, RawFile, SourceFile, ToolMode, MAX_IMAGES};
use crate::utils::data_url::{encode_base64, to_data_url};
use crate::utils::mime::is_image_mime;

/// 一次导入的结果
#[derive(Debug, Default)]
pub struct IngestReport {
    /// 按选择顺序生成的待处理图片（尚未归属模式）
    pub pending: Vec<PendingImage>,
    /// 非图片类型被跳过的数量
    pub skipped_non_image: usize,
    /// 读取失败被跳过的数量
    pub unreadable: usize,
    /// 超出容量被丢弃的数量
    pub over_capacity: usize,
}

/// 把一批文件转换为待处理图片
///
/// # 参数
/// - `files`: 用户选择的文件，按选择顺序
/// - `mode`: 当前激活的模式（只用于日志）
/// - `current_count`: 当前模式已有的图片数量
pub async fn prepare_batch(
    files: Vec<RawFile>,
    mode: ToolMode,
    current_count: usize,
) -> IngestReport {
    let mut report = IngestReport::default();
    let space_left = MAX_IMAGES.saturating_sub(current_count);

    if space_left == 0 {
        report.over_capacity = files
            .iter()
            .filter(|f| is_image_mime(&f.mime_type))
            .count();
        report.skipped_non_image = files.len() - report.over_capacity;
        debug!("[{}] 已达到容量上限，整批丢弃", mode);
        return report;
    }

    for file in files {
        if !is_image_mime(&file.mime_type) {
            debug!("跳过非图片文件: {} ({})", file.name, file.mime_type);
            report.skipped_non_image += 1;
            continue;
        }

        if report.pending.len() >= space_left {
            report.over_capacity += 1;
            continue;
        }

        match file.read().await {
            Ok(bytes) => report.pending.push(to_pending(file, &bytes)),
            Err(e) => {
                warn!("读取文件失败 {}: {:#}", file.name, e);
                report.unreadable += 1;
            }
        }
    }

    report
}

fn to_pending(file: RawFile, bytes: &[u8]) -> PendingImage {
    let encoded = encode_base64(bytes);
    let preview = to_data_url(&file.mime_type, &encoded);
    let path = file.path().map(|p| p.to_path_buf());

    PendingImage {
        id: ItemId::new(),
        source_file: SourceFile {
            name: file.name,
            size: bytes.len() as u64,
            mime_type: file.mime_type,
            path,
        },
        preview: Arc::from(preview),
        encoded_payload: Arc::from(encoded),
    }
}

/// 导入到存储中的结果
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub added: Vec<ItemId>,
    pub skipped_non_image: usize,
    pub unreadable: usize,
    /// 超出容量被丢弃的总数（读取前截断 + 合并时截断）
    pub dropped: usize,
}

/// 导入一批文件并合并到指定模式
///
/// 合并时会再次按当时的剩余容量截断，所以容量上限在并发导入时也成立
pub async fn ingest_into(
    store: &SharedStore,
    files: Vec<RawFile>,
    mode: ToolMode,
) -> IngestSummary {
    let current = store.count(mode);
    let report = prepare_batch(files, mode, current).await;
    let merge = store.merge_pending(report.pending, mode);

    let summary = IngestSummary {
        added: merge.added,
        skipped_non_image: report.skipped_non_image,
        unreadable: report.unreadable,
        dropped: report.over_capacity + merge.dropped,
    };

    if summary.dropped > 0 {
        warn!(
            "[{}] 容量已满 ({}), {} 张图片未加入",
            mode, MAX_IMAGES, summary.dropped
        );
    }
    debug!(
        "[{}] 导入完成: 新增 {}, 非图片 {}, 读取失败 {}",
        mode,
        summary.added.len(),
        summary.skipped_non_image,
        summary.unreadable
    );

    summary
}
