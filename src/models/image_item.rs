use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::models::ToolMode;
use crate::utils::mime::display_subtype;

/// 图片唯一标识，在整个存储内唯一
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ItemId(String);

impl ItemId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// 原始文件的元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// 文件名（不含目录）
    pub name: String,
    /// 字节大小
    pub size: u64,
    /// 声明的 MIME 类型
    pub mime_type: String,
    /// 文件来源路径（从目录加载时才有）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// 图片处理状态
///
/// 结果只在 `Done` 中存在，错误信息只在 `Error` 中存在
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ItemStatus {
    Idle,
    Processing,
    Done {
        /// 处理结果（data URL）
        result: Arc<str>,
    },
    Error {
        message: String,
    },
}

impl ItemStatus {
    pub fn is_done(&self) -> bool {
        matches!(self, ItemStatus::Done { .. })
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, ItemStatus::Processing)
    }

    /// 只有 idle / error 的图片可以开始处理
    pub fn is_processable(&self) -> bool {
        matches!(self, ItemStatus::Idle | ItemStatus::Error { .. })
    }
}

/// 刚完成读取、尚未归属模式的图片
#[derive(Debug, Clone)]
pub struct PendingImage {
    pub id: ItemId,
    pub source_file: SourceFile,
    /// 原图预览（data URL）
    pub preview: Arc<str>,
    /// base64 编码后的原图
    pub encoded_payload: Arc<str>,
}

impl PendingImage {
    /// 归入指定模式，得到 idle 状态的图片
    pub fn into_item(self, mode: ToolMode) -> ImageItem {
        ImageItem {
            id: self.id,
            source_file: self.source_file,
            preview: self.preview,
            encoded_payload: self.encoded_payload,
            status: ItemStatus::Idle,
            mode,
        }
    }
}

/// 一张上传的图片及其处理状态
#[derive(Debug, Clone, Serialize)]
pub struct ImageItem {
    pub id: ItemId,
    pub source_file: SourceFile,
    #[serde(skip)]
    pub preview: Arc<str>,
    #[serde(skip)]
    pub encoded_payload: Arc<str>,
    #[serde(flatten)]
    pub status: ItemStatus,
    mode: ToolMode,
}

impl ImageItem {
    /// 模式在创建后不可修改
    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn processed_url(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Done { result } => Some(result),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ItemStatus::Error { message } => Some(message),
            _ => None,
        }
    }

    /// 下载时使用的文件名
    pub fn download_name(&self) -> String {
        format!("cleaned-{}", self.source_file.name)
    }

    /// 展示用的元数据，例如 `12.3 KB • PNG`
    pub fn metadata_line(&self) -> String {
        format!(
            "{:.1} KB • {}",
            self.source_file.size as f64 / 1024.0,
            display_subtype(&self.source_file.mime_type)
        )
    }

    /// 当前可执行操作的文案
    pub fn action_label(&self) -> &'static str {
        match self.status {
            ItemStatus::Done { .. } => "Download",
            ItemStatus::Error { .. } => "Retry",
            ItemStatus::Processing => "Processing",
            ItemStatus::Idle => self.mode.action_label(),
        }
    }
}
