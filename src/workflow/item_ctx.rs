//! 图片处理上下文
//!
//! 封装"我正在处理哪个模式下的第几张图"这一信息，仅用于日志

use std::fmt::Display;

use crate::models::ToolMode;

/// 图片处理上下文
#[derive(Debug, Clone)]
pub struct ItemCtx {
    pub mode: ToolMode,
    /// 在本次批量中的序号（从1开始）
    pub index: usize,
    /// 本次批量的总数
    pub total: usize,
    pub file_name: String,
}

impl ItemCtx {
    pub fn new(mode: ToolMode, index: usize, total: usize, file_name: impl Into<String>) -> Self {
        Self {
            mode,
            index,
            total,
            file_name: file_name.into(),
        }
    }
}

impl Display for ItemCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} {}/{} {}]",
            self.mode, self.index, self.total, self.file_name
        )
    }
}
