//! 失败记录服务 - 业务能力层
//!
//! 只负责"把处理失败的图片写入记录文件"，不关心流程

use anyhow::Result;
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

use crate::models::ToolMode;

/// 失败记录服务
pub struct FailureWriter {
    file_path: String,
}

impl FailureWriter {
    /// 使用指定的记录文件
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            file_path: path.into(),
        }
    }

    /// 追加一条失败记录
    ///
    /// # 参数
    /// - `mode`: 处理模式
    /// - `file_name`: 原文件名
    /// - `message`: 错误信息
    pub fn write(&self, mode: ToolMode, file_name: &str, message: &str) -> Result<()> {
        debug!("写入失败记录: [{}] {} | {}", mode, file_name, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;

        let line = format!(
            "{} | [{}] {} | {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            mode,
            file_name,
            message
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}
