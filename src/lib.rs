//! # Logo Remover
//!
//! 批量去除图片中的 Logo / 水印：上传最多 100 张图片，逐张交给图片编辑模型处理，
//! 支持单张重试和批量导出
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有唯一的共享资源（图片存储）
//! - `SharedStore` - 带版本号的整体替换集合，一把锁
//!
//! ### ② 业务能力层（Services / Clients）
//! - `clients/` - Gemini HTTP 客户端
//! - `services/` - 导入、图片编辑、导出、失败记录，每个只做一件事
//!
//! ### ③ 流程层（Workflow）
//! - `ItemFlow` - 单张图片的状态机（idle → processing → done / error）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 单 worker 顺序批量处理
//! - `orchestrator/app` - 应用入口，当前标签页和用户操作
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出常用类型
pub use clients::GeminiClient;
pub use config::Config;
pub use error::{AppError, AppResult, EditError};
pub use infrastructure::{ItemStore, PartitionSummary, RemoveOutcome, SharedStore};
pub use models::{ImageItem, ItemId, ItemStatus, RawFile, ToolMode, MAX_IMAGES};
pub use orchestrator::{App, BatchProcessor, BatchReport};
pub use services::ImageEditor;
pub use workflow::{ItemFlow, ProcessResult};
