//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 持有图片存储和当前标签页
//! - 把用户操作（导入、删除、清空、处理、导出）分发到下层
//! - 一次完整的目录处理流程
//!
//! ### `batch_processor` - 批量处理器
//! - 对某个模式的待处理图片取快照
//! - 单 worker 顺序处理，同时最多一个请求
//! - 防止批量重入
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! batch_processor (处理一个模式下的 Vec<ItemId>)
//!     ↓
//! workflow::ItemFlow (处理单张图片)
//!     ↓
//! services (能力层：导入 / 编辑 / 导出 / 失败记录)
//!     ↓
//! infrastructure (基础设施：SharedStore)
//! ```

pub mod app;
pub mod batch_processor;

pub use app::App;
pub use batch_processor::{BatchProcessor, BatchReport};
