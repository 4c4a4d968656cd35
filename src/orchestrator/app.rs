use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::GeminiClient;
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::{PartitionSummary, RemoveOutcome, SharedStore};
use crate::models::{load_folder, ImageItem, ItemId, RawFile, ToolMode, MAX_IMAGES};
use crate::orchestrator::{BatchProcessor, BatchReport};
use crate::services::{self, FailureWriter, ImageEditor, IngestSummary};
use crate::utils::logging;
use crate::workflow::{ItemFlow, ProcessResult};

/// 应用主结构
///
/// 持有唯一的图片存储和当前激活的模式（标签页），所有用户操作都从这里进入
pub struct App {
    config: Config,
    store: SharedStore,
    flow: Arc<ItemFlow>,
    batch: BatchProcessor,
    active_mode: ToolMode,
}

impl App {
    /// 使用 Gemini 作为图片编辑服务初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        if config.gemini_api_key.is_empty() {
            warn!("⚠️ 未设置 GEMINI_API_KEY，请求将被服务拒绝");
        }
        let client = GeminiClient::new(&config).context("无法创建 Gemini 客户端")?;
        Ok(Self::with_editor(config, Arc::new(client)))
    }

    /// 使用自定义的图片编辑服务
    pub fn with_editor(config: Config, editor: Arc<dyn ImageEditor>) -> Self {
        let store = SharedStore::new();
        let flow = Arc::new(ItemFlow::new(store.clone(), editor));
        let batch = BatchProcessor::new(flow.clone())
            .with_failure_writer(FailureWriter::with_path(config.failure_log_file.clone()));
        let active_mode = config.mode;

        Self {
            config,
            store,
            flow,
            batch,
            active_mode,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn active_mode(&self) -> ToolMode {
        self.active_mode
    }

    /// 切换标签页
    pub fn set_active_mode(&mut self, mode: ToolMode) {
        self.active_mode = mode;
    }

    /// 当前标签页的图片
    pub fn images(&self) -> Vec<ImageItem> {
        self.store.view_for(self.active_mode)
    }

    /// 当前标签页的概况
    pub fn summary(&self) -> PartitionSummary {
        self.store.summary(self.active_mode)
    }

    /// "全部处理"是否可用：没有批量在进行，且还有未完成的图片
    pub fn can_process_all(&self) -> bool {
        !self.batch.is_running() && !self.summary().all_done()
    }

    pub fn is_processing_all(&self) -> bool {
        self.batch.is_running()
    }

    /// 把选择的文件加入当前标签页
    pub async fn add_files(&self, files: Vec<RawFile>) -> IngestSummary {
        services::ingest_into(&self.store, files, self.active_mode).await
    }

    pub fn remove_image(&self, id: &ItemId) -> RemoveOutcome {
        self.store.remove(id)
    }

    /// 清空当前标签页
    pub fn clear_tab(&self) -> usize {
        self.store.clear(self.active_mode)
    }

    /// 处理或重试单张图片
    pub async fn process_image(&self, id: &ItemId) -> ProcessResult {
        self.flow.run(id).await
    }

    /// 处理当前标签页所有未完成的图片
    pub async fn process_all(&self) -> Option<BatchReport> {
        self.batch.process_all_pending(self.active_mode).await
    }

    pub async fn download_image(&self, id: &ItemId, output_dir: &Path) -> AppResult<PathBuf> {
        services::download_one(&self.store, id, output_dir).await
    }

    /// 导出当前标签页所有已完成的图片，返回成功写出的路径
    pub async fn download_all(&self, output_dir: &Path) -> Vec<PathBuf> {
        services::download_all(&self.store, self.active_mode, output_dir).await
    }

    /// 运行一次完整流程：扫描输入目录 → 导入 → 批量处理 → 导出
    pub async fn run(&self) -> Result<BatchReport> {
        logging::init_log_file(&self.config.output_log_file, self.active_mode)?;
        logging::log_startup(&self.config);

        info!("\n📁 正在扫描待处理的图片...");
        let files = load_folder(&self.config.input_folder).await?;
        if files.is_empty() {
            warn!("⚠️ 没有找到待处理的图片，程序结束");
            return Ok(BatchReport::default());
        }

        let ingest = self.add_files(files).await;
        logging::log_files_loaded(ingest.added.len(), ingest.dropped, MAX_IMAGES);

        let report = self.process_all().await.unwrap_or_default();

        let saved = self.download_all(Path::new(&self.config.output_folder)).await;

        logging::print_final_stats(&report, saved.len(), &self.config.output_log_file);
        Ok(report)
    }
}
