//! 单张图片处理流程 - 流程层
//!
//! 状态机：`idle -> processing -> done | error`，`error -> processing` 即重试，`done` 为终态
//!
//! 流程顺序：
//! 1. 原子地检查并进入 processing（同时清除旧的错误信息）
//! 2. 调用图片编辑服务
//! 3. 写回 done / error

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::infrastructure::SharedStore;
use crate::models::{ItemId, ItemStatus};
use crate::services::ImageEditor;

/// 服务没有给出错误描述时展示的信息
pub const FALLBACK_ERROR_MESSAGE: &str = "Connection failed";

/// 单张图片的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    /// 处理成功
    Done,
    /// 处理失败，附带展示给用户的错误信息
    Failed(String),
    /// 未处理（不存在、正在处理或已完成）
    Skipped,
}

/// 单张图片处理流程
///
/// - 不持有图片，只通过 `SharedStore` 读写状态
/// - 对同一张图片的重复调用是幂等的：正在处理时直接跳过
pub struct ItemFlow {
    store: SharedStore,
    editor: Arc<dyn ImageEditor>,
}

impl ItemFlow {
    pub fn new(store: SharedStore, editor: Arc<dyn ImageEditor>) -> Self {
        Self { store, editor }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// 处理一张图片，同时也是重试的单位
    pub async fn run(&self, id: &ItemId) -> ProcessResult {
        let Some(item) = self.store.begin_processing(id) else {
            debug!("图片 {} 不可处理，跳过", id);
            return ProcessResult::Skipped;
        };

        let mode = item.mode();
        info!("[{}] 🔄 正在处理 {}", mode, item.source_file.name);

        let outcome = self
            .editor
            .edit(&item.encoded_payload, &item.source_file.mime_type, mode)
            .await;

        let (status, result) = match outcome {
            Ok(url) => {
                info!("[{}] ✓ 处理完成 {}", mode, item.source_file.name);
                (
                    ItemStatus::Done {
                        result: Arc::from(url),
                    },
                    ProcessResult::Done,
                )
            }
            Err(e) => {
                let mut message = e.to_string();
                if message.trim().is_empty() {
                    message = FALLBACK_ERROR_MESSAGE.to_string();
                }
                warn!("[{}] ❌ 处理失败 {}: {}", mode, item.source_file.name, message);
                (ItemStatus::Error { message: message.clone() }, ProcessResult::Failed(message))
            }
        };

        if !self.store.finish(id, status) {
            debug!("图片 {} 在处理期间已被删除，结果丢弃", id);
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EditError;
    use crate::models::ToolMode;
    use crate::services::ingest_into;
    use crate::testing::{image, ScriptedEditor, CLEAN_PNG};
    use tokio::sync::Semaphore;

    async fn setup(editor: ScriptedEditor) -> (ItemFlow, Arc<ScriptedEditor>, ItemId) {
        let store = SharedStore::new();
        let summary = ingest_into(&store, vec![image("a.png")], ToolMode::Logo).await;
        let editor = Arc::new(editor);
        let flow = ItemFlow::new(store, editor.clone());
        (flow, editor, summary.added[0].clone())
    }

    #[tokio::test]
    async fn test_success_sets_result() {
        let (flow, editor, id) = setup(ScriptedEditor::new()).await;

        assert_eq!(flow.run(&id).await, ProcessResult::Done);

        let item = flow.store().get(&id).unwrap();
        assert_eq!(item.processed_url(), Some(CLEAN_PNG));
        assert!(item.error_message().is_none());
        assert_eq!(editor.calls(), 1);
    }

    #[tokio::test]
    async fn test_failure_sets_message() {
        let editor = ScriptedEditor::with_script(vec![Err(EditError::NoCandidates)]);
        let (flow, _, id) = setup(editor).await;

        let result = flow.run(&id).await;
        assert_eq!(
            result,
            ProcessResult::Failed("No candidates returned from Gemini".to_string())
        );

        let item = flow.store().get(&id).unwrap();
        assert_eq!(item.error_message(), Some("No candidates returned from Gemini"));
        assert!(item.processed_url().is_none());
    }

    #[tokio::test]
    async fn test_empty_error_falls_back() {
        let editor = ScriptedEditor::with_script(vec![Err(EditError::Other(String::new()))]);
        let (flow, _, id) = setup(editor).await;

        flow.run(&id).await;
        let item = flow.store().get(&id).unwrap();
        assert_eq!(item.error_message(), Some(FALLBACK_ERROR_MESSAGE));
    }

    #[tokio::test]
    async fn test_done_item_is_not_reprocessed() {
        let (flow, editor, id) = setup(ScriptedEditor::new()).await;

        flow.run(&id).await;
        assert_eq!(flow.run(&id).await, ProcessResult::Skipped);
        assert_eq!(editor.calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_item_is_skipped() {
        let (flow, editor, _) = setup(ScriptedEditor::new()).await;
        assert_eq!(flow.run(&ItemId::from("ghost")).await, ProcessResult::Skipped);
        assert_eq!(editor.calls(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_call_while_processing_is_noop() {
        let gate = Arc::new(Semaphore::new(0));
        let (flow, editor, id) = setup(ScriptedEditor::new().gated(gate.clone())).await;
        let flow = Arc::new(flow);

        let first = {
            let flow = flow.clone();
            let id = id.clone();
            tokio::spawn(async move { flow.run(&id).await })
        };
        while !flow.store().get(&id).unwrap().status.is_processing() {
            tokio::task::yield_now().await;
        }

        assert_eq!(flow.run(&id).await, ProcessResult::Skipped);

        gate.add_permits(1);
        assert_eq!(first.await.unwrap(), ProcessResult::Done);
        assert_eq!(editor.calls(), 1);
    }

    #[tokio::test]
    async fn test_removed_while_processing_discards_result() {
        let gate = Arc::new(Semaphore::new(0));
        let (flow, _, id) = setup(ScriptedEditor::new().gated(gate.clone())).await;
        let flow = Arc::new(flow);

        let task = {
            let flow = flow.clone();
            let id = id.clone();
            tokio::spawn(async move { flow.run(&id).await })
        };
        while !flow.store().get(&id).unwrap().status.is_processing() {
            tokio::task::yield_now().await;
        }

        flow.store().clear(ToolMode::Logo);
        gate.add_permits(1);
        task.await.unwrap();

        assert!(flow.store().get(&id).is_none());
    }
}
