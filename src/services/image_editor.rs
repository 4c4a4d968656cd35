//! 图片编辑服务 - 业务能力层
//!
//! 只负责"把一张图交给模型处理"这一能力，不关心状态和流程

use async_trait::async_trait;
use tracing::warn;

use crate::clients::GeminiClient;
use crate::error::EditError;
use crate::models::ToolMode;

/// 外部图片编辑服务
///
/// 输入 base64 原图、MIME 类型和模式，输出结果图片的 data URL
#[async_trait]
pub trait ImageEditor: Send + Sync {
    async fn edit(
        &self,
        encoded_payload: &str,
        mime_type: &str,
        mode: ToolMode,
    ) -> Result<String, EditError>;
}

#[async_trait]
impl ImageEditor for GeminiClient {
    async fn edit(
        &self,
        encoded_payload: &str,
        mime_type: &str,
        mode: ToolMode,
    ) -> Result<String, EditError> {
        self.edit_image(encoded_payload, mime_type, mode.instruction())
            .await
            .map_err(|e| {
                warn!("Gemini {} 去除失败: {}", mode, e);
                if e.to_string().trim().is_empty() {
                    EditError::Other(format!("Failed to remove {}", mode))
                } else {
                    e
                }
            })
    }
}
