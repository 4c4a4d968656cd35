//! 处理模式（标签页）
//!
//! 每个模式是一个独立分区，拥有自己的容量上限和发送给模型的指令

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// 每个模式分区最多容纳的图片数量
pub const MAX_IMAGES: usize = 100;

const LOGO_PROMPT: &str = "Strictly identify and remove ONLY the logos or brand marks from this design. It is crucial that all other design elements, text (that isn't part of the logo), illustrations, background details, and artistic features remain 100% intact and unchanged. Reconstruct the background behind the removed logo with pixel-perfect seamlessness. Do not alter, blur, or modify any other part of the image. Maintain the exact original aspect ratio and resolution.";

const WATERMARK_PROMPT: &str = "Identify and remove ALL watermarks, including semi-transparent text patterns, grid overlays, or repeating brand stamps. Your task is to surgically remove these overlays while preserving the original colors, textures, and details underneath with 100% accuracy. Do not change, smooth, or blur any areas of the image that do not contain watermarks. The final output must be indistinguishable from a clean original, with identical resolution and aspect ratio.";

/// 处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolMode {
    /// 去除 Logo / 品牌标识
    #[default]
    Logo,
    /// 去除水印
    Watermark,
}

impl ToolMode {
    /// 发送给图片编辑模型的固定指令
    pub fn instruction(&self) -> &'static str {
        match self {
            ToolMode::Logo => LOGO_PROMPT,
            ToolMode::Watermark => WATERMARK_PROMPT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolMode::Logo => "logo",
            ToolMode::Watermark => "watermark",
        }
    }

    /// 单张图片操作按钮的文案
    pub fn action_label(&self) -> &'static str {
        match self {
            ToolMode::Logo => "Remove Logo",
            ToolMode::Watermark => "Remove Watermark",
        }
    }
}

impl fmt::Display for ToolMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "logo" => Ok(ToolMode::Logo),
            "watermark" => Ok(ToolMode::Watermark),
            other => Err(AppError::UnknownMode(other.to_string())),
        }
    }
}
