//! `data:` URL 工具
//!
//! 预览和处理结果都以 `data:<mime>;base64,<payload>` 的形式保存在内存里，
//! 不需要重新读取源文件即可展示或落盘

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{AppError, AppResult};
use crate::utils::logging::truncate_text;

const DATA_URL_PATTERN: &str =
    r"^data:([A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+);base64,([A-Za-z0-9+/=\s]*)$";

static DATA_URL_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(DATA_URL_PATTERN));

/// 把字节编码成 base64 文本
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// 用已有的 base64 文本拼出 data URL
pub fn to_data_url(mime_type: &str, base64_payload: &str) -> String {
    format!("data:{};base64,{}", mime_type, base64_payload)
}

/// 解析 data URL，返回 (mime 类型, 原始字节)
pub fn decode_data_url(url: &str) -> AppResult<(String, Vec<u8>)> {
    let re = DATA_URL_RE
        .as_ref()
        .map_err(|e| AppError::InvalidImageData(e.to_string()))?;
    let caps = re
        .captures(url)
        .ok_or_else(|| AppError::InvalidImageData(truncate_text(url, 40)))?;

    let mime_type = caps[1].to_string();
    let payload: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(payload.as_bytes())
        .map_err(|e| AppError::InvalidImageData(e.to_string()))?;

    Ok((mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let url = to_data_url("image/png", &encode_base64(b"\x89PNG fake"));
        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_decode_rejects_non_data_url() {
        assert!(decode_data_url("blob:http://localhost/123").is_err());
        assert!(decode_data_url("data:image/png;base64,@@@").is_err());
    }
}
