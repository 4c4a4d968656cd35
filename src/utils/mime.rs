//! 根据文件扩展名推断 MIME 类型
//!
//! 文件选择时只拿到路径，声明类型由扩展名决定

use phf::phf_map;
use std::path::Path;

static MIME_BY_EXTENSION: phf::Map<&'static str, &'static str> = phf_map! {
    "png" => "image/png",
    "jpg" => "image/jpeg",
    "jpeg" => "image/jpeg",
    "webp" => "image/webp",
    "gif" => "image/gif",
    "bmp" => "image/bmp",
    "heic" => "image/heic",
    "heif" => "image/heif",
    "avif" => "image/avif",
    "tif" => "image/tiff",
    "tiff" => "image/tiff",
    "svg" => "image/svg+xml",
    "txt" => "text/plain",
    "pdf" => "application/pdf",
    "json" => "application/json",
    "toml" => "application/toml",
};

const FALLBACK_MIME: &str = "application/octet-stream";

/// 推断文件的 MIME 类型，未知扩展名返回 `application/octet-stream`
pub fn mime_from_path(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .and_then(|ext| MIME_BY_EXTENSION.get(ext.as_str()).copied())
        .unwrap_or(FALLBACK_MIME)
}

/// 是否是图片类型（`image/*`）
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// MIME 子类型的大写形式，用于展示（`image/png` -> `PNG`）
pub fn display_subtype(mime_type: &str) -> String {
    mime_type
        .split('/')
        .nth(1)
        .unwrap_or(mime_type)
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("a/b/photo.PNG")), "image/png");
        assert_eq!(mime_from_path(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(mime_from_path(Path::new("notes.txt")), "text/plain");
        assert_eq!(mime_from_path(Path::new("no_extension")), FALLBACK_MIME);
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/webp"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime(FALLBACK_MIME));
    }

    #[test]
    fn test_display_subtype() {
        assert_eq!(display_subtype("image/png"), "PNG");
        assert_eq!(display_subtype("image/svg+xml"), "SVG+XML");
    }
}
