use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::utils::mime::mime_from_path;

/// 文件内容的来源
#[derive(Debug, Clone)]
pub enum RawSource {
    /// 磁盘上的文件，读取时才打开
    Path(PathBuf),
    /// 已在内存中的字节
    Bytes(Vec<u8>),
}

/// 用户选择的一个文件，类型由选择方声明
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub mime_type: String,
    pub source: RawSource,
}

impl RawFile {
    /// 根据路径创建，MIME 类型由扩展名推断
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            mime_type: mime_from_path(&path).to_string(),
            source: RawSource::Path(path),
        }
    }

    /// 直接从内存字节创建
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            source: RawSource::Bytes(bytes.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.source {
            RawSource::Path(p) => Some(p),
            RawSource::Bytes(_) => None,
        }
    }

    /// 读取文件内容
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            RawSource::Path(path) => fs::read(path)
                .await
                .with_context(|| format!("无法读取文件: {}", path.display())),
            RawSource::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}

/// 扫描目录下的所有文件（不递归），按文件名排序
///
/// 不在这里过滤类型，非图片文件交给导入流程跳过
pub async fn load_folder(folder_path: &str) -> Result<Vec<RawFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let file_type = entry.file_type().await?;
        if file_type.is_file() {
            paths.push(entry.path());
        }
    }

    paths.sort();
    tracing::debug!("在 {} 中找到 {} 个文件", folder_path, paths.len());

    Ok(paths.into_iter().map(RawFile::from_path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_folder_sorted_and_typed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.png"), b"png").unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"jpg").unwrap();
        std::fs::write(dir.path().join("c.txt"), b"txt").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = load_folder(dir.path().to_str().unwrap()).await.unwrap();
        let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.txt"]);
        assert_eq!(files[0].mime_type, "image/jpeg");
        assert_eq!(files[2].mime_type, "text/plain");
        assert_eq!(files[1].read().await.unwrap(), b"png");
    }

    #[tokio::test]
    async fn test_load_missing_folder_fails() {
        assert!(load_folder("/definitely/not/here").await.is_err());
    }
}
