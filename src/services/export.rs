//! 结果导出服务 - 业务能力层
//!
//! 只读取存储，把处理完成的图片写到磁盘

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::infrastructure::SharedStore;
use crate::models::{ImageItem, ItemId, ToolMode};
use crate::utils::data_url::decode_data_url;

/// 导出单张已完成的图片
///
/// 文件名为 `cleaned-<原文件名>`，同名文件已存在时追加序号
pub async fn download_one(
    store: &SharedStore,
    id: &ItemId,
    output_dir: &Path,
) -> AppResult<PathBuf> {
    let item = store
        .get(id)
        .ok_or_else(|| AppError::ItemNotFound(id.to_string()))?;
    save_item(&item, output_dir).await
}

/// 按存储顺序导出指定模式下所有已完成的图片，未完成的直接跳过
///
/// 单张导出失败只记录日志，不影响其他图片；返回成功写出的路径
pub async fn download_all(store: &SharedStore, mode: ToolMode, output_dir: &Path) -> Vec<PathBuf> {
    let mut saved = Vec::new();
    let mut failed = 0;
    for item in store.view_for(mode) {
        if !item.status.is_done() {
            continue;
        }
        match save_item(&item, output_dir).await {
            Ok(path) => saved.push(path),
            Err(e) => {
                warn!("[{}] 导出 {} 失败: {}", mode, item.source_file.name, e);
                failed += 1;
            }
        }
    }

    info!("[{}] 已导出 {} 张图片到 {}", mode, saved.len(), output_dir.display());
    if failed > 0 {
        warn!("[{}] {} 张图片导出失败", mode, failed);
    }
    saved
}

async fn save_item(item: &ImageItem, output_dir: &Path) -> AppResult<PathBuf> {
    let url = item
        .processed_url()
        .ok_or_else(|| AppError::ItemNotDone(item.source_file.name.clone()))?;
    let (_, bytes) = decode_data_url(url)?;

    fs::create_dir_all(output_dir)
        .await
        .map_err(|source| AppError::WriteFailed {
            path: output_dir.display().to_string(),
            source,
        })?;

    let target = next_free_path(output_dir, &item.download_name()).await;
    fs::write(&target, &bytes)
        .await
        .map_err(|source| AppError::WriteFailed {
            path: target.display().to_string(),
            source,
        })?;

    debug!("已保存 {} ({} 字节)", target.display(), bytes.len());
    Ok(target)
}

/// 找到目录下第一个不存在的文件名：`name`、`stem (1).ext`、`stem (2).ext` ...
async fn next_free_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !exists(&candidate).await {
        return candidate;
    }

    let as_path = Path::new(file_name);
    let stem = as_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());
    let ext = as_path.extension().map(|e| e.to_string_lossy().to_string());

    let mut n = 1;
    loop {
        let name = match &ext {
            Some(ext) => format!("{} ({}).{}", stem, n, ext),
            None => format!("{} ({})", stem, n),
        };
        let candidate = dir.join(name);
        if !exists(&candidate).await {
            return candidate;
        }
        n += 1;
    }
}

async fn exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemStatus, RawFile};
    use crate::services::ingestion::ingest_into;
    use std::sync::Arc;

    async fn store_with(names: &[&str], mode: ToolMode) -> (SharedStore, Vec<ItemId>) {
        let store = SharedStore::new();
        let files = names
            .iter()
            .map(|n| RawFile::from_bytes(*n, "image/png", b"orig".to_vec()))
            .collect();
        let summary = ingest_into(&store, files, mode).await;
        (store, summary.added)
    }

    fn done(store: &SharedStore, id: &ItemId, payload: &str) {
        store.finish(
            id,
            ItemStatus::Done {
                result: Arc::from(format!("data:image/png;base64,{}", payload)),
            },
        );
    }

    #[tokio::test]
    async fn test_download_one_requires_done() {
        let dir = tempfile::tempdir().unwrap();
        let (store, ids) = store_with(&["a.png"], ToolMode::Logo).await;

        let err = download_one(&store, &ids[0], dir.path()).await.unwrap_err();
        assert!(matches!(err, AppError::ItemNotDone(_)));

        done(&store, &ids[0], "QUJD");
        let path = download_one(&store, &ids[0], dir.path()).await.unwrap();
        assert_eq!(path.file_name().unwrap(), "cleaned-a.png");
        assert_eq!(std::fs::read(&path).unwrap(), b"ABC");
    }

    #[tokio::test]
    async fn test_download_all_skips_pending_and_dedupes_names() {
        let dir = tempfile::tempdir().unwrap();
        let (store, ids) =
            store_with(&["same.png", "same.png", "todo.png"], ToolMode::Watermark).await;
        let other_ids = ingest_into(
            &store,
            vec![RawFile::from_bytes("logo.png", "image/png", b"x".to_vec())],
            ToolMode::Logo,
        )
        .await
        .added;
        done(&store, &ids[0], "QUJD");
        done(&store, &ids[1], "WFla");
        done(&store, &other_ids[0], "QUJD");

        let saved = download_all(&store, ToolMode::Watermark, dir.path()).await;
        let names: Vec<_> = saved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["cleaned-same.png", "cleaned-same (1).png"]);
        assert_eq!(std::fs::read(&saved[1]).unwrap(), b"XYZ");
    }

    #[tokio::test]
    async fn test_download_all_skips_broken_result() {
        let dir = tempfile::tempdir().unwrap();
        let (store, ids) = store_with(&["bad.png", "good.png"], ToolMode::Logo).await;
        store.finish(
            &ids[0],
            ItemStatus::Done {
                result: Arc::from("blob:http://localhost/expired"),
            },
        );
        done(&store, &ids[1], "QUJD");

        let saved = download_all(&store, ToolMode::Logo, dir.path()).await;

        assert_eq!(saved, vec![dir.path().join("cleaned-good.png")]);
        assert_eq!(std::fs::read(&saved[0]).unwrap(), b"ABC");
        assert!(!dir.path().join("cleaned-bad.png").exists());
    }

    #[tokio::test]
    async fn test_download_missing_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = SharedStore::new();
        let err = download_one(&store, &ItemId::from("ghost"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ItemNotFound(_)));
    }
}
