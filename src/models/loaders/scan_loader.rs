use crate::error::{AppError, AppResult, FileError};
use crate::models::upload::{is_nifti_name, UploadItem};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 读取单个扫描文件为 UploadItem
pub async fn load_scan(path: &Path) -> AppResult<UploadItem> {
    if !path.exists() {
        return Err(AppError::File(FileError::NotFound {
            path: path.display().to_string(),
        }));
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    Ok(UploadItem::new(name, bytes))
}

/// 加载文件夹中所有 `.nii` / `.nii.gz` 文件
///
/// 按文件名排序后分配批次序号；读取失败的文件记录警告并跳过
pub async fn load_scan_folder(folder_path: &str) -> AppResult<Vec<UploadItem>> {
    let folder = PathBuf::from(folder_path);

    if !folder.is_dir() {
        return Err(AppError::File(FileError::DirectoryNotFound {
            path: folder_path.to_string(),
        }));
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .map_err(|e| AppError::file_read_failed(folder_path, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_scan = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(is_nifti_name)
            .unwrap_or(false);
        if is_scan && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        match load_scan(&path).await {
            Ok(item) => {
                tracing::info!("正在加载: {} ({} 字节)", item.name, item.size());
                let index = items.len();
                items.push(item.with_index(index));
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(items)
}
