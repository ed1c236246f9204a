//! 体数据查看器交接 - 业务能力层
//!
//! 把解码后的扫描和热力图暂存为临时文件交给查看器，查看器加载完成后
//! 无论成功与否都释放这些临时文件

use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResult, VolumePair};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// 热力图默认只显示最大值 15% 以上的区域
pub const DEFAULT_HEATMAP_THRESHOLD: f64 = 0.15;

/// 交给查看器的显示信息
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerMetadata {
    /// 来源文件名
    pub source_name: String,
    pub predicted_class: String,
    pub confidence: f64,
    /// 是否显示视图说明和图例
    pub show_explanations: bool,
    /// 热力图阈值（相对最大值的比例）
    pub heatmap_threshold: f64,
}

impl ViewerMetadata {
    pub fn from_result(source_name: &str, result: &AnalysisResult, show_explanations: bool) -> Self {
        Self {
            source_name: source_name.to_string(),
            predicted_class: result.predicted_class.clone(),
            confidence: result.confidence,
            show_explanations,
            heatmap_threshold: DEFAULT_HEATMAP_THRESHOLD,
        }
    }
}

/// 体数据查看器
pub trait VolumeViewer {
    /// 加载扫描体数据和热力图，返回后临时文件即被释放
    fn load_volumes(&self, scan: &Path, heatmap: &Path, metadata: &ViewerMetadata) -> AppResult<()>;
}

/// 暂存的体数据文件，drop 时自动删除
pub struct StagedVolumes {
    scan: NamedTempFile,
    heatmap: NamedTempFile,
}

impl StagedVolumes {
    pub fn stage(volumes: &VolumePair) -> AppResult<Self> {
        Ok(Self {
            scan: write_temp("scan.nii", &volumes.scan)?,
            heatmap: write_temp("heatmap.nii", &volumes.heatmap)?,
        })
    }

    pub fn scan_path(&self) -> &Path {
        self.scan.path()
    }

    pub fn heatmap_path(&self) -> &Path {
        self.heatmap.path()
    }
}

fn write_temp(suffix: &str, bytes: &[u8]) -> AppResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("neuroscan_")
        .suffix(&format!("_{}", suffix))
        .tempfile()
        .map_err(|e| AppError::file_write_failed(suffix, e))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| AppError::file_write_failed(file.path().display().to_string(), e))?;
    Ok(file)
}

/// 把结果中的体数据交给查看器
///
/// 没有体数据时不做任何事并返回 `false`
pub fn present(
    viewer: &dyn VolumeViewer,
    source_name: &str,
    result: &AnalysisResult,
    show_explanations: bool,
) -> AppResult<bool> {
    let Some(volumes) = result.volumes.as_ref() else {
        debug!("{} 没有体数据，跳过查看器", source_name);
        return Ok(false);
    };

    let staged = StagedVolumes::stage(volumes)?;
    let metadata = ViewerMetadata::from_result(source_name, result, show_explanations);

    let loaded = viewer.load_volumes(staged.scan_path(), staged.heatmap_path(), &metadata);
    drop(staged);

    loaded.map(|_| true)
}

/// 导出查看器：把体数据写入目录，供外部 NIfTI 查看器打开
pub struct ExportViewer {
    folder: PathBuf,
}

impl ExportViewer {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    fn target(&self, source_name: &str, kind: &str) -> PathBuf {
        self.folder
            .join(format!("{}_{}.nii", file_stem(source_name), kind))
    }
}

impl VolumeViewer for ExportViewer {
    fn load_volumes(&self, scan: &Path, heatmap: &Path, metadata: &ViewerMetadata) -> AppResult<()> {
        fs::create_dir_all(&self.folder)
            .map_err(|e| AppError::file_write_failed(self.folder.display().to_string(), e))?;

        let scan_target = self.target(&metadata.source_name, "scan");
        let heatmap_target = self.target(&metadata.source_name, "heatmap");

        fs::copy(scan, &scan_target)
            .map_err(|e| AppError::file_write_failed(scan_target.display().to_string(), e))?;
        fs::copy(heatmap, &heatmap_target)
            .map_err(|e| AppError::file_write_failed(heatmap_target.display().to_string(), e))?;

        info!(
            "🧠 已导出体数据: {} | 预测: {} ({:.1}%)",
            scan_target.display(),
            metadata.predicted_class,
            metadata.confidence * 100.0
        );
        if metadata.show_explanations {
            info!(
                "   热力图阈值: 最大值的 {:.0}% 以上 | 叠加文件: {}",
                metadata.heatmap_threshold * 100.0,
                heatmap_target.display()
            );
        }

        Ok(())
    }
}

/// 去掉 `.nii` / `.nii.gz` 扩展名
fn file_stem(name: &str) -> &str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".nii.gz") {
        &name[..name.len() - ".nii.gz".len()]
    } else if lower.ends_with(".nii") {
        &name[..name.len() - ".nii".len()]
    } else {
        name
    }
}
