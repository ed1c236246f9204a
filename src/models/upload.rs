//! 上传条目

use std::fmt;

/// 用户提交的单个扫描文件
///
/// 提交后不再修改，由创建它的流程持有
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadItem {
    /// 原始文件名
    pub name: String,
    /// 文件内容
    pub bytes: Vec<u8>,
    /// 在批次中的序号（从 0 开始）
    pub index: usize,
    upload_name: String,
}

impl UploadItem {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let upload_name = derive_upload_name(&name);
        Self {
            name,
            bytes,
            index: 0,
            upload_name,
        }
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.index = index;
        self
    }

    /// 发送给后端的文件名，创建时确定，上传和推理请求使用同一个名字
    pub fn upload_name(&self) -> &str {
        &self.upload_name
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

impl fmt::Display for UploadItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[文件#{} {}]", self.index + 1, self.name)
    }
}

/// 后端依赖扩展名识别 NIfTI，缺少 `.nii` / `.nii.gz` 时补上；
/// 浏览器式的通用名（含 `blob`）替换为带时间戳的名字
fn derive_upload_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if is_nifti_name(&lower) {
        return name.to_string();
    }
    if lower.contains("blob") {
        format!(
            "scan_upload_{}.nii.gz",
            chrono::Utc::now().timestamp_millis()
        )
    } else {
        format!("{}.nii.gz", name)
    }
}

/// 文件名是否带 NIfTI 扩展名（不区分大小写）
pub fn is_nifti_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".nii") || lower.ends_with(".nii.gz")
}
