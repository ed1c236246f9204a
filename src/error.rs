use crate::workflow::FlowError;
use std::fmt;
use std::time::Duration;

/// 推理调用错误
///
/// 在推理客户端边界完成分类，上层流程只根据变体分支，不解析错误文本
#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// 传输层无法到达推理服务
    #[error("无法连接推理服务 ({endpoint}): {source}")]
    EndpointUnreachable {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务可达，但推理路由不存在
    #[error("推理路由不存在: {endpoint}")]
    EndpointNotFound { endpoint: String },
    /// 响应结构不符合预期
    #[error("响应格式错误: {reason}")]
    MalformedResponse { reason: String },
    /// 单个批处理条目超过等待时限
    #[error("推理超时 ({}ms)", .after.as_millis())]
    Timeout { after: Duration },
    /// 其他错误，保留原始信息用于诊断
    #[error("{message}")]
    Unknown { message: String },
}

/// 面向展示的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Connectivity,
    RouteNotFound,
    MalformedResponse,
    Timeout,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::RouteNotFound => "route-not-found",
            ErrorKind::MalformedResponse => "malformed-response",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

impl InferenceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::EndpointUnreachable { .. } => ErrorKind::Connectivity,
            InferenceError::EndpointNotFound { .. } => ErrorKind::RouteNotFound,
            InferenceError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            InferenceError::Timeout { .. } => ErrorKind::Timeout,
            InferenceError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// 给用户看的提示信息
    pub fn user_message(&self) -> String {
        match self {
            InferenceError::EndpointUnreachable { .. } => {
                "Connection Failed. Check if the inference service is awake/running or if the proxy is configured correctly.".to_string()
            }
            InferenceError::EndpointNotFound { .. } => {
                "Model endpoint not found. Check the proxy URL and endpoint name (/predict).".to_string()
            }
            InferenceError::MalformedResponse { .. } => {
                "Processing Error: The model backend returned an unexpected response. Please ensure you are uploading a valid .nii or .nii.gz file.".to_string()
            }
            InferenceError::Timeout { after } => {
                format!("Analysis timed out after {} seconds.", after.as_secs())
            }
            InferenceError::Unknown { message } => format!("Model Error: {}", message),
        }
    }

    /// 创建传输层错误
    pub fn unreachable(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        InferenceError::EndpointUnreachable {
            endpoint: endpoint.into(),
            source: Box::new(source),
        }
    }

    /// 创建响应格式错误
    pub fn malformed(reason: impl Into<String>) -> Self {
        InferenceError::MalformedResponse {
            reason: reason.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        InferenceError::Unknown {
            message: message.into(),
        }
    }
}

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 推理调用错误
    Inference(InferenceError),
    /// 提交流程错误
    Flow(FlowError),
    /// 文件操作错误
    File(FileError),
    /// 配置错误
    Config(ConfigError),
    /// 已有提交正在进行
    SubmissionInProgress,
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Inference(e) => write!(f, "推理错误: {}", e),
            AppError::Flow(e) => write!(f, "分析失败: {}", e),
            AppError::File(e) => write!(f, "文件错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::SubmissionInProgress => write!(f, "已有分析任务正在进行，请等待其完成"),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Inference(e) => Some(e),
            AppError::Flow(e) => Some(e),
            AppError::File(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::SubmissionInProgress | AppError::Other(_) => None,
        }
    }
}

/// 文件操作错误
#[derive(Debug)]
pub enum FileError {
    /// 文件不存在
    NotFound { path: String },
    /// 读取文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 写入文件失败
    WriteFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 目录不存在
    DirectoryNotFound { path: String },
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::NotFound { path } => write!(f, "文件不存在: {}", path),
            FileError::ReadFailed { path, source } => {
                write!(f, "读取文件失败 ({}): {}", path, source)
            }
            FileError::WriteFailed { path, source } => {
                write!(f, "写入文件失败 ({}): {}", path, source)
            }
            FileError::DirectoryNotFound { path } => write!(f, "目录不存在: {}", path),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::ReadFailed { source, .. } | FileError::WriteFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件解析失败
    ParseFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 配置值不合法
    InvalidValue { field: String, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseFailed { path, source } => {
                write!(f, "配置文件解析失败 ({}): {}", path, source)
            }
            ConfigError::InvalidValue { field, value } => {
                write!(f, "配置项 {} 的值 '{}' 不合法", field, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ParseFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            ConfigError::InvalidValue { .. } => None,
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::Inference(err)
    }
}

impl From<FlowError> for AppError {
    fn from(err: FlowError) -> Self {
        AppError::Flow(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Other(format!("JSON 序列化失败: {}", err))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(ConfigError::ParseFailed {
            path: String::new(), // TOML错误通常不包含路径信息
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
