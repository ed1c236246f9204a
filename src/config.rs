use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 运行模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// 单个扫描
    Single,
    /// 两个扫描对比
    Compare,
    /// 文件夹批量处理
    Batch,
}

impl std::str::FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(RunMode::Single),
            "compare" => Ok(RunMode::Compare),
            "batch" => Ok(RunMode::Batch),
            other => Err(ConfigError::InvalidValue {
                field: "run_mode".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 推理服务配置 ---
    /// 推理服务根地址（可以是反向代理前缀）
    pub inference_base_url: String,
    /// 推理路由
    pub predict_route: String,
    /// 批处理中单个文件的最长等待时间（毫秒）
    pub item_timeout_ms: u64,
    /// 批处理相邻文件之间的间隔（毫秒）
    pub pacing_delay_ms: u64,
    /// HTTP 请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 运行配置 ---
    pub run_mode: RunMode,
    /// 批量模式下扫描文件所在目录
    pub scan_folder: String,
    /// 对比模式的两个文件
    pub scan_a: String,
    pub scan_b: String,
    /// 体数据导出目录
    pub export_folder: String,
    /// 输出日志文件
    pub output_log_file: String,
    /// 批处理报告文件
    pub report_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 查看器是否显示说明和图例
    pub show_explanations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inference_base_url: "https://karenmaza-neuroscan-backend.hf.space".to_string(),
            predict_route: "/predict".to_string(),
            item_timeout_ms: 120_000,
            pacing_delay_ms: 500,
            request_timeout_secs: 300,
            run_mode: RunMode::Batch,
            scan_folder: "scans".to_string(),
            scan_a: String::new(),
            scan_b: String::new(),
            export_folder: "output_volumes".to_string(),
            output_log_file: "output.txt".to_string(),
            report_file: "batch_report.json".to_string(),
            verbose_logging: false,
            show_explanations: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            inference_base_url: std::env::var("INFERENCE_BASE_URL").unwrap_or(default.inference_base_url),
            predict_route: std::env::var("PREDICT_ROUTE").unwrap_or(default.predict_route),
            item_timeout_ms: std::env::var("ITEM_TIMEOUT_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.item_timeout_ms),
            pacing_delay_ms: std::env::var("PACING_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_delay_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            run_mode: std::env::var("RUN_MODE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.run_mode),
            scan_folder: std::env::var("SCAN_FOLDER").unwrap_or(default.scan_folder),
            scan_a: std::env::var("SCAN_A").unwrap_or(default.scan_a),
            scan_b: std::env::var("SCAN_B").unwrap_or(default.scan_b),
            export_folder: std::env::var("EXPORT_FOLDER").unwrap_or(default.export_folder),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            report_file: std::env::var("REPORT_FILE").unwrap_or(default.report_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            show_explanations: std::env::var("SHOW_EXPLANATIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.show_explanations),
        }
    }

    /// 从 TOML 文件加载配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::Config(ConfigError::ParseFailed { source, .. }) => {
                AppError::Config(ConfigError::ParseFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn item_timeout(&self) -> Duration {
        Duration::from_millis(self.item_timeout_ms)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
