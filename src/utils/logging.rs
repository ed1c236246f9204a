/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use crate::models::BatchReport;
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能被多次调用，忽略重复初始化
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n扫描分析日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 向日志文件追加一行（带时间戳）
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 把批次提示追加到日志文件，全部成功时不写
///
/// 返回是否写入了提示
pub fn append_batch_notice(log_file_path: &str, report: &BatchReport) -> Result<bool> {
    match report.summary.notice() {
        Some(notice) => {
            append_log_line(log_file_path, &notice)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// 记录程序启动信息
pub fn log_startup(mode: &str, base_url: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - {} 模式", mode);
    info!("🌐 推理服务: {}", base_url);
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
///
/// # 参数
/// - `total`: 文件总数
/// - `item_timeout`: 单个文件超时
/// - `pacing_delay`: 文件间隔
pub fn log_batch_start(total: usize, item_timeout: Duration, pacing_delay: Duration) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始批量分析: 共 {} 个文件", total);
    info!(
        "⏱️ 单个超时 {}s | 间隔 {}ms | 串行处理",
        item_timeout.as_secs(),
        pacing_delay.as_millis()
    );
    info!("{}", "=".repeat(60));
}

/// 记录单个文件开始
pub fn log_item_start(current: usize, total: usize, filename: &str) {
    info!("\n{}", "─".repeat(60));
    info!("📄 [文件 {}/{}] {}", current, total, filename);
}

/// 记录批次完成信息
pub fn log_batch_complete(report: &BatchReport) {
    info!("\n{}", "=".repeat(60));
    info!("📊 批量分析完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", report.processed(), report.total);
    info!("❌ 失败: {}", report.failures.len());
    for failure in &report.failures {
        info!(
            "   #{} {} [{}] {}",
            failure.file_index + 1,
            failure.filename,
            failure.kind,
            failure.message
        );
    }
    if let Some(notice) = report.summary.notice() {
        info!("💡 {}", notice);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
