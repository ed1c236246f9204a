use crate::clients::InferenceClient;
use crate::config::{Config, RunMode};
use crate::models::{load_scan, load_scan_folder, AnalysisResult};
use crate::orchestrator::Session;
use crate::services::{present, render_result, write_batch_report, ExportViewer};
use crate::utils::logging;
use crate::workflow::Side;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    session: Session<InferenceClient>,
    viewer: ExportViewer,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)?;

        logging::log_startup(mode_name(config.run_mode), &config.inference_base_url);

        let client = InferenceClient::new(&config).context("无法创建推理客户端")?;
        let session = Session::new(client, &config);
        let viewer = ExportViewer::new(&config.export_folder);

        Ok(Self {
            config,
            session,
            viewer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        match self.config.run_mode {
            RunMode::Single => self.run_single().await,
            RunMode::Compare => self.run_compare().await,
            RunMode::Batch => self.run_batch().await,
        }
    }

    async fn run_single(&self) -> Result<()> {
        let path = Path::new(&self.config.scan_a);
        let item = load_scan(path)
            .await
            .with_context(|| format!("无法读取扫描文件: {}", path.display()))?;
        let name = item.name.clone();

        let result = self.session.run_single(item).await?;
        self.show(&name, &result);
        Ok(())
    }

    async fn run_compare(&self) -> Result<()> {
        let scan_a = load_scan(Path::new(&self.config.scan_a))
            .await
            .with_context(|| format!("无法读取 Scan A: {}", self.config.scan_a))?;
        let scan_b = load_scan(Path::new(&self.config.scan_b))
            .await
            .with_context(|| format!("无法读取 Scan B: {}", self.config.scan_b))?;
        let names = [scan_a.name.clone(), scan_b.name.clone()];

        let outcome = self.session.run_compare(scan_a, scan_b).await?;

        for (side, name) in [Side::A, Side::B].into_iter().zip(names.iter()) {
            match outcome.side(side) {
                Ok(result) => {
                    info!("{} | {}", side, name);
                    self.show(name, result);
                }
                Err(failure) => {
                    error!("{} | {}: {}", side, name, failure.message);
                    self.log_line(&format!("{} {} failed: {}", side, name, failure.message));
                }
            }
        }
        Ok(())
    }

    async fn run_batch(&self) -> Result<()> {
        info!("\n📁 正在扫描待处理的文件...");
        let items = load_scan_folder(&self.config.scan_folder).await?;

        if items.is_empty() {
            warn!("⚠️ 没有找到待处理的 NIfTI 文件，程序结束");
            return Ok(());
        }

        let report = self.session.run_batch(&items).await?;

        for result in &report.results {
            if self.config.verbose_logging {
                info!("{}\n{}", result.filename, render_result(&result.analysis));
            }
            self.export(&result.filename, &result.analysis);
        }

        write_batch_report(Path::new(&self.config.report_file), &report)?;
        if let Err(e) = logging::append_batch_notice(&self.config.output_log_file, &report) {
            warn!("⚠️ 写入日志文件失败: {}", e);
        }
        info!("\n日志已保存至: {}", self.config.output_log_file);
        Ok(())
    }

    /// 显示结果并导出体数据
    fn show(&self, name: &str, result: &AnalysisResult) {
        info!("\n{}", render_result(result));
        self.log_line(&format!(
            "{}: {} ({:.1}%)",
            name,
            result.predicted_class,
            result.confidence * 100.0
        ));
        self.export(name, result);
    }

    fn export(&self, name: &str, result: &AnalysisResult) {
        if let Err(e) = present(&self.viewer, name, result, self.config.show_explanations) {
            warn!("⚠️ 体数据导出失败 ({}): {}", name, e);
        }
    }

    fn log_line(&self, line: &str) {
        if let Err(e) = logging::append_log_line(&self.config.output_log_file, line) {
            warn!("⚠️ 写入日志文件失败: {}", e);
        }
    }
}

fn mode_name(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Single => "单文件",
        RunMode::Compare => "对比",
        RunMode::Batch => "批量串行",
    }
}
