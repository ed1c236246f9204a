//! 会话 - 编排层
//!
//! 持有推理后端和三种提交流程，保证同一时间只有一个流程在进行

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tracing::warn;

use crate::clients::InferenceBackend;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResult, BatchReport, UploadItem};
use crate::orchestrator::batch_processor::BatchOrchestrator;
use crate::workflow::{CompareFlow, CompareOutcome, Side, SingleFlow};

/// 分析会话
pub struct Session<B> {
    backend: B,
    busy: AtomicBool,
    single: Mutex<SingleFlow>,
    compare: Mutex<CompareFlow>,
    batch: BatchOrchestrator,
}

impl<B: InferenceBackend> Session<B> {
    pub fn new(backend: B, config: &Config) -> Self {
        Self::with_orchestrator(backend, BatchOrchestrator::new(config))
    }

    pub fn with_orchestrator(backend: B, batch: BatchOrchestrator) -> Self {
        Self {
            backend,
            busy: AtomicBool::new(false),
            single: Mutex::new(SingleFlow::new()),
            compare: Mutex::new(CompareFlow::new()),
            batch,
        }
    }

    /// 是否有流程正在进行（界面据此禁用提交按钮）
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn batch(&self) -> &BatchOrchestrator {
        &self.batch
    }

    /// 单文件分析
    pub async fn run_single(&self, item: UploadItem) -> AppResult<AnalysisResult> {
        let _guard = self.begin()?;
        let mut flow = self.single.lock().await;
        flow.select(item);
        let result = flow.submit(&self.backend).await?;
        Ok(result.clone())
    }

    /// 两个文件对比分析
    pub async fn run_compare(&self, scan_a: UploadItem, scan_b: UploadItem) -> AppResult<CompareOutcome> {
        let _guard = self.begin()?;
        let mut flow = self.compare.lock().await;
        flow.select(Side::A, scan_a);
        flow.select(Side::B, scan_b);
        let outcome = flow.submit(&self.backend).await?;
        Ok(outcome.clone())
    }

    /// 批量分析
    pub async fn run_batch(&self, items: &[UploadItem]) -> AppResult<BatchReport> {
        let _guard = self.begin()?;
        let report = self.batch.run(&self.backend, items).await?;
        Ok(report)
    }

    fn begin(&self) -> AppResult<SubmissionGuard<'_>> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("⚠️ 已有分析任务正在进行，忽略本次提交");
            return Err(AppError::SubmissionInProgress);
        }
        Ok(SubmissionGuard(&self.busy))
    }
}

/// drop 时释放提交占用
struct SubmissionGuard<'a>(&'a AtomicBool);

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
