//! 批量处理器 - 编排层
//!
//! ## 职责
//!
//! 按顺序把 N 个文件逐个提交给推理服务，单个文件失败不会中断整个批次。
//!
//! ## 核心流程
//!
//! 1. **建立连接**：先调用 `connect()`，失败则整个批次失败，不处理任何文件
//! 2. **顺序处理**：第 i+1 个文件一定在第 i 个文件结束并等待间隔之后才开始
//! 3. **超时控制**：每个文件与固定超时赛跑，超时只放弃结果，不保证底层请求被取消
//! 4. **增量发布**：每个成功结果立即追加到累积列表并通知观察者
//! 5. **失败丢弃**：失败（包括超时）的文件只记录原因，不重试，不进入累积列表
//! 6. **进度复位**：无论如何结束，进度都复位为 `{0, 0}`
//!
//! ## 设计特点
//!
//! - **严格串行**：对远端服务的限流手段，不做并发
//! - **单一写者**：累积列表只由本循环写入，观察者通过 `watch` 通道读取

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{info, warn};

use crate::clients::InferenceBackend;
use crate::config::Config;
use crate::error::InferenceError;
use crate::models::{
    AnalysisResult, BatchProgress, BatchReport, BatchResult, ItemFailure, UploadItem,
};
use crate::services::normalizer;
use crate::utils::logging;

/// 批量处理器
pub struct BatchOrchestrator {
    item_timeout: Duration,
    pacing_delay: Duration,
    progress: watch::Sender<BatchProgress>,
    results: watch::Sender<Vec<Arc<BatchResult>>>,
}

impl BatchOrchestrator {
    pub fn new(config: &Config) -> Self {
        Self::with_timing(config.item_timeout(), config.pacing_delay())
    }

    /// 使用自定义超时和间隔创建
    pub fn with_timing(item_timeout: Duration, pacing_delay: Duration) -> Self {
        let (progress, _) = watch::channel(BatchProgress::idle());
        let (results, _) = watch::channel(Vec::new());
        Self {
            item_timeout,
            pacing_delay,
            progress,
            results,
        }
    }

    /// 订阅进度
    pub fn subscribe_progress(&self) -> watch::Receiver<BatchProgress> {
        self.progress.subscribe()
    }

    /// 订阅结果累积列表
    pub fn subscribe_results(&self) -> watch::Receiver<Vec<Arc<BatchResult>>> {
        self.results.subscribe()
    }

    pub fn progress(&self) -> BatchProgress {
        *self.progress.borrow()
    }

    /// 运行一个批次
    ///
    /// 只有连接阶段失败才返回错误；单个文件的失败记录在报告里
    pub async fn run<B>(&self, backend: &B, items: &[UploadItem]) -> Result<BatchReport, InferenceError>
    where
        B: InferenceBackend + ?Sized,
    {
        let total = items.len();
        self.progress.send_replace(BatchProgress::idle());
        self.results.send_replace(Vec::new());

        if items.is_empty() {
            warn!("⚠️ 没有待处理的文件");
            return Ok(BatchReport::new(0, Vec::new(), Vec::new()));
        }

        // 任何退出路径都复位进度
        let _reset = ProgressReset(&self.progress);

        backend.connect().await.map_err(|e| {
            warn!("❌ 无法建立推理连接，批次终止: {}", e);
            e
        })?;

        logging::log_batch_start(total, self.item_timeout, self.pacing_delay);
        self.progress.send_replace(BatchProgress { current: 0, total });

        let mut accumulated: Vec<Arc<BatchResult>> = Vec::new();
        let mut failures: Vec<ItemFailure> = Vec::new();

        for (i, item) in items.iter().enumerate() {
            self.progress.send_replace(BatchProgress {
                current: i + 1,
                total,
            });
            logging::log_item_start(i + 1, total, &item.name);

            match self.process_item(backend, item).await {
                Ok(analysis) => {
                    info!(
                        "[文件 {}/{}] ✓ {}: {} ({:.1}%)",
                        i + 1,
                        total,
                        item.name,
                        analysis.predicted_class,
                        analysis.confidence * 100.0
                    );
                    let entry = Arc::new(BatchResult {
                        analysis,
                        filename: item.name.clone(),
                        file_index: i,
                    });
                    // 观察者与报告共享同一份结果，不复制体数据
                    self.results.send_modify(|published| published.push(Arc::clone(&entry)));
                    accumulated.push(entry);
                }
                Err(e) => {
                    warn!(
                        "[文件 {}/{}] ❌ {} 处理失败，跳过: {}",
                        i + 1,
                        total,
                        item.name,
                        logging::truncate_text(&e.to_string(), 200)
                    );
                    failures.push(ItemFailure {
                        file_index: i,
                        filename: item.name.clone(),
                        kind: e.kind(),
                        message: e.user_message(),
                    });
                }
            }

            if i + 1 < total {
                sleep(self.pacing_delay).await;
            }
        }

        let report = BatchReport::new(total, accumulated, failures);
        logging::log_batch_complete(&report);
        Ok(report)
    }

    /// 单个文件：推理与超时赛跑，然后规范化
    async fn process_item<B>(
        &self,
        backend: &B,
        item: &UploadItem,
    ) -> Result<AnalysisResult, InferenceError>
    where
        B: InferenceBackend + ?Sized,
    {
        let raw = timeout(self.item_timeout, backend.predict(item))
            .await
            .map_err(|_| InferenceError::Timeout {
                after: self.item_timeout,
            })??;
        normalizer::normalize(&raw)
    }
}

/// drop 时把进度复位为 `{0, 0}`
struct ProgressReset<'a>(&'a watch::Sender<BatchProgress>);

impl Drop for ProgressReset<'_> {
    fn drop(&mut self) {
        self.0.send_replace(BatchProgress::idle());
    }
}
