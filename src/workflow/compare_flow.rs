//! 对比流程 - 流程层
//!
//! Scan A 和 Scan B 同时发起请求，两侧互不影响：
//! 一侧失败不会取消或阻塞另一侧，两侧都结束后流程才算完成。
//! 不计算任何合成指标，对比只是并排展示两个独立结果。

use futures::join;
use tracing::{error, info};

use crate::clients::InferenceBackend;
use crate::models::{AnalysisResult, UploadItem};
use crate::workflow::failure::{FlowError, FlowFailure};
use crate::workflow::single_flow::analyze;

/// 对比的一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => write!(f, "Scan A"),
            Side::B => write!(f, "Scan B"),
        }
    }
}

/// 单侧结果
pub type SideOutcome = Result<AnalysisResult, FlowFailure>;

/// 两侧结果
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOutcome {
    pub scan_a: SideOutcome,
    pub scan_b: SideOutcome,
}

impl CompareOutcome {
    pub fn side(&self, side: Side) -> &SideOutcome {
        match side {
            Side::A => &self.scan_a,
            Side::B => &self.scan_b,
        }
    }

    /// 该侧可展示的结果，失败时为 None
    pub fn result(&self, side: Side) -> Option<&AnalysisResult> {
        self.side(side).as_ref().ok()
    }

    pub fn both_succeeded(&self) -> bool {
        self.scan_a.is_ok() && self.scan_b.is_ok()
    }
}

/// 对比流程
#[derive(Default)]
pub struct CompareFlow {
    scan_a: Option<UploadItem>,
    scan_b: Option<UploadItem>,
    loading: bool,
    outcome: Option<CompareOutcome>,
}

impl CompareFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, side: Side, item: UploadItem) {
        match side {
            Side::A => self.scan_a = Some(item),
            Side::B => self.scan_b = Some(item),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn outcome(&self) -> Option<&CompareOutcome> {
        self.outcome.as_ref()
    }

    /// 同时提交两侧，两侧都结束后返回
    pub async fn submit<B>(&mut self, backend: &B) -> Result<&CompareOutcome, FlowError>
    where
        B: InferenceBackend + ?Sized,
    {
        let (Some(scan_a), Some(scan_b)) = (self.scan_a.as_ref(), self.scan_b.as_ref()) else {
            return Err(FlowError::NothingSelected);
        };

        self.loading = true;
        self.outcome = None;
        info!("📤 正在对比分析: {} vs {}", scan_a.name, scan_b.name);

        let (scan_a, scan_b) = join!(
            run_side(backend, Side::A, scan_a),
            run_side(backend, Side::B, scan_b)
        );

        self.loading = false;
        Ok(&*self.outcome.insert(CompareOutcome { scan_a, scan_b }))
    }
}

async fn run_side<B>(backend: &B, side: Side, item: &UploadItem) -> SideOutcome
where
    B: InferenceBackend + ?Sized,
{
    let outcome = analyze(backend, item).await;
    match &outcome {
        Ok(result) => info!(
            "[{}] ✓ {}: {} ({:.1}%)",
            side,
            item.name,
            result.predicted_class,
            result.confidence * 100.0
        ),
        Err(failure) => error!("[{}] ❌ {}: {} ({})", side, item.name, failure, failure.detail),
    }
    outcome
}
