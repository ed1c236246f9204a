//! 单文件提交流程 - 流程层
//!
//! 状态机：`Idle → Submitting → {Succeeded, Idle}`
//!
//! 1. 进入 Submitting 时清空上一次结果
//! 2. 成功：保存规范化后的结果
//! 3. 失败：分类错误、生成提示，回到 Idle

use tracing::{error, info};

use crate::clients::InferenceBackend;
use crate::models::{AnalysisResult, UploadItem};
use crate::services::normalizer;
use crate::utils::logging;
use crate::workflow::failure::{FlowError, FlowFailure};

/// 单文件流程状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleState {
    /// 空闲（初始状态，或失败之后）
    Idle,
    /// 请求进行中
    Submitting,
    /// 已得到可展示的结果
    Succeeded,
}

/// 单文件提交流程
pub struct SingleFlow {
    selected: Option<UploadItem>,
    state: SingleState,
    result: Option<AnalysisResult>,
    last_failure: Option<FlowFailure>,
}

impl SingleFlow {
    pub fn new() -> Self {
        Self {
            selected: None,
            state: SingleState::Idle,
            result: None,
            last_failure: None,
        }
    }

    /// 选择要分析的文件
    pub fn select(&mut self, item: UploadItem) {
        self.selected = Some(item);
    }

    pub fn selected(&self) -> Option<&UploadItem> {
        self.selected.as_ref()
    }

    pub fn state(&self) -> SingleState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SingleState::Submitting)
    }

    /// 当前可展示的结果
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn last_failure(&self) -> Option<&FlowFailure> {
        self.last_failure.as_ref()
    }

    /// 提交已选择的文件
    pub async fn submit<B>(&mut self, backend: &B) -> Result<&AnalysisResult, FlowError>
    where
        B: InferenceBackend + ?Sized,
    {
        let Some(item) = self.selected.as_ref() else {
            return Err(FlowError::NothingSelected);
        };

        self.state = SingleState::Submitting;
        self.result = None;
        self.last_failure = None;
        info!("{} 📤 正在提交分析...", item);

        match analyze(backend, item).await {
            Ok(result) => {
                info!(
                    "{} ✓ 分析完成: {} ({:.1}%)",
                    item,
                    result.predicted_class,
                    result.confidence * 100.0
                );
                self.state = SingleState::Succeeded;
                Ok(&*self.result.insert(result))
            }
            Err(failure) => {
                error!(
                    "{} ❌ 分析失败: {} ({})",
                    item,
                    failure,
                    logging::truncate_text(&failure.detail, 200)
                );
                self.state = SingleState::Idle;
                self.last_failure = Some(failure.clone());
                Err(FlowError::Failed(failure))
            }
        }
    }
}

impl Default for SingleFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// 单次推理 + 规范化
///
/// 对比流程的每一侧也复用这一步
pub async fn analyze<B>(backend: &B, item: &UploadItem) -> Result<AnalysisResult, FlowFailure>
where
    B: InferenceBackend + ?Sized,
{
    let raw = backend.predict(item).await.map_err(FlowFailure::from)?;
    normalizer::normalize(&raw).map_err(FlowFailure::from)
}
