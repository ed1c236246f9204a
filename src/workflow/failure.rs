//! 流程失败信息

use crate::error::{ErrorKind, InferenceError};
use std::fmt;

/// 已分类的失败，供界面展示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFailure {
    pub kind: ErrorKind,
    /// 给用户看的提示
    pub message: String,
    /// 原始错误描述，用于诊断
    pub detail: String,
}

impl From<&InferenceError> for FlowFailure {
    fn from(err: &InferenceError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
            detail: err.to_string(),
        }
    }
}

impl From<InferenceError> for FlowFailure {
    fn from(err: InferenceError) -> Self {
        Self::from(&err)
    }
}

impl fmt::Display for FlowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// 提交流程错误
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    /// 未选择文件
    #[error("未选择要分析的文件")]
    NothingSelected,
    /// 推理失败
    #[error("{0}")]
    Failed(FlowFailure),
}
