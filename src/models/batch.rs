//! 批处理数据结构

use crate::error::ErrorKind;
use crate::models::AnalysisResult;
use serde::Serialize;
use std::sync::Arc;

/// 批处理中成功完成的单个文件结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    pub filename: String,
    /// 在提交列表中的位置，失败的文件会留下空缺
    pub file_index: usize,
}

/// 批处理进度
///
/// `current` 为正在处理或刚完成的文件序号（从 1 开始），空闲时为 `{0, 0}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchProgress {
    pub current: usize,
    pub total: usize,
}

impl BatchProgress {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.current == 0 && self.total == 0
    }
}

/// 单个文件的失败记录（不进入结果累积列表）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub file_index: usize,
    pub filename: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// 批处理结束后的提示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchSummary {
    /// 一个都没成功
    NoneProcessed,
    /// 部分成功
    Partial { processed: usize, total: usize },
    /// 全部成功
    Complete,
}

impl BatchSummary {
    pub fn from_counts(processed: usize, total: usize) -> Self {
        if processed == 0 {
            BatchSummary::NoneProcessed
        } else if processed < total {
            BatchSummary::Partial { processed, total }
        } else {
            BatchSummary::Complete
        }
    }

    /// 需要展示给用户的提示，全部成功时没有
    pub fn notice(&self) -> Option<String> {
        match self {
            BatchSummary::NoneProcessed => Some("No files were processed successfully.".to_string()),
            BatchSummary::Partial { processed, total } => {
                Some(format!("Processed {} out of {} files.", processed, total))
            }
            BatchSummary::Complete => None,
        }
    }
}

/// 一次批处理的完整结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    pub total: usize,
    /// 与结果观察者共享
    pub results: Vec<Arc<BatchResult>>,
    pub failures: Vec<ItemFailure>,
    pub summary: BatchSummary,
}

impl BatchReport {
    pub fn new(total: usize, results: Vec<Arc<BatchResult>>, failures: Vec<ItemFailure>) -> Self {
        let summary = BatchSummary::from_counts(results.len(), total);
        Self {
            total,
            results,
            failures,
            summary,
        }
    }

    pub fn processed(&self) -> usize {
        self.results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_policy() {
        assert_eq!(BatchSummary::from_counts(0, 3), BatchSummary::NoneProcessed);
        assert_eq!(
            BatchSummary::from_counts(2, 3).notice().as_deref(),
            Some("Processed 2 out of 3 files.")
        );
        assert_eq!(BatchSummary::from_counts(3, 3), BatchSummary::Complete);
        assert!(BatchSummary::Complete.notice().is_none());
    }

    #[test]
    fn empty_batch_reports_nothing_processed() {
        let report = BatchReport::new(0, Vec::new(), Vec::new());
        assert_eq!(report.summary, BatchSummary::NoneProcessed);
    }

    #[test]
    fn idle_progress() {
        assert!(BatchProgress::idle().is_idle());
        assert!(!BatchProgress { current: 1, total: 3 }.is_idle());
    }
}
