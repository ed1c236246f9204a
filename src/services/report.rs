//! 结果报告服务 - 业务能力层
//!
//! 负责把分析结果渲染成文本，以及写出批处理 JSON 报告

use crate::error::{AppError, AppResult};
use crate::models::{AnalysisResult, BatchReport};
use std::path::Path;
use tracing::debug;

const BAR_WIDTH: usize = 20;

/// 渲染单个结果的概率条
pub fn render_result(result: &AnalysisResult) -> String {
    let label_width = result
        .predictions
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut lines = vec![format!(
        "Classification Results: {} ({}%)",
        result.predicted_class,
        (result.confidence * 100.0).round()
    )];

    for prediction in &result.predictions {
        let percent = result.percent_of(&prediction.label);
        let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
        lines.push(format!(
            "{:<width$} [{}{}] {:>3}%",
            prediction.label,
            "█".repeat(filled),
            " ".repeat(BAR_WIDTH - filled),
            percent,
            width = label_width
        ));
    }

    lines.join("\n")
}

/// 写出批处理报告（不包含体数据）
pub fn write_batch_report(path: &Path, report: &BatchReport) -> AppResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
    debug!("批处理报告已写入: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{BatchResult, ItemFailure, Prediction};

    fn result() -> AnalysisResult {
        AnalysisResult {
            predictions: vec![Prediction::new("Normal", 0.2), Prediction::new("Aneurysm", 0.8)],
            predicted_class: "Aneurysm".to_string(),
            confidence: 0.8,
            volumes: None,
        }
    }

    #[test]
    fn bars_follow_percentages() {
        let text = render_result(&result());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Classification Results: Aneurysm (80%)");
        assert_eq!(lines[1], format!("Normal   [{}{}]  20%", "█".repeat(4), " ".repeat(16)));
        assert_eq!(lines[2], format!("Aneurysm [{}{}]  80%", "█".repeat(16), " ".repeat(4)));
    }

    #[test]
    fn report_is_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = BatchReport::new(
            2,
            vec![std::sync::Arc::new(BatchResult {
                analysis: result(),
                filename: "a.nii".to_string(),
                file_index: 0,
            })],
            vec![ItemFailure {
                file_index: 1,
                filename: "b.nii".to_string(),
                kind: ErrorKind::Timeout,
                message: "timed out".to_string(),
            }],
        );

        write_batch_report(&path, &report).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["results"][0]["filename"], "a.nii");
        assert_eq!(value["results"][0]["predicted_class"], "Aneurysm");
        assert_eq!(value["failures"][0]["kind"], "timeout");
        assert_eq!(value["summary"]["status"], "partial");
    }
}
