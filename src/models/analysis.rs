//! 分析结果数据结构

use serde::Serialize;
use std::collections::BTreeMap;

/// 单个类别的概率
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub probability: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, probability: f64) -> Self {
        Self {
            label: label.into(),
            probability,
        }
    }
}

/// 解码后的扫描体数据和热力图体数据
///
/// 两者要么同时存在，要么同时不存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePair {
    pub scan: Vec<u8>,
    pub heatmap: Vec<u8>,
}

/// 一次推理调用的规范化结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    /// 按后端返回顺序排列，标签唯一
    pub predictions: Vec<Prediction>,
    /// 后端判定的类别，必定出现在 `predictions` 中
    pub predicted_class: String,
    pub confidence: f64,
    #[serde(skip)]
    pub volumes: Option<VolumePair>,
}

impl AnalysisResult {
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.predictions
            .iter()
            .find(|p| p.label == label)
            .map(|p| p.probability)
    }

    /// 进度条宽度（四舍五入的百分比），标签不存在时为 0
    pub fn percent_of(&self, label: &str) -> u32 {
        let probability = self.probability_of(label).unwrap_or(0.0);
        (probability * 100.0).round().max(0.0) as u32
    }

    /// 标签到概率的映射
    pub fn class_probabilities(&self) -> BTreeMap<String, f64> {
        self.predictions
            .iter()
            .map(|p| (p.label.clone(), p.probability))
            .collect()
    }

    pub fn has_volumes(&self) -> bool {
        self.volumes.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aneurysm_result() -> AnalysisResult {
        AnalysisResult {
            predictions: vec![
                Prediction::new("Normal", 0.2),
                Prediction::new("Aneurysm", 0.8),
            ],
            predicted_class: "Aneurysm".to_string(),
            confidence: 0.8,
            volumes: None,
        }
    }

    #[test]
    fn percentages_drive_bar_widths() {
        let result = aneurysm_result();
        assert_eq!(result.percent_of("Aneurysm"), 80);
        assert_eq!(result.percent_of("Normal"), 20);
        assert_eq!(result.percent_of("Other"), 0);
    }

    #[test]
    fn class_probabilities_cover_all_labels() {
        let map = aneurysm_result().class_probabilities();
        assert_eq!(map.len(), 2);
        assert_eq!(map["Normal"], 0.2);
    }
}
