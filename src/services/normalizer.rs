//! 结果规范化服务 - 业务能力层
//!
//! 只负责把推理服务的原始数据槽转换成 `AnalysisResult`，不做任何数值修正

use crate::error::InferenceError;
use crate::models::{AnalysisResult, Prediction, VolumePair};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// 规范化原始响应
///
/// 支持两种形状：
/// - 当前形状：包含 `predictions`、`predicted_class`、`confidence`，可选 `scan_data` / `heatmap_data`
/// - 旧形状：`[[label, probability], ...]`，预测类别取概率最大者
pub fn normalize(raw: &Value) -> Result<AnalysisResult, InferenceError> {
    match raw {
        Value::Object(obj) => normalize_structured(obj),
        Value::Array(pairs) => normalize_legacy(pairs),
        other => Err(InferenceError::malformed(format!(
            "无法识别的响应形状: {}",
            type_name(other)
        ))),
    }
}

fn normalize_structured(obj: &Map<String, Value>) -> Result<AnalysisResult, InferenceError> {
    let predictions = match obj.get("predictions") {
        Some(Value::Array(pairs)) => parse_pairs(pairs)?,
        Some(Value::Object(map)) => parse_probability_map(map)?,
        Some(other) => {
            return Err(InferenceError::malformed(format!(
                "predictions 类型错误: {}",
                type_name(other)
            )))
        }
        None => return Err(InferenceError::malformed("缺少 predictions 字段")),
    };

    let predicted_class = obj
        .get("predicted_class")
        .and_then(Value::as_str)
        .ok_or_else(|| InferenceError::malformed("缺少 predicted_class 字段"))?
        .to_string();

    if !predictions.iter().any(|p| p.label == predicted_class) {
        return Err(InferenceError::malformed(format!(
            "predicted_class '{}' 不在预测标签中",
            predicted_class
        )));
    }

    let confidence = obj
        .get("confidence")
        .and_then(Value::as_f64)
        .ok_or_else(|| InferenceError::malformed("缺少 confidence 字段或不是数字"))?;

    let volumes = parse_volumes(obj)?;

    Ok(AnalysisResult {
        predictions,
        predicted_class,
        confidence,
        volumes,
    })
}

fn normalize_legacy(pairs: &[Value]) -> Result<AnalysisResult, InferenceError> {
    let predictions = parse_pairs(pairs)?;

    // 平局时保留第一个
    let top = predictions
        .iter()
        .fold(None::<&Prediction>, |best, p| match best {
            Some(b) if b.probability >= p.probability => Some(b),
            _ => Some(p),
        })
        .ok_or_else(|| InferenceError::malformed("预测列表为空"))?;
    let (predicted_class, confidence) = (top.label.clone(), top.probability);

    Ok(AnalysisResult {
        predictions,
        predicted_class,
        confidence,
        volumes: None,
    })
}

/// 解析 `[label, probability]` 列表
fn parse_pairs(pairs: &[Value]) -> Result<Vec<Prediction>, InferenceError> {
    let mut predictions = Vec::with_capacity(pairs.len());

    for (i, pair) in pairs.iter().enumerate() {
        let (label, probability) = match pair.as_array().map(Vec::as_slice) {
            Some([label, probability]) => (label.as_str(), probability.as_f64()),
            _ => (None, None),
        };
        match (label, probability) {
            (Some(label), Some(probability)) => {
                predictions.push(Prediction::new(label, probability))
            }
            _ => {
                return Err(InferenceError::malformed(format!(
                    "第 {} 个预测项不是 [label, probability]",
                    i + 1
                )))
            }
        }
    }

    check_labels(predictions)
}

/// 解析 `{label: probability}` 映射
fn parse_probability_map(map: &Map<String, Value>) -> Result<Vec<Prediction>, InferenceError> {
    let predictions = map
        .iter()
        .map(|(label, probability)| {
            probability
                .as_f64()
                .map(|p| Prediction::new(label.as_str(), p))
                .ok_or_else(|| {
                    InferenceError::malformed(format!("标签 '{}' 的概率不是数字", label))
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    check_labels(predictions)
}

fn check_labels(predictions: Vec<Prediction>) -> Result<Vec<Prediction>, InferenceError> {
    if predictions.is_empty() {
        return Err(InferenceError::malformed("预测列表为空"));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = predictions.iter().find(|p| !seen.insert(p.label.as_str())) {
        return Err(InferenceError::malformed(format!("标签重复: {}", dup.label)));
    }

    Ok(predictions)
}

fn parse_volumes(obj: &Map<String, Value>) -> Result<Option<VolumePair>, InferenceError> {
    let scan = non_null(obj.get("scan_data"));
    let heatmap = non_null(obj.get("heatmap_data"));

    match (scan, heatmap) {
        (None, None) => Ok(None),
        (Some(scan), Some(heatmap)) => Ok(Some(VolumePair {
            scan: decode_volume("scan_data", scan)?,
            heatmap: decode_volume("heatmap_data", heatmap)?,
        })),
        _ => Err(InferenceError::malformed(
            "scan_data 与 heatmap_data 必须同时存在",
        )),
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn decode_volume(field: &str, value: &Value) -> Result<Vec<u8>, InferenceError> {
    let encoded = value
        .as_str()
        .ok_or_else(|| InferenceError::malformed(format!("{} 不是字符串", field)))?;

    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| InferenceError::malformed(format!("{} base64 解码失败: {}", field, e)))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
