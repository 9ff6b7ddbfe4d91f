// 该文件是 TrashX 项目的一部分。
// src/model.rs - 检测结果与推理/洞察服务接口
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::handle::{HandleError, ImageHandle};

pub mod category;
pub mod mock;

pub use self::category::{CategoryScores, WasteCategory};
pub use self::mock::{MockInsight, MockPredictor};

/// 推理服务接口，真实后端实现该 trait 即可替换模拟实现
pub trait Predictor {
  fn predict(
    &self,
    image: &ImageHandle,
  ) -> impl Future<Output = Result<InferenceResult, InferenceError>>;
}

/// 洞察生成服务接口
pub trait Explainer {
  fn explain(
    &self,
    result: &InferenceResult,
  ) -> impl Future<Output = Result<InsightReport, InsightError>>;
}

#[derive(Error, Debug)]
pub enum InferenceError {
  #[error("推理服务不可用: {0}")]
  Unavailable(String),
  #[error("图像错误: {0}")]
  Handle(#[from] HandleError),
}

#[derive(Error, Debug)]
pub enum InsightError {
  #[error("洞察服务不可用: {0}")]
  Unavailable(String),
}

/// 单个检测目标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
  pub class: String,
  pub confidence: f32,
  pub bbox: [f32; 4], // [x, y, width, height]，像素坐标
}

impl Detection {
  pub fn new(class: impl Into<String>, confidence: f32, bbox: [f32; 4]) -> Self {
    Self {
      class: class.into(),
      confidence,
      bbox,
    }
  }

  /// 置信度百分比（四舍五入）
  pub fn percent(&self) -> u32 {
    (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u32
  }

  /// 标签文本，如 `paper (98%)`
  pub fn label(&self) -> String {
    format!("{} ({}%)", self.class, self.percent())
  }

  pub fn category(&self) -> WasteCategory {
    WasteCategory::classify(&self.class)
  }
}

/// 一张图像的推理结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResult {
  pub predictions: Vec<Detection>,
  /// 透传的原始响应元数据，核心逻辑从不解析其内容
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub raw_response: Option<Map<String, Value>>,
}

impl InferenceResult {
  pub fn new(predictions: Vec<Detection>) -> Self {
    Self {
      predictions,
      raw_response: None,
    }
  }

  pub fn with_raw_response(mut self, raw: Map<String, Value>) -> Self {
    self.raw_response = Some(raw);
    self
  }

  pub fn len(&self) -> usize {
    self.predictions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.predictions.is_empty()
  }

  /// 只保留满足条件的检测，原始响应原样保留
  pub fn retain<F>(&self, mut keep: F) -> InferenceResult
  where
    F: FnMut(&Detection) -> bool,
  {
    InferenceResult {
      predictions: self
        .predictions
        .iter()
        .filter(|d| keep(d))
        .cloned()
        .collect(),
      raw_response: self.raw_response.clone(),
    }
  }

  /// 原始 JSON 响应视图
  pub fn to_pretty_json(&self) -> serde_json::Result<String> {
    serde_json::to_string_pretty(self)
  }
}

/// 可持续性洞察报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightReport {
  pub item_name: String,
  pub description: String,
  pub carbon_footprint: String,
  pub disposal_advice: String,
  pub sustainable_alternatives: Vec<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn label_rounds_confidence() {
    let detection = Detection::new("banana_peel", 0.924, [0.0, 0.0, 1.0, 1.0]);
    assert_eq!(detection.percent(), 92);
    assert_eq!(detection.label(), "banana_peel (92%)");
    assert_eq!(Detection::new("x", 0.975, [0.0; 4]).percent(), 98);
  }

  #[test]
  fn serializes_with_wire_names() {
    let mut raw = Map::new();
    raw.insert("model".to_string(), Value::from("yolov8"));
    let result =
      InferenceResult::new(vec![Detection::new("paper", 0.5, [1.0, 2.0, 3.0, 4.0])])
        .with_raw_response(raw);

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["predictions"][0]["class"], "paper");
    assert_eq!(value["predictions"][0]["bbox"][3], 4.0);
    assert_eq!(value["rawResponse"]["model"], "yolov8");

    let without_raw = serde_json::to_value(InferenceResult::new(Vec::new())).unwrap();
    assert!(without_raw.get("rawResponse").is_none());
  }

  #[test]
  fn insight_uses_camel_case() {
    let report = InsightReport {
      item_name: "Bottle".into(),
      description: String::new(),
      carbon_footprint: String::new(),
      disposal_advice: String::new(),
      sustainable_alternatives: vec!["Refill".into()],
    };
    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["itemName"], "Bottle");
    assert_eq!(value["sustainableAlternatives"][0], "Refill");
  }

  #[test]
  fn retain_keeps_raw_response() {
    let result = InferenceResult::new(vec![
      Detection::new("a", 0.1, [0.0; 4]),
      Detection::new("b", 0.9, [0.0; 4]),
    ])
    .with_raw_response(Map::new());
    let kept = result.retain(|d| d.confidence > 0.5);
    assert_eq!(kept.len(), 1);
    assert_eq!(kept.predictions[0].class, "b");
    assert!(kept.raw_response.is_some());
  }
}
