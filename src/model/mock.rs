// 该文件是 TrashX 项目的一部分。
// src/model/mock.rs - 模拟推理与洞察服务
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

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::info;

use super::{
  Detection, Explainer, InferenceError, InferenceResult, InsightError, InsightReport, Predictor,
};
use crate::config::{INSIGHT_DELAY, PREDICT_DELAY};
use crate::handle::ImageHandle;

/// 模拟 YOLO 推理服务：固定延迟后返回固定的三个检测
#[derive(Debug, Clone)]
pub struct MockPredictor {
  delay: Duration,
}

impl Default for MockPredictor {
  fn default() -> Self {
    Self::new(PREDICT_DELAY)
  }
}

impl MockPredictor {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }

  pub fn detections() -> Vec<Detection> {
    vec![
      Detection::new("plastic_bottle", 0.97, [120.0, 80.0, 200.0, 300.0]),
      Detection::new("banana_peel", 0.92, [350.0, 150.0, 150.0, 200.0]),
      Detection::new("paper", 0.98, [550.0, 200.0, 100.0, 150.0]),
    ]
  }

  fn raw_response() -> Map<String, Value> {
    let mut raw = Map::new();
    raw.insert("model".to_string(), Value::from("yolov8"));
    raw.insert("version".to_string(), Value::from("1.0"));
    raw.insert(
      "timestamp".to_string(),
      Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    raw.insert("inference_time".to_string(), Value::from("0.23s"));
    raw
  }
}

impl Predictor for MockPredictor {
  async fn predict(&self, image: &ImageHandle) -> Result<InferenceResult, InferenceError> {
    info!("模拟推理开始: 图像 {} ({})", image.tag(), image.mime_type());
    tokio::time::sleep(self.delay).await;
    let result = InferenceResult::new(Self::detections()).with_raw_response(Self::raw_response());
    info!("模拟推理完成: {} 个检测", result.len());
    Ok(result)
  }
}

/// 模拟洞察生成服务：固定延迟后返回固定的报告
#[derive(Debug, Clone)]
pub struct MockInsight {
  delay: Duration,
}

impl Default for MockInsight {
  fn default() -> Self {
    Self::new(INSIGHT_DELAY)
  }
}

impl MockInsight {
  pub fn new(delay: Duration) -> Self {
    Self { delay }
  }

  pub fn report() -> InsightReport {
    InsightReport {
      item_name: "Mixed Waste (Plastic Bottle, Banana Peel, Paper)".to_string(),
      description:
        "Your image contains multiple items that require different disposal methods.".to_string(),
      carbon_footprint: "The plastic bottle has a high carbon footprint of approximately 82g CO2e \
                         per bottle. The banana peel and paper have lower footprints but still \
                         contribute to waste."
        .to_string(),
      disposal_advice: [
        "Plastic bottle: Recycle (rinse first)",
        "Banana peel: Compost",
        "Paper: Recycle or compost depending on cleanliness",
      ]
      .join("\n"),
      sustainable_alternatives: vec![
        "Use a reusable water bottle instead of single-use plastic".to_string(),
        "Consider a home composting system for food waste".to_string(),
        "Opt for digital documents when possible to reduce paper usage".to_string(),
      ],
    }
  }
}

impl Explainer for MockInsight {
  async fn explain(&self, result: &InferenceResult) -> Result<InsightReport, InsightError> {
    info!("模拟洞察生成开始: 基于 {} 个检测", result.len());
    tokio::time::sleep(self.delay).await;
    Ok(Self::report())
  }
}
