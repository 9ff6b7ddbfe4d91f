// 该文件是 TrashX 项目的一部分。
// src/session.rs - 会话状态
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

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::handle::{ImageHandle, ImageTag};
use crate::model::{CategoryScores, Detection, InferenceResult, InsightReport, WasteCategory};

/// 各类别的置信度阈值（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
  pub trash: u8,
  pub recycle: u8,
  pub compost: u8,
}

impl Default for Thresholds {
  fn default() -> Self {
    Self {
      trash: 50,
      recycle: 95,
      compost: 92,
    }
  }
}

impl Thresholds {
  pub fn clamp(value: i64) -> u8 {
    value.clamp(0, 100) as u8
  }

  pub fn get(&self, category: WasteCategory) -> u8 {
    match category {
      WasteCategory::Trash => self.trash,
      WasteCategory::Recycle => self.recycle,
      WasteCategory::Compost => self.compost,
    }
  }

  /// 设置阈值并返回截断到 [0, 100] 之后的值
  pub fn set(&mut self, category: WasteCategory, value: i64) -> u8 {
    let value = Self::clamp(value);
    match category {
      WasteCategory::Trash => self.trash = value,
      WasteCategory::Recycle => self.recycle = value,
      WasteCategory::Compost => self.compost = value,
    }
    value
  }

  /// 检测的百分比置信度不低于其类别阈值时显示
  pub fn admits(&self, detection: &Detection) -> bool {
    detection.percent() >= u32::from(self.get(detection.category()))
  }
}

/// 一次仪表盘会话的不可变快照
///
/// 所有修改都通过返回新快照的转换完成。洞察只在推理结果存在时存在，
/// 推理结果只在图像存在时存在。
#[derive(Debug, Clone, Default)]
pub struct SessionState {
  image: Option<ImageHandle>,
  prediction: Option<Arc<InferenceResult>>,
  insight: Option<Arc<InsightReport>>,
  thresholds: Thresholds,
  busy: bool,
}

impl SessionState {
  pub fn image(&self) -> Option<&ImageHandle> {
    self.image.as_ref()
  }

  pub fn image_tag(&self) -> Option<ImageTag> {
    self.image.as_ref().map(ImageHandle::tag)
  }

  pub fn prediction(&self) -> Option<&InferenceResult> {
    self.prediction.as_deref()
  }

  pub fn insight(&self) -> Option<&InsightReport> {
    self.insight.as_deref()
  }

  pub fn thresholds(&self) -> Thresholds {
    self.thresholds
  }

  pub fn is_busy(&self) -> bool {
    self.busy
  }

  pub fn has_results(&self) -> bool {
    self.prediction.is_some()
  }

  /// 新图像替换旧图像，同时清除推理结果与洞察
  pub fn acquire_image(&self, image: ImageHandle) -> Self {
    Self {
      image: Some(image),
      prediction: None,
      insight: None,
      ..self.clone()
    }
  }

  /// 提交推理结果；结果对应的图像已被替换时返回 `None`
  pub fn receive_inference(&self, tag: ImageTag, result: InferenceResult) -> Option<Self> {
    if self.image_tag() != Some(tag) {
      return None;
    }
    Some(Self {
      prediction: Some(Arc::new(result)),
      insight: None,
      ..self.clone()
    })
  }

  /// 提交洞察；图像已被替换或还没有推理结果时返回 `None`
  pub fn receive_insight(&self, tag: ImageTag, report: InsightReport) -> Option<Self> {
    if self.image_tag() != Some(tag) || self.prediction.is_none() {
      return None;
    }
    Some(Self {
      insight: Some(Arc::new(report)),
      ..self.clone()
    })
  }

  pub fn with_threshold(&self, category: WasteCategory, value: i64) -> Self {
    let mut thresholds = self.thresholds;
    thresholds.set(category, value);
    Self {
      thresholds,
      ..self.clone()
    }
  }

  pub fn with_busy(&self, busy: bool) -> Self {
    Self {
      busy,
      ..self.clone()
    }
  }

  /// 清除图像与结果，保留阈值
  pub fn clear(&self) -> Self {
    Self {
      image: None,
      prediction: None,
      insight: None,
      ..self.clone()
    }
  }

  /// 按阈值过滤后用于显示的推理结果，存储的结果本身不受影响
  pub fn visible_prediction(&self) -> Option<InferenceResult> {
    let thresholds = self.thresholds;
    self
      .prediction()
      .map(|result| result.retain(|d| thresholds.admits(d)))
  }

  pub fn category_scores(&self) -> Option<CategoryScores> {
    self.prediction().map(CategoryScores::from_result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::input::placeholder_image;
  use crate::model::{MockInsight, MockPredictor};

  fn mock_result() -> InferenceResult {
    InferenceResult::new(MockPredictor::detections())
  }

  fn full_state() -> (SessionState, ImageTag) {
    let image = placeholder_image().unwrap();
    let tag = image.tag();
    let state = SessionState::default()
      .acquire_image(image)
      .receive_inference(tag, mock_result())
      .unwrap()
      .receive_insight(tag, MockInsight::report())
      .unwrap();
    (state, tag)
  }

  #[test]
  fn threshold_setters_clamp() {
    let mut thresholds = Thresholds::default();
    assert_eq!(thresholds.set(WasteCategory::Trash, -5), 0);
    assert_eq!(thresholds.set(WasteCategory::Recycle, 150), 100);
    assert_eq!(thresholds.set(WasteCategory::Compost, 40), 40);
    assert_eq!(
      thresholds,
      Thresholds {
        trash: 0,
        recycle: 100,
        compost: 40
      }
    );
  }

  #[test]
  fn acquiring_image_clears_results() {
    let (state, _) = full_state();
    assert!(state.prediction().is_some());
    assert!(state.insight().is_some());

    let state = state.with_threshold(WasteCategory::Trash, 10);
    let next = state.acquire_image(placeholder_image().unwrap());
    assert!(next.prediction().is_none());
    assert!(next.insight().is_none());
    assert_eq!(next.thresholds().trash, 10);

    // 在空状态上重复获取也保持一致
    let again = next.acquire_image(placeholder_image().unwrap());
    assert!(again.prediction().is_none() && again.insight().is_none());
  }

  #[test]
  fn stale_results_are_rejected() {
    let first = placeholder_image().unwrap();
    let stale_tag = first.tag();
    let state = SessionState::default()
      .acquire_image(first)
      .acquire_image(placeholder_image().unwrap());

    assert!(state.receive_inference(stale_tag, mock_result()).is_none());
    assert!(
      SessionState::default()
        .receive_inference(stale_tag, mock_result())
        .is_none()
    );
  }

  #[test]
  fn insight_requires_inference() {
    let image = placeholder_image().unwrap();
    let tag = image.tag();
    let state = SessionState::default().acquire_image(image);
    assert!(state.receive_insight(tag, MockInsight::report()).is_none());
  }

  #[test]
  fn new_inference_drops_previous_insight() {
    let (state, tag) = full_state();
    let state = state.receive_inference(tag, mock_result()).unwrap();
    assert!(state.insight().is_none());
  }

  #[test]
  fn thresholds_filter_only_the_displayed_view() {
    let (state, _) = full_state();
    assert_eq!(state.visible_prediction().unwrap().len(), 3);

    let strict = state.with_threshold(WasteCategory::Compost, 95);
    let visible = strict.visible_prediction().unwrap();
    let classes: Vec<&str> = visible.predictions.iter().map(|d| d.class.as_str()).collect();
    assert_eq!(classes, vec!["plastic_bottle", "paper"]);
    assert_eq!(strict.prediction().unwrap().len(), 3);
  }

  #[test]
  fn clear_keeps_thresholds() {
    let (state, _) = full_state();
    let cleared = state.with_threshold(WasteCategory::Recycle, 70).clear();
    assert!(cleared.image().is_none());
    assert!(!cleared.has_results());
    assert_eq!(cleared.thresholds().recycle, 70);
  }
}
