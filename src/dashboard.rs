// 该文件是 TrashX 项目的一部分。
// src/dashboard.rs - 仪表盘控制器
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

use image::RgbImage;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::DashboardConfig;
use crate::handle::{ImageHandle, ImageTag};
use crate::input::{Camera, ImageSource, ImageSourceAdapter, InputError, NoCamera};
use crate::model::{
  Explainer, InferenceError, InsightError, MockInsight, MockPredictor, Predictor, WasteCategory,
};
use crate::output::{ExportError, ExportedDocument, Exporter, LabelFont, RenderError, Renderer};
use crate::session::SessionState;

#[derive(Error, Debug)]
pub enum DashboardError {
  #[error("图像获取失败: {0}")]
  Input(#[from] InputError),
  #[error("推理失败: {0}")]
  Inference(#[from] InferenceError),
  #[error("洞察生成失败: {0}")]
  Insight(#[from] InsightError),
  #[error("渲染失败: {0}")]
  Render(#[from] RenderError),
  #[error("导出失败: {0}")]
  Export(#[from] ExportError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
  NoImage,
  Busy,
}

/// 一次预测请求的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionOutcome {
  /// 前置条件不满足，没有发起任何调用
  Ignored(IgnoreReason),
  /// 推理结果和洞察都已提交
  Completed { detections: usize },
  /// 调用期间图像已被替换，结果被丢弃
  Discarded,
}

/// 离开作用域时清除忙碌标志
struct BusyGuard<'a> {
  state: &'a watch::Sender<Arc<SessionState>>,
}

impl Drop for BusyGuard<'_> {
  fn drop(&mut self) {
    self.state.send_if_modified(|state| {
      if !state.is_busy() {
        return false;
      }
      *state = Arc::new(state.with_busy(false));
      true
    });
  }
}

/// 会话的唯一写入者，所有状态转换都经由这里发布
pub struct Dashboard<P: Predictor, E: Explainer, C: Camera = NoCamera> {
  state: watch::Sender<Arc<SessionState>>,
  predictor: P,
  explainer: E,
  input: ImageSourceAdapter<C>,
  renderer: Renderer,
  exporter: Exporter,
}

impl Dashboard<MockPredictor, MockInsight, NoCamera> {
  /// 使用模拟推理与洞察服务、无摄像头的仪表盘
  pub fn mock(config: &DashboardConfig) -> Self {
    Self::with_config(
      MockPredictor::new(config.predict_delay),
      MockInsight::new(config.insight_delay),
      NoCamera,
      config,
    )
  }
}

impl<P: Predictor, E: Explainer, C: Camera> Dashboard<P, E, C> {
  pub fn new(
    predictor: P,
    explainer: E,
    input: ImageSourceAdapter<C>,
    renderer: Renderer,
    exporter: Exporter,
  ) -> Self {
    Self {
      state: watch::Sender::new(Arc::new(SessionState::default())),
      predictor,
      explainer,
      input,
      renderer,
      exporter,
    }
  }

  pub fn with_config(predictor: P, explainer: E, camera: C, config: &DashboardConfig) -> Self {
    Self::new(
      predictor,
      explainer,
      ImageSourceAdapter::new(camera, config.camera_settle_delay),
      Renderer::new(LabelFont::load(config.font_path.as_deref())),
      Exporter::new(config.export_dir.clone()),
    )
  }

  pub fn subscribe(&self) -> watch::Receiver<Arc<SessionState>> {
    self.state.subscribe()
  }

  pub fn snapshot(&self) -> Arc<SessionState> {
    self.state.borrow().clone()
  }

  /// 获取图像并发布到会话；失败时会话保持不变
  pub async fn acquire_image(&self, source: ImageSource) -> Result<ImageTag, DashboardError> {
    let handle = self
      .input
      .acquire(source)
      .await
      .inspect_err(|e| error!("获取图像失败: {}", e))?;
    Ok(self.publish_image(handle))
  }

  /// 发布已有的图像句柄，清除旧的推理结果与洞察
  pub fn publish_image(&self, handle: ImageHandle) -> ImageTag {
    let tag = handle.tag();
    self
      .state
      .send_modify(|state| *state = Arc::new(state.acquire_image(handle)));
    debug!("会话图像已更新: {}", tag);
    tag
  }

  /// 对当前图像推理并自动生成洞察
  ///
  /// 没有图像或正忙时直接返回 `Ignored`，不会发起第二次调用。
  pub async fn perform_prediction(&self) -> Result<PredictionOutcome, DashboardError> {
    let mut claimed = Err(IgnoreReason::NoImage);
    self.state.send_if_modified(|state| {
      let Some(image) = state.image().cloned() else {
        return false;
      };
      if state.is_busy() {
        claimed = Err(IgnoreReason::Busy);
        return false;
      }
      *state = Arc::new(state.with_busy(true));
      claimed = Ok(image);
      true
    });

    let image = match claimed {
      Ok(image) => image,
      Err(reason) => {
        debug!("忽略预测请求: {:?}", reason);
        return Ok(PredictionOutcome::Ignored(reason));
      }
    };
    let _busy = BusyGuard { state: &self.state };
    let tag = image.tag();

    info!("开始推理: 图像 {}", tag);
    let now = std::time::Instant::now();
    let result = self
      .predictor
      .predict(&image)
      .await
      .inspect_err(|e| error!("推理失败: {}", e))?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());

    let detections = result.len();
    if !self.commit(|state| state.receive_inference(tag, result.clone())) {
      warn!("图像 {} 已被替换，丢弃推理结果", tag);
      return Ok(PredictionOutcome::Discarded);
    }

    let now = std::time::Instant::now();
    let report = self
      .explainer
      .explain(&result)
      .await
      .inspect_err(|e| error!("洞察生成失败: {}", e))?;
    info!("洞察生成完成，耗时: {:.2?}", now.elapsed());

    if !self.commit(|state| state.receive_insight(tag, report)) {
      warn!("图像 {} 已被替换，丢弃洞察", tag);
      return Ok(PredictionOutcome::Discarded);
    }

    Ok(PredictionOutcome::Completed { detections })
  }

  /// 设置类别阈值，返回截断后的值
  pub fn set_threshold(&self, category: WasteCategory, value: i64) -> u8 {
    let mut applied = 0;
    self.state.send_modify(|state| {
      let next = state.with_threshold(category, value);
      applied = next.thresholds().get(category);
      *state = Arc::new(next);
    });
    debug!("{} 阈值设为 {}%", category, applied);
    applied
  }

  /// 渲染当前图像与按阈值过滤后的检测；没有图像时返回 `None`
  pub fn render(&self) -> Result<Option<RgbImage>, DashboardError> {
    let state = self.snapshot();
    let Some(image) = state.image() else {
      return Ok(None);
    };
    let visible = state.visible_prediction();
    Ok(Some(self.renderer.render(image, visible.as_ref())?))
  }

  /// 导出当前结果；没有推理结果时返回 `None`
  pub fn export(&self) -> Result<Option<ExportedDocument>, DashboardError> {
    Ok(self.exporter.export(&self.snapshot())?)
  }

  /// 清除图像与结果，保留阈值
  pub fn clear(&self) {
    self
      .state
      .send_modify(|state| *state = Arc::new(state.clear()));
    debug!("会话已清除");
  }

  fn commit<F>(&self, transition: F) -> bool
  where
    F: FnOnce(&SessionState) -> Option<SessionState>,
  {
    self.state.send_if_modified(|state| match transition(&**state) {
      Some(next) => {
        *state = Arc::new(next);
        true
      }
      None => false,
    })
  }
}
