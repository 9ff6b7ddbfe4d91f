// 该文件是 TrashX 项目的一部分。
// tests/common/mod.rs - 集成测试辅助
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

#![allow(dead_code)]

use std::cell::Cell;
use std::io::Cursor;
use std::rc::Rc;

use image::{ImageBuffer, ImageFormat, Rgb, RgbImage};
use tempfile::{NamedTempFile, TempDir};

use trashx::Dashboard;
use trashx::config::{CAMERA_SETTLE_DELAY, INSIGHT_DELAY, PREDICT_DELAY};
use trashx::input::{Camera, CameraError, ImageSourceAdapter, NoCamera};
use trashx::model::{
  Explainer, InferenceError, InferenceResult, InsightError, InsightReport, MockInsight,
  MockPredictor, Predictor,
};
use trashx::output::{Exporter, Renderer};
use trashx::ImageHandle;

/// 100x100 的红色 PNG 测试图像，文件在 drop 时删除
pub fn create_test_image() -> NamedTempFile {
  let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
  let file = tempfile::Builder::new()
    .suffix(".png")
    .tempfile()
    .expect("Failed to create temp image file");
  img
    .save_with_format(file.path(), ImageFormat::Png)
    .expect("Failed to save test image");
  file
}

/// 内存中的 PNG 编码图像
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
  let img = RgbImage::from_pixel(width, height, Rgb([20, 40, 60]));
  let mut bytes = Vec::new();
  img
    .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
    .expect("Failed to encode test image");
  bytes
}

/// 记录调用次数的推理服务
#[derive(Clone, Default)]
pub struct CountingPredictor {
  inner: MockPredictor,
  pub calls: Rc<Cell<usize>>,
}

impl Predictor for CountingPredictor {
  async fn predict(&self, image: &ImageHandle) -> Result<InferenceResult, InferenceError> {
    self.calls.set(self.calls.get() + 1);
    self.inner.predict(image).await
  }
}

pub struct FailingPredictor;

impl Predictor for FailingPredictor {
  async fn predict(&self, _image: &ImageHandle) -> Result<InferenceResult, InferenceError> {
    tokio::time::sleep(PREDICT_DELAY).await;
    Err(InferenceError::Unavailable("connection refused".to_string()))
  }
}

pub struct FailingExplainer;

impl Explainer for FailingExplainer {
  async fn explain(&self, _result: &InferenceResult) -> Result<InsightReport, InsightError> {
    tokio::time::sleep(INSIGHT_DELAY).await;
    Err(InsightError::Unavailable("quota exceeded".to_string()))
  }
}

/// 打开时总是被拒绝的摄像头
pub struct DeniedCamera;

impl Camera for DeniedCamera {
  type Stream = std::convert::Infallible;

  fn open(&self) -> Result<Self::Stream, CameraError> {
    Err(CameraError::PermissionDenied("/dev/video0".to_string()))
  }
}

pub fn create_dashboard_with<P: Predictor, E: Explainer, C: Camera>(
  predictor: P,
  explainer: E,
  camera: C,
) -> (Dashboard<P, E, C>, TempDir) {
  let dir = TempDir::new().expect("Failed to create temp directory");
  let dashboard = Dashboard::new(
    predictor,
    explainer,
    ImageSourceAdapter::new(camera, CAMERA_SETTLE_DELAY),
    Renderer::default(),
    Exporter::new(dir.path()),
  );
  (dashboard, dir)
}

pub fn create_dashboard() -> (Dashboard<MockPredictor, MockInsight>, TempDir) {
  create_dashboard_with(MockPredictor::default(), MockInsight::default(), NoCamera)
}
