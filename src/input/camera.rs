// 该文件是 TrashX 项目的一部分。
// src/input/camera.rs - 摄像头单帧捕获
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

use std::convert::Infallible;
use std::time::Duration;

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CameraError {
  #[error("没有可用的摄像头设备")]
  NoDevice,
  #[error("摄像头访问被拒绝: {0}")]
  PermissionDenied(String),
  #[error("无法打开摄像头: {0}")]
  Open(String),
  #[error("无法捕获帧: {0}")]
  Capture(String),
}

/// 摄像头设备
pub trait Camera {
  type Stream: CameraStream;

  /// 请求设备并开始视频流
  fn open(&self) -> Result<Self::Stream, CameraError>;
}

/// 已打开的视频流
pub trait CameraStream {
  fn grab(&mut self) -> Result<RgbImage, CameraError>;

  /// 停止所有轨道并释放设备，可重复调用
  fn stop(&mut self);
}

/// 离开作用域时停止视频流
struct StreamGuard<S: CameraStream> {
  stream: S,
}

impl<S: CameraStream> Drop for StreamGuard<S> {
  fn drop(&mut self) {
    self.stream.stop();
    debug!("摄像头视频流已释放");
  }
}

/// 打开摄像头，等待自动对焦/曝光稳定后捕获一帧
///
/// 无论捕获成功、失败还是 future 被丢弃，视频流都会被停止。
pub async fn capture_frame<C: Camera>(
  camera: &C,
  settle_delay: Duration,
) -> Result<RgbImage, CameraError> {
  let mut guard = StreamGuard {
    stream: camera.open()?,
  };
  info!("摄像头已打开，等待 {:?} 稳定画面", settle_delay);
  tokio::time::sleep(settle_delay).await;

  let frame = guard.stream.grab();
  drop(guard);

  let frame = frame?;
  info!("摄像头捕获完成: {}x{}", frame.width(), frame.height());
  Ok(frame)
}

/// 没有摄像头时使用
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCamera;

impl Camera for NoCamera {
  type Stream = Infallible;

  fn open(&self) -> Result<Self::Stream, CameraError> {
    Err(CameraError::NoDevice)
  }
}

impl CameraStream for Infallible {
  fn grab(&mut self) -> Result<RgbImage, CameraError> {
    match *self {}
  }

  fn stop(&mut self) {
    match *self {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;
  use std::sync::Arc;
  use std::sync::atomic::{AtomicUsize, Ordering};

  struct FakeCamera {
    fail_grab: bool,
    stops: Arc<AtomicUsize>,
  }

  struct FakeStream {
    fail_grab: bool,
    stops: Arc<AtomicUsize>,
  }

  impl Camera for FakeCamera {
    type Stream = FakeStream;

    fn open(&self) -> Result<FakeStream, CameraError> {
      Ok(FakeStream {
        fail_grab: self.fail_grab,
        stops: self.stops.clone(),
      })
    }
  }

  impl CameraStream for FakeStream {
    fn grab(&mut self) -> Result<RgbImage, CameraError> {
      if self.fail_grab {
        Err(CameraError::Capture("sensor timeout".into()))
      } else {
        Ok(RgbImage::from_pixel(4, 3, Rgb([1, 2, 3])))
      }
    }

    fn stop(&mut self) {
      self.stops.fetch_add(1, Ordering::SeqCst);
    }
  }

  #[tokio::test(start_paused = true)]
  async fn stream_released_after_capture() {
    let stops = Arc::new(AtomicUsize::new(0));
    let camera = FakeCamera {
      fail_grab: false,
      stops: stops.clone(),
    };
    let start = tokio::time::Instant::now();
    let frame = capture_frame(&camera, Duration::from_millis(500)).await.unwrap();
    assert!(start.elapsed() >= Duration::from_millis(500));
    assert_eq!(frame.dimensions(), (4, 3));
    assert_eq!(stops.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn stream_released_after_failed_grab() {
    let stops = Arc::new(AtomicUsize::new(0));
    let camera = FakeCamera {
      fail_grab: true,
      stops: stops.clone(),
    };
    let err = capture_frame(&camera, Duration::from_millis(500))
      .await
      .unwrap_err();
    assert!(matches!(err, CameraError::Capture(_)));
    assert_eq!(stops.load(Ordering::SeqCst), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn stream_released_when_capture_is_dropped() {
    let stops = Arc::new(AtomicUsize::new(0));
    let camera = FakeCamera {
      fail_grab: false,
      stops: stops.clone(),
    };
    let capture = capture_frame(&camera, Duration::from_secs(10));
    let timed_out = tokio::time::timeout(Duration::from_millis(100), capture).await;
    assert!(timed_out.is_err());
    assert_eq!(stops.load(Ordering::SeqCst), 1);
  }
}
