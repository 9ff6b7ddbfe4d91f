// 该文件是 TrashX 项目的一部分。
// src/input/v4l_camera.rs - V4L2 摄像头
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

use std::io::ErrorKind;
use std::pin::Pin;

use image::RgbImage;
use tracing::{error, info};
use url::Url;
use v4l::FourCC;
use v4l::buffer::Type;
use v4l::io::mmap::Stream;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

use super::camera::{Camera, CameraError, CameraStream};
use crate::{FromUrl, FromUrlWithScheme};

const DEFAULT_DEVICE: &str = "/dev/video0";
const CAPTURE_WIDTH: u32 = 640;
const CAPTURE_HEIGHT: u32 = 480;
const BUFFER_COUNT: u32 = 4;

/// V4L2 摄像头
#[derive(Debug, Clone)]
pub struct V4lCamera {
  device_path: String,
}

impl Default for V4lCamera {
  fn default() -> Self {
    Self::new(DEFAULT_DEVICE)
  }
}

impl V4lCamera {
  pub fn new(device_path: impl Into<String>) -> Self {
    Self {
      device_path: device_path.into(),
    }
  }

  pub fn device_path(&self) -> &str {
    &self.device_path
  }
}

impl FromUrl for V4lCamera {
  type Error = CameraError;

  /// `v4l:///dev/video1` 指定设备，`v4l:` 使用默认设备
  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(CameraError::Open(format!("不支持的 URI: {}", url)));
    }
    match url.path() {
      "" | "/" => Ok(Self::default()),
      path => Ok(Self::new(path)),
    }
  }
}

impl FromUrlWithScheme for V4lCamera {
  const SCHEME: &'static str = "v4l";
}

fn open_error(path: &str, err: std::io::Error) -> CameraError {
  match err.kind() {
    ErrorKind::NotFound => CameraError::NoDevice,
    ErrorKind::PermissionDenied => CameraError::PermissionDenied(path.to_string()),
    _ => CameraError::Open(format!("{}: {}", path, err)),
  }
}

impl Camera for V4lCamera {
  type Stream = V4lStream;

  fn open(&self) -> Result<V4lStream, CameraError> {
    let path = self.device_path.as_str();
    let device = Box::pin(Device::with_path(path).map_err(|e| open_error(path, e))?);

    // 设置视频格式
    let mut format = device.format().map_err(|e| open_error(path, e))?;
    format.width = CAPTURE_WIDTH;
    format.height = CAPTURE_HEIGHT;
    format.fourcc = FourCC::new(b"YUYV");
    let format = device.set_format(&format).map_err(|e| open_error(path, e))?;

    let mut source = V4lStream {
      device,
      stream: None,
      width: format.width,
      height: format.height,
    };

    // SAFETY: device 被 Pin<Box> 固定在堆上不会移动；stream 与 device 存放在同一结构体中，
    // 并在 Drop 中先于 device 释放
    let device_ref: &Device = &source.device;
    let stream = unsafe {
      let device_static: &'static Device = std::mem::transmute(device_ref);
      Stream::with_buffers(device_static, Type::VideoCapture, BUFFER_COUNT)
        .map_err(|e| open_error(path, e))?
    };
    source.stream = Some(stream);

    info!(
      "V4L2 设备已打开: {} {}x{}",
      path, source.width, source.height
    );
    Ok(source)
  }
}

/// V4L2 视频流
pub struct V4lStream {
  device: Pin<Box<Device>>,
  stream: Option<Stream<'static>>,
  width: u32,
  height: u32,
}

impl CameraStream for V4lStream {
  fn grab(&mut self) -> Result<RgbImage, CameraError> {
    let stream = self
      .stream
      .as_mut()
      .ok_or_else(|| CameraError::Capture("视频流已停止".to_string()))?;

    let (buffer, _meta) = stream
      .next()
      .map_err(|e| CameraError::Capture(e.to_string()))?;
    let rgb = yuyv_to_rgb(buffer, self.width, self.height);

    RgbImage::from_raw(self.width, self.height, rgb)
      .ok_or_else(|| CameraError::Capture("无法创建 RGB 图像".to_string()))
  }

  fn stop(&mut self) {
    self.stream.take();
  }
}

impl Drop for V4lStream {
  fn drop(&mut self) {
    // 确保 stream 在 device 之前被 drop
    self.stream.take();
  }
}

/// 将 YUYV 格式转换为 RGB
fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Vec<u8> {
  let mut rgb = Vec::with_capacity((width * height * 3) as usize);

  for chunk in yuyv.chunks_exact(4) {
    let y0 = chunk[0] as f32;
    let u = chunk[1] as f32 - 128.0;
    let y1 = chunk[2] as f32;
    let v = chunk[3] as f32 - 128.0;

    for y in [y0, y1] {
      let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
      let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
      let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
      rgb.extend_from_slice(&[r, g, b]);
    }
  }

  rgb.resize((width * height * 3) as usize, 0);
  rgb
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn neutral_chroma_is_gray() {
    let rgb = yuyv_to_rgb(&[100, 128, 200, 128], 2, 1);
    assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
  }

  #[test]
  fn short_buffer_is_padded() {
    let rgb = yuyv_to_rgb(&[50, 128, 50, 128], 2, 2);
    assert_eq!(rgb.len(), 12);
    assert_eq!(&rgb[6..], &[0; 6]);
  }

  #[test]
  fn device_from_url() {
    let camera = V4lCamera::from_url(&Url::parse("v4l:///dev/video2").unwrap()).unwrap();
    assert_eq!(camera.device_path(), "/dev/video2");

    let camera = V4lCamera::from_url(&Url::parse("v4l:").unwrap()).unwrap();
    assert_eq!(camera.device_path(), DEFAULT_DEVICE);

    assert!(V4lCamera::from_url(&Url::parse("camera:").unwrap()).is_err());
  }
}
