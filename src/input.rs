// 该文件是 TrashX 项目的一部分。
// src/input.rs - 图像来源适配
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

use std::path::{Path, PathBuf};
use std::time::Duration;

use image::{ImageFormat, Rgb, RgbImage};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use crate::{
  FromUrl,
  config::CAMERA_SETTLE_DELAY,
  handle::{HandleError, ImageHandle},
};

mod camera;
pub use self::camera::{Camera, CameraError, CameraStream, NoCamera, capture_frame};

#[cfg(feature = "v4l_camera")]
mod v4l_camera;
#[cfg(feature = "v4l_camera")]
pub use self::v4l_camera::{V4lCamera, V4lStream};

const PLACEHOLDER_SIZE: u32 = 640;
const PLACEHOLDER_COLOR: [u8; 3] = [0xEA, 0xEA, 0xEA];

#[derive(Error, Debug)]
pub enum InputError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  Handle(#[from] HandleError),
  #[error("摄像头错误: {0}")]
  Camera(#[from] CameraError),
  #[error("不支持的 URI 方案: {0}")]
  UnsupportedScheme(String),
  #[error("无效的文件路径: {0}")]
  InvalidPath(String),
}

/// 图像来源
#[derive(Debug, Clone)]
pub enum ImageSource {
  /// 文件选择器选中的本地文件
  File(PathBuf),
  /// 拖放得到的文件，与 `File` 等价
  Dropped(PathBuf),
  /// 已在内存中的编码图像
  Bytes(Vec<u8>),
  /// 摄像头单帧
  Camera,
  /// 内置占位图
  Placeholder,
  /// `file:`、`data:`、`placeholder:`、`camera:` 或 `v4l:` URL
  Remote(Url),
}

impl FromUrl for ImageSource {
  type Error = InputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    match url.scheme() {
      "file" => url
        .to_file_path()
        .map(ImageSource::File)
        .map_err(|_| InputError::InvalidPath(url.to_string())),
      "data" => Ok(ImageSource::Remote(url.clone())),
      "placeholder" => Ok(ImageSource::Placeholder),
      "camera" | "v4l" => Ok(ImageSource::Camera),
      other => {
        error!("URI scheme mismatch: 不支持 '{}'", other);
        Err(InputError::UnsupportedScheme(other.to_string()))
      }
    }
  }
}

impl ImageSource {
  fn kind(&self) -> &'static str {
    match self {
      ImageSource::File(_) => "文件",
      ImageSource::Dropped(_) => "拖放文件",
      ImageSource::Bytes(_) => "内存数据",
      ImageSource::Camera => "摄像头",
      ImageSource::Placeholder => "占位图",
      ImageSource::Remote(_) => "URL",
    }
  }
}

/// 内置 640x640 浅灰色占位图
pub fn placeholder_image() -> Result<ImageHandle, HandleError> {
  let image = RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Rgb(PLACEHOLDER_COLOR));
  ImageHandle::from_rgb_image(&image, ImageFormat::Png)
}

/// 把各种来源统一成 [`ImageHandle`]
pub struct ImageSourceAdapter<C: Camera = NoCamera> {
  camera: C,
  settle_delay: Duration,
}

impl ImageSourceAdapter<NoCamera> {
  pub fn without_camera() -> Self {
    Self::new(NoCamera, CAMERA_SETTLE_DELAY)
  }
}

impl Default for ImageSourceAdapter<NoCamera> {
  fn default() -> Self {
    Self::without_camera()
  }
}

impl<C: Camera> ImageSourceAdapter<C> {
  pub fn new(camera: C, settle_delay: Duration) -> Self {
    Self {
      camera,
      settle_delay,
    }
  }

  pub async fn acquire(&self, source: ImageSource) -> Result<ImageHandle, InputError> {
    let kind = source.kind();
    let handle = match source {
      ImageSource::File(path) | ImageSource::Dropped(path) => read_image_file(&path).await?,
      ImageSource::Bytes(bytes) => ImageHandle::from_encoded(&bytes)?,
      ImageSource::Camera => self.capture().await?,
      ImageSource::Placeholder => placeholder_image()?,
      ImageSource::Remote(url) => match url.scheme() {
        "file" => {
          let path = url
            .to_file_path()
            .map_err(|_| InputError::InvalidPath(url.to_string()))?;
          read_image_file(&path).await?
        }
        "data" => ImageHandle::from_data_uri(url.as_str())?,
        "placeholder" => placeholder_image()?,
        "camera" | "v4l" => self.capture().await?,
        other => return Err(InputError::UnsupportedScheme(other.to_string())),
      },
    };

    let (width, height) = handle.dimensions();
    info!(
      "已获取图像 {}: 来源 {}, {}x{} {}",
      handle.tag(),
      kind,
      width,
      height,
      handle.mime_type()
    );
    Ok(handle)
  }

  async fn capture(&self) -> Result<ImageHandle, InputError> {
    let frame = capture_frame(&self.camera, self.settle_delay)
      .await
      .inspect_err(|e| error!("无法访问摄像头，请检查权限: {}", e))?;
    Ok(ImageHandle::from_rgb_image(&frame, ImageFormat::Jpeg)?)
  }
}

async fn read_image_file(path: &Path) -> Result<ImageHandle, InputError> {
  let bytes = tokio::fs::read(path).await?;
  Ok(ImageHandle::from_encoded(&bytes)?)
}
