// 该文件是 TrashX 项目的一部分。
// src/handle.rs - 图像句柄定义
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

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use image::{ImageFormat, RgbImage};
use thiserror::Error;

const DATA_URI_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

static NEXT_TAG: AtomicU64 = AtomicU64::new(1);

/// 图像身份标识，每次获取图像都会分配一个新的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageTag(u64);

impl ImageTag {
  fn next() -> Self {
    ImageTag(NEXT_TAG.fetch_add(1, Ordering::Relaxed))
  }
}

impl std::fmt::Display for ImageTag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "#{}", self.0)
  }
}

#[derive(Error, Debug)]
pub enum HandleError {
  #[error("不是 data URI")]
  NotDataUri,
  #[error("data URI 未使用 base64 编码")]
  NotBase64,
  #[error("base64 解码错误: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
}

#[derive(Debug)]
struct Payload {
  mime_type: &'static str,
  data_uri: String,
  width: u32,
  height: u32,
}

/// 图像句柄
///
/// 持有一个自包含的 `data:<mime>;base64,<payload>` URI。克隆只复制引用计数，
/// 身份标识 [`ImageTag`] 随克隆一起保留。
#[derive(Debug, Clone)]
pub struct ImageHandle {
  tag: ImageTag,
  payload: Arc<Payload>,
}

impl ImageHandle {
  /// 从已编码的图像字节（PNG、JPEG 等）创建句柄，字节原样保留
  pub fn from_encoded(bytes: &[u8]) -> Result<Self, HandleError> {
    let format = image::guess_format(bytes)?;
    let decoded = image::load_from_memory_with_format(bytes, format)?;

    let mime_type = format.to_mime_type();
    let data_uri = format!(
      "{}{}{},{}",
      DATA_URI_PREFIX,
      mime_type,
      BASE64_MARKER,
      B64.encode(bytes)
    );

    Ok(ImageHandle {
      tag: ImageTag::next(),
      payload: Arc::new(Payload {
        mime_type,
        data_uri,
        width: decoded.width(),
        height: decoded.height(),
      }),
    })
  }

  /// 将 RGB 图像按指定格式编码后创建句柄
  pub fn from_rgb_image(image: &RgbImage, format: ImageFormat) -> Result<Self, HandleError> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format)?;
    Self::from_encoded(buffer.get_ref())
  }

  /// 解析并重新封装一个 data URI
  pub fn from_data_uri(uri: &str) -> Result<Self, HandleError> {
    let bytes = decode_data_uri(uri)?;
    Self::from_encoded(&bytes)
  }

  pub fn tag(&self) -> ImageTag {
    self.tag
  }

  pub fn data_uri(&self) -> &str {
    &self.payload.data_uri
  }

  pub fn mime_type(&self) -> &'static str {
    self.payload.mime_type
  }

  pub fn dimensions(&self) -> (u32, u32) {
    (self.payload.width, self.payload.height)
  }

  /// 解码为一张全新的 RGB 图像
  pub fn decode(&self) -> Result<RgbImage, HandleError> {
    let bytes = decode_data_uri(&self.payload.data_uri)?;
    Ok(image::load_from_memory(&bytes)?.to_rgb8())
  }
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>, HandleError> {
  let rest = uri
    .strip_prefix(DATA_URI_PREFIX)
    .ok_or(HandleError::NotDataUri)?;
  let (header, payload) = rest.split_once(',').ok_or(HandleError::NotDataUri)?;
  if !header.ends_with(BASE64_MARKER) {
    return Err(HandleError::NotBase64);
  }
  Ok(B64.decode(payload.trim())?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::Rgb;

  fn sample_png() -> Vec<u8> {
    let image = RgbImage::from_fn(8, 4, |x, y| Rgb([x as u8 * 10, y as u8 * 20, 7]));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
  }

  #[test]
  fn png_bytes_become_data_uri() {
    let handle = ImageHandle::from_encoded(&sample_png()).unwrap();
    assert!(handle.data_uri().starts_with("data:image/png;base64,"));
    assert_eq!(handle.mime_type(), "image/png");
    assert_eq!(handle.dimensions(), (8, 4));
  }

  #[test]
  fn decode_restores_pixels() {
    let handle = ImageHandle::from_encoded(&sample_png()).unwrap();
    let image = handle.decode().unwrap();
    assert_eq!(image.dimensions(), (8, 4));
    assert_eq!(image.get_pixel(3, 2), &Rgb([30, 40, 7]));
  }

  #[test]
  fn every_acquisition_gets_a_new_tag() {
    let bytes = sample_png();
    let a = ImageHandle::from_encoded(&bytes).unwrap();
    let b = ImageHandle::from_encoded(&bytes).unwrap();
    assert_ne!(a.tag(), b.tag());
    assert_eq!(a.clone().tag(), a.tag());
  }

  #[test]
  fn data_uri_is_rewrapped_with_fresh_tag() {
    let original = ImageHandle::from_encoded(&sample_png()).unwrap();
    let copy = ImageHandle::from_data_uri(original.data_uri()).unwrap();
    assert_eq!(copy.data_uri(), original.data_uri());
    assert_ne!(copy.tag(), original.tag());
  }

  #[test]
  fn rejects_non_image_bytes() {
    assert!(ImageHandle::from_encoded(b"definitely not an image").is_err());
    assert!(matches!(
      ImageHandle::from_data_uri("data:text/plain,hello"),
      Err(HandleError::NotBase64)
    ));
    assert!(matches!(
      ImageHandle::from_data_uri("https://example.com/a.png"),
      Err(HandleError::NotDataUri)
    ));
  }
}
