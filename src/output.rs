// 该文件是 TrashX 项目的一部分。
// src/output.rs - 输出定义
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

use std::path::Path;

use image::RgbImage;
use thiserror::Error;
use tracing::info;

use crate::handle::HandleError;

pub mod draw;
pub mod export;
mod glyph;

pub use self::draw::Renderer;
pub use self::export::{EXPORT_MIME_TYPE, ExportDocument, ExportError, ExportedDocument, Exporter};
pub use self::glyph::LabelFont;

#[derive(Error, Debug)]
pub enum RenderError {
  #[error("图像句柄错误: {0}")]
  Handle(#[from] HandleError),
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("字体错误: {0}")]
  Font(String),
}

/// 保存渲染结果，必要时创建父目录
pub fn save_image(image: &RgbImage, path: &Path) -> Result<(), RenderError> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)?;
  }

  image.save(path)?;
  info!("保存图像到文件: {}", path.display());
  Ok(())
}
