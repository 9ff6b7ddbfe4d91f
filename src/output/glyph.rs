// 该文件是 TrashX 项目的一部分。
// src/output/glyph.rs - 标签字体
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

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, info, warn};

use super::RenderError;

const VECTOR_FONT_SIZE: f32 = 14.0;
const BITMAP_SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 3;
const GLYPH_HEIGHT: u32 = 5;

const SYSTEM_FONT_PATHS: &[&str] = &[
  "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/TTF/DejaVuSans.ttf",
  "/usr/share/fonts/dejavu/DejaVuSans.ttf",
  "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
  "/Library/Fonts/Arial.ttf",
  "/System/Library/Fonts/Supplemental/Arial.ttf",
  "C:\\Windows\\Fonts\\arial.ttf",
];

/// 标签文字的字体：TrueType 字体或内置 3x5 点阵字体
#[derive(Clone)]
pub enum LabelFont {
  Vector { font: FontArc, scale: PxScale },
  Bitmap { scale: u32 },
}

impl std::fmt::Debug for LabelFont {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      LabelFont::Vector { scale, .. } => write!(f, "LabelFont::Vector({}px)", scale.y),
      LabelFont::Bitmap { scale } => write!(f, "LabelFont::Bitmap(x{})", scale),
    }
  }
}

impl Default for LabelFont {
  fn default() -> Self {
    Self::bitmap()
  }
}

impl LabelFont {
  pub fn bitmap() -> Self {
    LabelFont::Bitmap {
      scale: BITMAP_SCALE,
    }
  }

  pub fn from_file(path: &Path) -> Result<Self, RenderError> {
    let data = std::fs::read(path)?;
    let font =
      FontArc::try_from_vec(data).map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
    Ok(LabelFont::Vector {
      font,
      scale: PxScale::from(VECTOR_FONT_SIZE),
    })
  }

  /// 依次尝试指定字体和常见系统字体，都不可用时退回点阵字体
  pub fn load(path: Option<&Path>) -> Self {
    if let Some(path) = path {
      match Self::from_file(path) {
        Ok(font) => {
          info!("已加载标签字体: {}", path.display());
          return font;
        }
        Err(e) => warn!("无法加载标签字体 {}: {}", path.display(), e),
      }
    }

    for candidate in SYSTEM_FONT_PATHS.iter().map(PathBuf::from) {
      if !candidate.exists() {
        continue;
      }
      if let Ok(font) = Self::from_file(&candidate) {
        info!("已加载系统字体: {}", candidate.display());
        return font;
      }
    }

    debug!("未找到可用字体，使用内置点阵字体");
    Self::bitmap()
  }

  /// 测量文本的宽和高
  pub fn measure(&self, text: &str) -> (u32, u32) {
    match self {
      LabelFont::Vector { font, scale } => text_size(*scale, font, text),
      LabelFont::Bitmap { scale } => {
        let advance = (GLYPH_WIDTH + 1) * scale;
        (
          text.chars().count() as u32 * advance,
          GLYPH_HEIGHT * scale,
        )
      }
    }
  }

  /// 以 (x, y) 为左上角绘制文本，超出图像的部分被裁剪
  pub fn draw(&self, image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
    match self {
      LabelFont::Vector { font, scale } => draw_text_mut(image, color, x, y, *scale, font, text),
      LabelFont::Bitmap { scale } => draw_bitmap_text(image, x, y, color, text, *scale),
    }
  }
}

fn draw_bitmap_text(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str, scale: u32) {
  let scale = scale as i32;
  let advance = (GLYPH_WIDTH as i32 + 1) * scale;
  let (width, height) = (image.width() as i32, image.height() as i32);

  for (index, c) in text.chars().enumerate() {
    let origin_x = x + index as i32 * advance;
    for (row, &bits) in glyph(c).iter().enumerate() {
      for col in 0..GLYPH_WIDTH as i32 {
        if (bits >> (GLYPH_WIDTH as i32 - 1 - col)) & 1 == 0 {
          continue;
        }
        for dy in 0..scale {
          for dx in 0..scale {
            let px = origin_x + col * scale + dx;
            let py = y + row as i32 * scale + dy;
            if (0..width).contains(&px) && (0..height).contains(&py) {
              image.put_pixel(px as u32, py as u32, color);
            }
          }
        }
      }
    }
  }
}

// 每行 3 位，高位在左
fn glyph(c: char) -> [u8; 5] {
  match c.to_ascii_uppercase() {
    'A' => [2, 5, 7, 5, 5],
    'B' => [6, 5, 6, 5, 6],
    'C' => [3, 4, 4, 4, 3],
    'D' => [6, 5, 5, 5, 6],
    'E' => [7, 4, 6, 4, 7],
    'F' => [7, 4, 6, 4, 4],
    'G' => [3, 4, 5, 5, 3],
    'H' => [5, 5, 7, 5, 5],
    'I' => [7, 2, 2, 2, 7],
    'J' => [1, 1, 1, 5, 2],
    'K' => [5, 5, 6, 5, 5],
    'L' => [4, 4, 4, 4, 7],
    'M' => [5, 7, 7, 5, 5],
    'N' => [6, 5, 5, 5, 5],
    'O' => [2, 5, 5, 5, 2],
    'P' => [6, 5, 6, 4, 4],
    'Q' => [2, 5, 5, 6, 3],
    'R' => [6, 5, 6, 5, 5],
    'S' => [3, 4, 2, 1, 6],
    'T' => [7, 2, 2, 2, 2],
    'U' => [5, 5, 5, 5, 7],
    'V' => [5, 5, 5, 5, 2],
    'W' => [5, 5, 7, 7, 5],
    'X' => [5, 5, 2, 5, 5],
    'Y' => [5, 5, 2, 2, 2],
    'Z' => [7, 1, 2, 4, 7],
    '0' => [7, 5, 5, 5, 7],
    '1' => [2, 6, 2, 2, 7],
    '2' => [7, 1, 7, 4, 7],
    '3' => [7, 1, 7, 1, 7],
    '4' => [5, 5, 7, 1, 1],
    '5' => [7, 4, 7, 1, 7],
    '6' => [7, 4, 7, 5, 7],
    '7' => [7, 1, 2, 4, 4],
    '8' => [7, 5, 7, 5, 7],
    '9' => [7, 5, 7, 1, 7],
    ' ' => [0, 0, 0, 0, 0],
    '_' => [0, 0, 0, 0, 7],
    '-' => [0, 0, 7, 0, 0],
    '.' => [0, 0, 0, 0, 2],
    ',' => [0, 0, 0, 2, 4],
    ':' => [0, 2, 0, 2, 0],
    '/' => [1, 1, 2, 4, 4],
    '(' => [1, 2, 2, 2, 1],
    ')' => [4, 2, 2, 2, 4],
    '%' => [5, 1, 2, 4, 5],
    _ => [7, 7, 7, 7, 7],
  }
}
