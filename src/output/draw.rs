// 该文件是 TrashX 项目的一部分。
// src/output/draw.rs - 检测结果可视化
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

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::{LabelFont, RenderError};
use crate::handle::ImageHandle;
use crate::model::{Detection, InferenceResult};

// 边框与标签常量
const LINE_WIDTH: i32 = 3;
const LABEL_HEIGHT: i32 = 20;
const LABEL_PADDING: i32 = 5;
const LABEL_TEXT_COLOR: [u8; 3] = [255, 255, 255]; // 白色

/// 标注渲染器
#[derive(Debug, Clone, Default)]
pub struct Renderer {
  font: LabelFont,
}

impl Renderer {
  pub fn new(font: LabelFont) -> Self {
    Self { font }
  }

  /// 每次都从句柄解码出新的画布再绘制，相同输入得到逐字节相同的输出；
  /// 没有推理结果时返回原图
  pub fn render(
    &self,
    image: &ImageHandle,
    result: Option<&InferenceResult>,
  ) -> Result<RgbImage, RenderError> {
    let mut surface = image.decode()?;
    if let Some(result) = result {
      self.draw_detections(&mut surface, result);
    }
    Ok(surface)
  }

  pub fn draw_detections(&self, surface: &mut RgbImage, result: &InferenceResult) {
    for detection in result.predictions.iter() {
      self.draw_detection(surface, detection);
    }
  }

  fn draw_detection(&self, surface: &mut RgbImage, detection: &Detection) {
    let color = Rgb(detection.category().color());
    let (surface_w, surface_h) = (i64::from(surface.width()), i64::from(surface.height()));
    // f32 到 i64 的转换是饱和的，NaN 变为 0
    let [x, y, width, height] = detection.bbox.map(|v| v.round() as i64);
    if width <= 0 || height <= 0 {
      return;
    }
    let (right, bottom) = (x.saturating_add(width), y.saturating_add(height));
    if right <= 0 || bottom <= 0 || x >= surface_w || y >= surface_h {
      return;
    }

    // 边框坐标截断到画布外一个线宽以内，不可见的边仍留在画布外
    let margin = i64::from(LINE_WIDTH);
    let left = x.clamp(-margin, surface_w + margin) as i32;
    let top = y.clamp(-margin, surface_h + margin) as i32;
    let box_w = right.clamp(-margin, surface_w + margin) as i32 - left;
    let box_h = bottom.clamp(-margin, surface_h + margin) as i32 - top;

    // 边框以边线为中心向内外各扩展
    let half = LINE_WIDTH / 2;
    for offset in -half..=half {
      let (w, h) = (box_w + 2 * offset, box_h + 2 * offset);
      if w <= 0 || h <= 0 {
        continue;
      }
      let rect = Rect::at(left - offset, top - offset).of_size(w as u32, h as u32);
      draw_hollow_rect_mut(surface, rect, color);
    }

    // 标签背景紧贴边框左上角上方，完全在画布外时不绘制
    let label = detection.label();
    let (text_width, text_height) = self.font.measure(&label);
    let tag_width = text_width + 2 * LABEL_PADDING as u32;
    let tag_y = y - i64::from(LABEL_HEIGHT);
    if x >= surface_w
      || x.saturating_add(i64::from(tag_width)) <= 0
      || tag_y >= surface_h
      || y <= 0
    {
      return;
    }
    let (tag_x, tag_y) = (x as i32, tag_y as i32);
    let tag = Rect::at(tag_x, tag_y).of_size(tag_width, LABEL_HEIGHT as u32);
    draw_filled_rect_mut(surface, tag, color);

    let text_y = tag_y + (LABEL_HEIGHT - text_height as i32).max(0) / 2;
    self.font.draw(
      surface,
      tag_x + LABEL_PADDING,
      text_y,
      Rgb(LABEL_TEXT_COLOR),
      &label,
    );
  }
}
