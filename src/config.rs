// 该文件是 TrashX 项目的一部分。
// src/config.rs - 仪表盘配置
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

use std::path::PathBuf;
use std::time::Duration;

/// 模拟推理的网络延迟
pub const PREDICT_DELAY: Duration = Duration::from_millis(1500);
/// 模拟洞察生成的网络延迟
pub const INSIGHT_DELAY: Duration = Duration::from_millis(1000);
/// 摄像头自动对焦/曝光稳定时间
pub const CAMERA_SETTLE_DELAY: Duration = Duration::from_millis(500);

/// 仪表盘配置
#[derive(Debug, Clone)]
pub struct DashboardConfig {
  /// 推理桩延迟
  pub predict_delay: Duration,
  /// 洞察桩延迟
  pub insight_delay: Duration,
  /// 摄像头稳定延迟
  pub camera_settle_delay: Duration,
  /// 标签字体（TTF/OTF），为空时自动查找系统字体，找不到则使用内置点阵字体
  pub font_path: Option<PathBuf>,
  /// 摄像头设备路径
  pub camera_device: Option<String>,
  /// 导出目录
  pub export_dir: PathBuf,
}

impl Default for DashboardConfig {
  fn default() -> Self {
    Self {
      predict_delay: PREDICT_DELAY,
      insight_delay: INSIGHT_DELAY,
      camera_settle_delay: CAMERA_SETTLE_DELAY,
      font_path: None,
      camera_device: None,
      export_dir: PathBuf::from("."),
    }
  }
}

impl DashboardConfig {
  pub fn with_delays(mut self, predict: Duration, insight: Duration) -> Self {
    self.predict_delay = predict;
    self.insight_delay = insight;
    self
  }

  pub fn with_camera_settle_delay(mut self, delay: Duration) -> Self {
    self.camera_settle_delay = delay;
    self
  }

  pub fn with_font_path(mut self, path: Option<PathBuf>) -> Self {
    self.font_path = path;
    self
  }

  pub fn with_camera_device(mut self, device: Option<String>) -> Self {
    self.camera_device = device;
    self
  }

  pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.export_dir = dir.into();
    self
  }
}
