// 该文件是 TrashX 项目的一部分。
// src/args.rs - 命令行参数
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

use clap::Parser;
use url::Url;

use trashx::DashboardConfig;
use trashx::config::{CAMERA_SETTLE_DELAY, INSIGHT_DELAY, PREDICT_DELAY};

/// TrashX 垃圾识别仪表盘
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  /// 支持格式:
  /// - 文件: file:///path/to/waste.jpg
  /// - 内联数据: data:image/png;base64,...
  /// - 占位图: placeholder:
  /// - 摄像头: camera: 或 v4l:
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 标注结果图像的保存路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<PathBuf>,

  /// 结果 JSON 导出目录，不指定时不导出
  #[arg(long, value_name = "DIR")]
  pub export_dir: Option<PathBuf>,

  /// 其他垃圾置信度阈值 (0 - 100)
  #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
  pub trash: Option<i64>,

  /// 可回收物置信度阈值 (0 - 100)
  #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
  pub recycle: Option<i64>,

  /// 厨余垃圾置信度阈值 (0 - 100)
  #[arg(long, value_name = "PERCENT", allow_negative_numbers = true)]
  pub compost: Option<i64>,

  /// 标签字体文件 (TTF/OTF)
  #[arg(long, value_name = "FONT")]
  pub font: Option<PathBuf>,

  /// 摄像头设备路径
  #[arg(long, value_name = "DEVICE")]
  pub camera: Option<String>,

  /// 模拟推理延迟（毫秒）
  #[arg(long, value_name = "MS", default_value_t = PREDICT_DELAY.as_millis() as u64)]
  pub predict_delay_ms: u64,

  /// 模拟洞察生成延迟（毫秒）
  #[arg(long, value_name = "MS", default_value_t = INSIGHT_DELAY.as_millis() as u64)]
  pub insight_delay_ms: u64,

  /// 摄像头稳定延迟（毫秒）
  #[arg(long, value_name = "MS", default_value_t = CAMERA_SETTLE_DELAY.as_millis() as u64)]
  pub settle_delay_ms: u64,

  /// 打印原始 JSON 响应
  #[arg(long)]
  pub raw: bool,
}

impl Args {
  pub fn config(&self) -> DashboardConfig {
    let config = DashboardConfig::default()
      .with_delays(
        Duration::from_millis(self.predict_delay_ms),
        Duration::from_millis(self.insight_delay_ms),
      )
      .with_camera_settle_delay(Duration::from_millis(self.settle_delay_ms))
      .with_font_path(self.font.clone())
      .with_camera_device(self.camera.clone());
    match &self.export_dir {
      Some(dir) => config.with_export_dir(dir.clone()),
      None => config,
    }
  }
}
