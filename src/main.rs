// 该文件是 TrashX 项目的一部分。
// src/main.rs - 命令行入口
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trashx::{
  Dashboard, DashboardConfig, FromUrl, IgnoreReason, PredictionOutcome,
  input::{Camera, ImageSource},
  model::{MockInsight, MockPredictor, WasteCategory},
  output::save_image,
};

use args::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  info!("输入来源: {}", args.input);
  if let Some(output) = &args.output {
    info!("输出路径: {}", output.display());
  }

  let config = args.config();

  #[cfg(feature = "v4l_camera")]
  let camera = {
    use trashx::{FromUrlWithScheme, input::V4lCamera};
    match &config.camera_device {
      Some(device) => V4lCamera::new(device.clone()),
      None if args.input.scheme() == V4lCamera::SCHEME => {
        V4lCamera::from_url(&args.input).context("无法解析摄像头设备")?
      }
      None => V4lCamera::default(),
    }
  };
  #[cfg(not(feature = "v4l_camera"))]
  let camera = trashx::input::NoCamera;

  run(&args, &config, camera).await
}

async fn run<C: Camera>(args: &Args, config: &DashboardConfig, camera: C) -> Result<()> {
  let dashboard = Dashboard::with_config(
    MockPredictor::new(config.predict_delay),
    MockInsight::new(config.insight_delay),
    camera,
    config,
  );

  for (category, value) in [
    (WasteCategory::Trash, args.trash),
    (WasteCategory::Recycle, args.recycle),
    (WasteCategory::Compost, args.compost),
  ] {
    if let Some(value) = value {
      let applied = dashboard.set_threshold(category, value);
      info!("{} 阈值: {}%", category, applied);
    }
  }

  let source = ImageSource::from_url(&args.input).context("无法解析输入来源")?;
  dashboard
    .acquire_image(source)
    .await
    .context("无法获取输入图像")?;

  info!("开始分析...");
  match dashboard
    .perform_prediction()
    .await
    .context("分析失败")?
  {
    PredictionOutcome::Completed { detections } => info!("分析完成: {} 个检测", detections),
    PredictionOutcome::Discarded => warn!("图像已被替换，结果被丢弃"),
    PredictionOutcome::Ignored(IgnoreReason::NoImage) => warn!("没有图像，跳过分析"),
    PredictionOutcome::Ignored(IgnoreReason::Busy) => warn!("分析进行中，忽略请求"),
  }

  let state = dashboard.snapshot();
  if let Some(scores) = state.category_scores() {
    for category in WasteCategory::ALL {
      println!("{:<8} {:>3}%", category.name(), scores.get(category));
    }
  }
  if let Some(visible) = state.visible_prediction() {
    println!();
    for detection in visible.predictions.iter() {
      println!(
        "  - {} [{}] at ({:.0}, {:.0}, {:.0}x{:.0})",
        detection.label(),
        detection.category(),
        detection.bbox[0],
        detection.bbox[1],
        detection.bbox[2],
        detection.bbox[3]
      );
    }
  }
  if let Some(insight) = state.insight() {
    println!();
    println!("{}", insight.item_name);
    println!("{}", insight.description);
    println!();
    println!("碳足迹: {}", insight.carbon_footprint);
    println!();
    println!("处理建议:");
    for line in insight.disposal_advice.lines() {
      println!("  {}", line);
    }
    println!();
    println!("可持续替代品:");
    for alternative in insight.sustainable_alternatives.iter() {
      println!("  - {}", alternative);
    }
  }
  if args.raw
    && let Some(prediction) = state.prediction()
  {
    println!();
    println!("{}", prediction.to_pretty_json()?);
  }

  if let Some(output) = &args.output
    && let Some(image) = dashboard.render().context("渲染失败")?
  {
    save_image(&image, output).context("无法保存标注图像")?;
  }

  if args.export_dir.is_some()
    && let Some(exported) = dashboard.export().context("导出失败")?
  {
    println!();
    println!("结果已导出: {}", exported.path.display());
  }

  Ok(())
}
