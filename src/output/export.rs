// 该文件是 TrashX 项目的一部分。
// src/output/export.rs - 结果导出
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

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{InferenceResult, InsightReport};
use crate::session::SessionState;

pub const EXPORT_MIME_TYPE: &str = "application/json";

const IMAGE_INCLUDED: &str = "Image data included";
const NO_IMAGE: &str = "No image";

#[derive(Error, Debug)]
pub enum ExportError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 序列化错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 导出文档，图像只记录是否存在，不包含像素数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
  pub timestamp: String,
  pub image: String,
  pub prediction: InferenceResult,
  pub insights: Option<InsightReport>,
}

impl ExportDocument {
  /// 没有推理结果时不能导出
  pub fn from_state(state: &SessionState, now: DateTime<Utc>) -> Option<Self> {
    let prediction = state.prediction()?;
    Some(Self {
      timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
      image: if state.image().is_some() {
        IMAGE_INCLUDED
      } else {
        NO_IMAGE
      }
      .to_string(),
      prediction: prediction.clone(),
      insights: state.insight().cloned(),
    })
  }
}

/// 已写出的导出文件
#[derive(Debug, Clone)]
pub struct ExportedDocument {
  pub file_name: String,
  pub path: PathBuf,
  pub mime_type: &'static str,
  pub document: ExportDocument,
}

/// 结果导出器，把文档写到指定目录
#[derive(Debug, Clone)]
pub struct Exporter {
  directory: PathBuf,
}

impl Exporter {
  pub fn new(directory: impl Into<PathBuf>) -> Self {
    Self {
      directory: directory.into(),
    }
  }

  pub fn file_name(now: DateTime<Utc>) -> String {
    format!("trashx-result-{}.json", now.timestamp_millis())
  }

  pub fn export(&self, state: &SessionState) -> Result<Option<ExportedDocument>, ExportError> {
    self.export_at(state, Utc::now())
  }

  pub fn export_at(
    &self,
    state: &SessionState,
    now: DateTime<Utc>,
  ) -> Result<Option<ExportedDocument>, ExportError> {
    let Some(document) = ExportDocument::from_state(state, now) else {
      debug!("没有推理结果，跳过导出");
      return Ok(None);
    };

    std::fs::create_dir_all(&self.directory)?;
    let file_name = Self::file_name(now);
    let path = self.directory.join(&file_name);
    std::fs::write(&path, serde_json::to_string_pretty(&document)?)?;
    info!("结果已导出: {}", path.display());

    Ok(Some(ExportedDocument {
      file_name,
      path,
      mime_type: EXPORT_MIME_TYPE,
      document,
    }))
  }
}
