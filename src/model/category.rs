// 该文件是 TrashX 项目的一部分。
// src/model/category.rs - 垃圾类别划分与汇总
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

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Detection, InferenceResult};

const RECYCLE_KEYWORDS: &[&str] = &["plastic", "bottle"];
const COMPOST_KEYWORDS: &[&str] = &["banana", "peel", "food"];
const TRASH_KEYWORDS: &[&str] = &["trash"];

// 汇总面板中缺少对应检测时显示的默认百分比
const DEFAULT_TRASH_SCORE: u32 = 97;
const DEFAULT_RECYCLE_SCORE: u32 = 98;
const DEFAULT_COMPOST_SCORE: u32 = 92;

/// 垃圾类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteCategory {
  Trash,
  Recycle,
  Compost,
}

impl WasteCategory {
  pub const ALL: [WasteCategory; 3] = [
    WasteCategory::Trash,
    WasteCategory::Recycle,
    WasteCategory::Compost,
  ];

  /// 按类名关键字归类，可回收优先于可堆肥，其余为其他垃圾
  pub fn classify(class: &str) -> Self {
    let class = class.to_lowercase();
    if contains_any(&class, RECYCLE_KEYWORDS) {
      WasteCategory::Recycle
    } else if contains_any(&class, COMPOST_KEYWORDS) {
      WasteCategory::Compost
    } else {
      WasteCategory::Trash
    }
  }

  /// 绘制颜色
  pub fn color(&self) -> [u8; 3] {
    match self {
      WasteCategory::Recycle => [0x3B, 0x82, 0xF6], // #3B82F6 蓝色
      WasteCategory::Compost => [0x10, 0xB9, 0x81], // #10B981 绿色
      WasteCategory::Trash => [0xFF, 0x00, 0x00],   // #FF0000 红色
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      WasteCategory::Trash => "trash",
      WasteCategory::Recycle => "recycle",
      WasteCategory::Compost => "compost",
    }
  }
}

impl std::fmt::Display for WasteCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for WasteCategory {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "trash" => Ok(WasteCategory::Trash),
      "recycle" => Ok(WasteCategory::Recycle),
      "compost" => Ok(WasteCategory::Compost),
      other => Err(format!("未知的垃圾类别: {}", other)),
    }
  }
}

fn contains_any(class: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|k| class.contains(k))
}

/// 各类别的汇总置信度（百分比）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryScores {
  pub trash: u32,
  pub recycle: u32,
  pub compost: u32,
}

impl CategoryScores {
  /// 每个类别取第一个类名包含关键字（区分大小写）的检测；没有匹配或百分比为 0 时使用默认值
  pub fn from_result(result: &InferenceResult) -> Self {
    Self {
      trash: first_score(result, TRASH_KEYWORDS).unwrap_or(DEFAULT_TRASH_SCORE),
      recycle: first_score(result, RECYCLE_KEYWORDS).unwrap_or(DEFAULT_RECYCLE_SCORE),
      compost: first_score(result, COMPOST_KEYWORDS).unwrap_or(DEFAULT_COMPOST_SCORE),
    }
  }

  pub fn get(&self, category: WasteCategory) -> u32 {
    match category {
      WasteCategory::Trash => self.trash,
      WasteCategory::Recycle => self.recycle,
      WasteCategory::Compost => self.compost,
    }
  }
}

fn first_score(result: &InferenceResult, keywords: &[&str]) -> Option<u32> {
  result
    .predictions
    .iter()
    .find(|d| contains_any(&d.class, keywords))
    .map(Detection::percent)
    .filter(|p| *p > 0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn recycle_takes_precedence() {
    assert_eq!(WasteCategory::classify("plastic_bottle"), WasteCategory::Recycle);
    assert_eq!(WasteCategory::classify("plastic_food_tray"), WasteCategory::Recycle);
    assert_eq!(WasteCategory::classify("Banana_Peel"), WasteCategory::Compost);
    assert_eq!(WasteCategory::classify("food_scraps"), WasteCategory::Compost);
    assert_eq!(WasteCategory::classify("paper"), WasteCategory::Trash);
  }

  #[test]
  fn colors_match_categories() {
    assert_eq!(WasteCategory::Recycle.color(), [59, 130, 246]);
    assert_eq!(WasteCategory::Compost.color(), [16, 185, 129]);
    assert_eq!(WasteCategory::Trash.color(), [255, 0, 0]);
  }

  #[test]
  fn parses_category_names() {
    assert_eq!("Compost".parse::<WasteCategory>(), Ok(WasteCategory::Compost));
    assert!("glass".parse::<WasteCategory>().is_err());
  }

  #[test]
  fn scores_fall_back_to_defaults() {
    let result = InferenceResult::new(vec![
      Detection::new("plastic_bottle", 0.97, [0.0; 4]),
      Detection::new("banana_peel", 0.92, [0.0; 4]),
      Detection::new("paper", 0.98, [0.0; 4]),
    ]);
    let scores = CategoryScores::from_result(&result);
    assert_eq!(scores.recycle, 97);
    assert_eq!(scores.compost, 92);
    // 没有 "trash" 关键字的检测
    assert_eq!(scores.trash, 97);

    let zero = InferenceResult::new(vec![Detection::new("trash_bag", 0.0, [0.0; 4])]);
    assert_eq!(CategoryScores::from_result(&zero).trash, 97);

    let bag = InferenceResult::new(vec![Detection::new("trash_bag", 0.41, [0.0; 4])]);
    assert_eq!(CategoryScores::from_result(&bag).get(WasteCategory::Trash), 41);
  }

  #[test]
  fn score_keywords_are_case_sensitive() {
    let result = InferenceResult::new(vec![
      Detection::new("Trash_Bag", 0.41, [0.0; 4]),
      Detection::new("Plastic_Cup", 0.55, [0.0; 4]),
    ]);
    let scores = CategoryScores::from_result(&result);
    assert_eq!(scores.trash, 97);
    assert_eq!(scores.recycle, 98);
    // 颜色归类不区分大小写
    assert_eq!(result.predictions[1].category(), WasteCategory::Recycle);
  }
}
