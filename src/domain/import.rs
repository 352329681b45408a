// ==========================================
// RAB 估价引擎 - 导入批次与诊断
// ==========================================
// 职责: 描述单个文件的导入结果（原子：整文件成功或整文件跳过）
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 导入文件类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportKind {
    Catalog, // 基础单价目录
    Recipes, // AHSP 分析
    Volumes, // 工程量模板
}

impl fmt::Display for ImportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportKind::Catalog => write!(f, "CATALOG"),
            ImportKind::Recipes => write!(f, "RECIPES"),
            ImportKind::Volumes => write!(f, "VOLUMES"),
        }
    }
}

// ==========================================
// 行跳过原因
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkipReason {
    Blank,        // 空行
    Summary,      // 合计/小计行
    Unrecognized, // 无法识别
    MissingPrice, // 目录行缺价格
    MissingName,  // 缺名称
    MissingVolume, // 工程量缺失或为负
    NegativePrice, // 目录行价格为负
    InvalidWeek,   // 周次超出排程上限
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Blank => write!(f, "BLANK"),
            SkipReason::Summary => write!(f, "SUMMARY"),
            SkipReason::Unrecognized => write!(f, "UNRECOGNIZED"),
            SkipReason::MissingPrice => write!(f, "MISSING_PRICE"),
            SkipReason::MissingName => write!(f, "MISSING_NAME"),
            SkipReason::MissingVolume => write!(f, "MISSING_VOLUME"),
            SkipReason::NegativePrice => write!(f, "NEGATIVE_PRICE"),
            SkipReason::InvalidWeek => write!(f, "INVALID_WEEK"),
        }
    }
}

/// 单行诊断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseDiagnostic {
    pub sheet: String,
    /// 1 起始
    pub row_number: usize,
    pub reason: SkipReason,
}

/// 跳过行统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkipSummary {
    pub blank: usize,
    pub summary: usize,
    pub unrecognized: usize,
    pub missing_price: usize,
    pub missing_name: usize,
    pub missing_volume: usize,
    pub negative_price: usize,
    pub invalid_week: usize,
}

impl SkipSummary {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::Blank => self.blank += 1,
            SkipReason::Summary => self.summary += 1,
            SkipReason::Unrecognized => self.unrecognized += 1,
            SkipReason::MissingPrice => self.missing_price += 1,
            SkipReason::MissingName => self.missing_name += 1,
            SkipReason::MissingVolume => self.missing_volume += 1,
            SkipReason::NegativePrice => self.negative_price += 1,
            SkipReason::InvalidWeek => self.invalid_week += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.blank
            + self.summary
            + self.unrecognized
            + self.missing_price
            + self.missing_name
            + self.missing_volume
            + self.negative_price
            + self.invalid_week
    }

    pub fn absorb(&mut self, other: &SkipSummary) {
        self.blank += other.blank;
        self.summary += other.summary;
        self.unrecognized += other.unrecognized;
        self.missing_price += other.missing_price;
        self.missing_name += other.missing_name;
        self.missing_volume += other.missing_volume;
        self.negative_price += other.negative_price;
        self.invalid_week += other.invalid_week;
    }
}

// ==========================================
// ImportBatch - 导入批次
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,
    pub kind: ImportKind,
    pub file_name: Option<String>,
    /// 参与解析的工作表
    pub sheets: Vec<String>,
    /// 被忽略的工作表（汇总表等）
    pub skipped_sheets: Vec<String>,
    pub total_rows: usize,
    /// 产出的实体数（目录条目 / 分析 / 工程量行）
    pub accepted: usize,
    /// 分析导入时的组成明细数
    pub components: usize,
    pub skipped: SkipSummary,
    pub imported_at: DateTime<Utc>,
    pub elapsed_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_summary_totals() {
        let mut s = SkipSummary::default();
        s.record(SkipReason::Blank);
        s.record(SkipReason::Summary);
        s.record(SkipReason::Unrecognized);
        let mut t = SkipSummary::default();
        t.record(SkipReason::MissingPrice);
        s.absorb(&t);
        assert_eq!(s.total(), 4);
        assert_eq!(s.missing_price, 1);
    }
}
