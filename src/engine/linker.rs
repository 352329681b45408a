// ==========================================
// RAB 估价引擎 - 工程量智能关联
// ==========================================
// 职责: 工程量模板行 → 最相似的 AHSP 分析
// 相似度: Jaro-Winkler（规范化文本），0-100 分
// 规则: 同分保留分析顺序中的第一条；低于阈值标记 needs_review
// ==========================================

use crate::domain::project::{LineItem, VolumeRow};
use crate::domain::recipe::Recipe;
use crate::importer::normalizer::normalize_name;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// 默认复核阈值（分）
pub const DEFAULT_REVIEW_THRESHOLD: f64 = 80.0;

/// 单行关联结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedRow {
    pub row: VolumeRow,
    pub recipe_code: Option<String>,
    pub recipe_description: Option<String>,
    /// 0-100
    pub score: f64,
    pub needs_review: bool,
}

/// 两段文本的相似度（0-100）
pub fn similarity(a: &str, b: &str) -> f64 {
    strsim::jaro_winkler(&normalize_name(a), &normalize_name(b)) * 100.0
}

pub struct RecipeLinker {
    review_threshold: f64,
}

impl Default for RecipeLinker {
    fn default() -> Self {
        Self::new(DEFAULT_REVIEW_THRESHOLD)
    }
}

impl RecipeLinker {
    pub fn new(review_threshold: f64) -> Self {
        Self { review_threshold }
    }

    /// 为单行挑选最相似的分析
    pub fn best_match<'r>(&self, description: &str, recipes: &'r [Recipe]) -> Option<(&'r Recipe, f64)> {
        let mut best: Option<(&Recipe, f64)> = None;
        for recipe in recipes {
            let score = similarity(description, &recipe.description);
            let better = match best {
                Some((_, current)) => score > current,
                None => true,
            };
            if better {
                best = Some((recipe, score));
            }
        }
        best
    }

    /// 批量关联
    #[instrument(skip(self, rows, recipes), fields(rows = rows.len(), recipes = recipes.len()))]
    pub fn link(&self, rows: &[VolumeRow], recipes: &[Recipe]) -> Vec<LinkedRow> {
        let linked: Vec<LinkedRow> = rows
            .iter()
            .map(|row| match self.best_match(&row.description, recipes) {
                Some((recipe, score)) => LinkedRow {
                    row: row.clone(),
                    recipe_code: Some(recipe.code.clone()),
                    recipe_description: Some(recipe.description.clone()),
                    score,
                    needs_review: score < self.review_threshold,
                },
                None => LinkedRow {
                    row: row.clone(),
                    recipe_code: None,
                    recipe_description: None,
                    score: 0.0,
                    needs_review: true,
                },
            })
            .collect();

        debug!(
            needs_review = linked.iter().filter(|l| l.needs_review).count(),
            "工程量关联完成"
        );
        linked
    }

    /// 关联结果 → RAB 明细行（分部取 LOKASI；未关联的行跳过）
    ///
    /// # 参数
    /// - first_line_no: 第一条明细的行号
    pub fn to_line_items(&self, linked: &[LinkedRow], first_line_no: u32) -> Vec<LineItem> {
        linked
            .iter()
            .filter_map(|l| l.recipe_code.as_ref().map(|code| (l, code)))
            .enumerate()
            .map(|(offset, (l, code))| {
                let item = LineItem::new(
                    first_line_no + offset as u32,
                    l.row.location.clone(),
                    l.row.description.clone(),
                    code.clone(),
                    l.row.volume,
                )
                .with_schedule(l.row.start_week, l.row.duration_weeks);
                match &l.row.unit {
                    Some(unit) => item.with_unit(unit.clone()),
                    None => item,
                }
            })
            .collect()
    }
}
