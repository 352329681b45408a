// ==========================================
// RAB 估价引擎 - 明细行计价
// ==========================================
// 公式: total_cost = volume × unit_price(recipe)
// 查找: recipe_ref 与分析编码按规范化字符串匹配
// 红线: 引用不存在 → 单价 0、recipe_found = false，不报错
// ==========================================

use crate::domain::project::LineItem;
use crate::domain::report::{CostedLineItem, RecipeCost, RecipeCostTable};
use crate::importer::normalizer::normalize_name;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// 计算全部明细行的合价（保持明细顺序）
#[instrument(skip(line_items, table), fields(items = line_items.len()))]
pub fn compute_line_items(line_items: &[LineItem], table: &RecipeCostTable) -> Vec<CostedLineItem> {
    // 同编码重复时取第一条
    let mut index: HashMap<String, &RecipeCost> = HashMap::with_capacity(table.len());
    for entry in &table.entries {
        index.entry(normalize_name(&entry.code)).or_insert(entry);
    }

    let costed: Vec<CostedLineItem> = line_items
        .iter()
        .map(|item| {
            let recipe = index.get(&normalize_name(&item.recipe_ref));
            let (unit_price, base_unit_price) = match recipe {
                Some(cost) => (cost.unit_price, cost.base_cost),
                None => {
                    warn!(line_no = item.line_no, recipe_ref = %item.recipe_ref, "明细引用的分析编码不存在");
                    (0.0, 0.0)
                }
            };

            CostedLineItem {
                line_no: item.line_no,
                division: item.division.clone(),
                description: item.description.clone(),
                recipe_ref: item.recipe_ref.clone(),
                unit: item.unit.clone(),
                volume: item.volume,
                start_week: item.start_week,
                duration_weeks: item.duration_weeks,
                unit_price,
                base_unit_price,
                total_cost: item.volume * unit_price,
                recipe_found: recipe.is_some(),
            }
        })
        .collect();

    debug!(items = costed.len(), "明细计价完成");
    costed
}
