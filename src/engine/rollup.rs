// ==========================================
// RAB 估价引擎 - 汇总（分部 / 资源需求）
// ==========================================
// 分部汇总: 按 division 分组累计合价（首次出现顺序）
// 资源需求: 明细 × 分析组成展开，quantity = coefficient × volume,
//           cost = quantity × 解析基价（不含间接费），
//           按 (规范化名称, 单位) 分组累计
// 对账: Σ 资源需求 cost = Σ volume × base_unit_price
// ==========================================

use crate::domain::report::{CostedLineItem, DivisionTotal, MaterialRequirement, RecipeCostTable};
use crate::importer::normalizer::normalize_name;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// 分部汇总
pub fn compute_division_rollup(costed: &[CostedLineItem]) -> Vec<DivisionTotal> {
    let mut totals: Vec<DivisionTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in costed {
        let pos = *index.entry(item.division.as_str()).or_insert_with(|| {
            totals.push(DivisionTotal {
                division: item.division.clone(),
                item_count: 0,
                total_cost: 0.0,
            });
            totals.len() - 1
        });
        totals[pos].item_count += 1;
        totals[pos].total_cost += item.total_cost;
    }

    totals
}

/// 资源需求汇总
///
/// # 参数
/// - costed: 已计价明细
/// - table: 分析单价表（提供已解析的组成明细）
#[instrument(skip(costed, table), fields(items = costed.len()))]
pub fn compute_material_rollup(
    costed: &[CostedLineItem],
    table: &RecipeCostTable,
) -> Vec<MaterialRequirement> {
    let mut recipes = HashMap::with_capacity(table.len());
    for entry in &table.entries {
        recipes.entry(normalize_name(&entry.code)).or_insert(entry);
    }

    let mut requirements: Vec<MaterialRequirement> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for item in costed {
        let Some(recipe) = recipes.get(&normalize_name(&item.recipe_ref)) else {
            continue;
        };

        for component in &recipe.components {
            let quantity = component.coefficient * item.volume;
            let cost = quantity * component.resolved_unit_price;
            let key = (
                normalize_name(&component.component_name),
                component.resolved_unit.clone(),
            );

            let pos = *index.entry(key).or_insert_with(|| {
                requirements.push(MaterialRequirement {
                    component_name: component.component_name.clone(),
                    unit: component.resolved_unit.clone(),
                    category: component.resolved_category,
                    total_quantity: 0.0,
                    total_cost: 0.0,
                });
                requirements.len() - 1
            });
            requirements[pos].total_quantity += quantity;
            requirements[pos].total_cost += cost;
        }
    }

    debug!(requirements = requirements.len(), "资源需求汇总完成");
    requirements
}
