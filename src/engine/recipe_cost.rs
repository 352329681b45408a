// ==========================================
// RAB 估价引擎 - 分析单价计算
// ==========================================
// 公式: subtotal = coefficient × resolved_unit_price
//       base_cost = Σ subtotal（按解析类别分组累计）
//       unit_price = base_cost × (1 + overhead_pct/100)
// 红线: 间接费只在分析层计一次；每次均由目录与分析从头计算
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::recipe::Recipe;
use crate::domain::report::{RecipeCost, RecipeCostTable, ResolvedComponent};
use crate::domain::types::{MatchKind, ResourceCategory};
use crate::engine::price_resolver::PriceResolver;
use tracing::{debug, instrument};

/// 计算单条分析的单价
pub fn compute_recipe_cost(recipe: &Recipe, resolver: &PriceResolver<'_>, overhead_pct: f64) -> RecipeCost {
    let mut labor = 0.0;
    let mut material = 0.0;
    let mut equipment = 0.0;
    let mut unresolved_count = 0;

    let components: Vec<ResolvedComponent> = recipe
        .components
        .iter()
        .map(|component| {
            let resolution = resolver.resolve(&component.component_name, component.section);
            let subtotal = component.coefficient * resolution.unit_price;

            match resolution.category {
                ResourceCategory::Labor => labor += subtotal,
                ResourceCategory::Material => material += subtotal,
                ResourceCategory::Equipment => equipment += subtotal,
            }
            if resolution.match_kind == MatchKind::Unresolved {
                unresolved_count += 1;
            }

            ResolvedComponent {
                component_name: component.component_name.clone(),
                coefficient: component.coefficient,
                section: component.section,
                resolved_unit_price: resolution.unit_price,
                resolved_unit: resolution.unit,
                resolved_category: resolution.category,
                match_kind: resolution.match_kind,
                matched_name: resolution.matched_name,
                subtotal,
            }
        })
        .collect();

    let base_cost = labor + material + equipment;
    let overhead_amount = base_cost * overhead_pct / 100.0;

    RecipeCost {
        code: recipe.code.clone(),
        description: recipe.description.clone(),
        division: recipe.division.clone(),
        components,
        labor_subtotal: labor,
        material_subtotal: material,
        equipment_subtotal: equipment,
        base_cost,
        overhead_pct,
        overhead_amount,
        unit_price: base_cost * (1.0 + overhead_pct / 100.0),
        unresolved_count,
    }
}

/// 计算全部分析的单价表（保持分析顺序）
#[instrument(skip(recipes, catalog), fields(recipes = recipes.len(), catalog = catalog.len()))]
pub fn compute_recipe_costs(recipes: &[Recipe], catalog: &Catalog, overhead_pct: f64) -> RecipeCostTable {
    let resolver = PriceResolver::new(catalog);
    let entries: Vec<RecipeCost> = recipes
        .iter()
        .map(|recipe| compute_recipe_cost(recipe, &resolver, overhead_pct))
        .collect();

    debug!(
        entries = entries.len(),
        unresolved = entries.iter().map(|e| e.unresolved_count).sum::<usize>(),
        "分析单价计算完成"
    );
    RecipeCostTable { entries }
}
