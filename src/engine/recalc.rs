// ==========================================
// RAB 估价引擎 - 全量重算
// ==========================================
// 顺序: 分析单价 → 明细合价 → 分部汇总 / 资源需求 → S 曲线 → 项目总价
// 红线: 纯函数，不做增量失效；输入不变则输出逐位相同
// ==========================================

use crate::domain::catalog::Catalog;
use crate::domain::project::Project;
use crate::domain::recipe::RecipeBook;
use crate::domain::report::{
    CostedLineItem, DerivedResults, Diagnostics, ProjectSummary, RecipeCostTable,
    UnresolvedComponent,
};
use crate::domain::types::MatchKind;
use crate::engine::line_items::compute_line_items;
use crate::engine::recipe_cost::compute_recipe_costs;
use crate::engine::rollup::{compute_division_rollup, compute_material_rollup};
use crate::engine::schedule::compute_s_curve;
use std::time::Instant;
use tracing::{info, instrument};

/// 项目总价: grand_total = subtotal × (1 + tax_pct/100)
pub fn compute_project_summary(costed: &[CostedLineItem], tax_pct: f64) -> ProjectSummary {
    let subtotal: f64 = costed.iter().map(|item| item.total_cost).sum();
    let tax_amount = subtotal * tax_pct / 100.0;
    ProjectSummary {
        subtotal,
        tax_pct,
        tax_amount,
        grand_total: subtotal + tax_amount,
    }
}

fn collect_unresolved(table: &RecipeCostTable) -> Vec<UnresolvedComponent> {
    table
        .entries
        .iter()
        .flat_map(|entry| {
            entry
                .components
                .iter()
                .filter(|c| c.match_kind == MatchKind::Unresolved)
                .map(move |c| UnresolvedComponent {
                    recipe_code: entry.code.clone(),
                    component_name: c.component_name.clone(),
                })
        })
        .collect()
}

/// 全量重算
///
/// # 参数
/// - catalog: 当前目录
/// - recipes: 当前分析集合
/// - project: 明细行与费率
#[instrument(skip_all, fields(
    catalog = catalog.len(),
    recipes = recipes.len(),
    line_items = project.line_items.len()
))]
pub fn recompute(catalog: &Catalog, recipes: &RecipeBook, project: &Project) -> DerivedResults {
    let start_time = Instant::now();

    let recipe_costs = compute_recipe_costs(recipes.recipes(), catalog, project.global_overhead_pct);
    let line_items = compute_line_items(&project.line_items, &recipe_costs);
    let divisions = compute_division_rollup(&line_items);
    let materials = compute_material_rollup(&line_items, &recipe_costs);
    let schedule = compute_s_curve(&line_items);
    let summary = compute_project_summary(&line_items, project.global_tax_pct);

    let diagnostics = Diagnostics {
        unresolved_components: collect_unresolved(&recipe_costs),
        fallback_matches: recipe_costs
            .entries
            .iter()
            .flat_map(|e| e.components.iter())
            .filter(|c| c.match_kind == MatchKind::Fallback)
            .count(),
        unknown_recipe_refs: line_items
            .iter()
            .filter(|item| !item.recipe_found)
            .map(|item| item.line_no)
            .collect(),
        schedule_status: schedule.status,
    };

    info!(
        subtotal = summary.subtotal,
        grand_total = summary.grand_total,
        unresolved = diagnostics.unresolved_count(),
        unknown_refs = diagnostics.unknown_recipe_refs.len(),
        elapsed_us = start_time.elapsed().as_micros() as u64,
        "全量重算完成"
    );

    DerivedResults {
        recipe_costs,
        line_items,
        divisions,
        materials,
        schedule,
        summary,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ResourceItem;
    use crate::domain::project::LineItem;
    use crate::domain::recipe::Recipe;
    use crate::domain::types::{ResourceCategory, ScheduleStatus};

    fn inputs() -> (Catalog, RecipeBook, Project) {
        let catalog = Catalog::from_items(vec![
            ResourceItem::new("L.01", "Pekerja", "OH", 100000.0, ResourceCategory::Labor),
            ResourceItem::new("M.01", "Batu Kali", "m3", 286500.0, ResourceCategory::Material),
            ResourceItem::new("M.10", "Semen Portland", "kg", 1300.0, ResourceCategory::Material),
            ResourceItem::new("M.11", "Semen Putih", "kg", 2500.0, ResourceCategory::Material),
        ]);
        let recipes = RecipeBook::from_recipes(vec![Recipe::new("A.2.2.1", "Pasangan Batu Kali", "Pasangan")
            .with_component("Pekerja", 1.5, ResourceCategory::Labor)
            .with_component("Batu Kali", 1.2, ResourceCategory::Material)
            .with_component("Semen", 163.0, ResourceCategory::Material)
            .with_component("Kawat ikat", 0.5, ResourceCategory::Material)]);
        let mut project = Project::default();
        project.line_items = vec![
            LineItem::new(1, "Struktur", "Pondasi", "A.2.2.1", 10.0).with_schedule(1, 2),
            LineItem::new(2, "Struktur", "Kolom", "B.1", 4.0),
        ];
        (catalog, recipes, project)
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let (catalog, recipes, project) = inputs();
        let first = recompute(&catalog, &recipes, &project);
        let second = recompute(&catalog, &recipes, &project);
        assert_eq!(first, second);
    }

    #[test]
    fn test_diagnostics_are_aggregated() {
        let (catalog, recipes, project) = inputs();
        let results = recompute(&catalog, &recipes, &project);

        assert_eq!(results.diagnostics.unresolved_count(), 1);
        assert_eq!(results.diagnostics.unresolved_components[0].component_name, "Kawat ikat");
        assert_eq!(results.diagnostics.fallback_matches, 1);
        assert_eq!(results.diagnostics.unknown_recipe_refs, vec![2]);
        assert_eq!(results.diagnostics.schedule_status, ScheduleStatus::Ready);
        assert!(!results.diagnostics.is_clean());
    }

    #[test]
    fn test_summary_applies_tax_once() {
        let (catalog, recipes, project) = inputs();
        let results = recompute(&catalog, &recipes, &project);

        let subtotal: f64 = results.line_items.iter().map(|i| i.total_cost).sum();
        assert_eq!(results.summary.subtotal, subtotal);
        assert!((results.summary.grand_total - subtotal * 1.11).abs() < 1e-3);
        assert_eq!(results.summary.tax_pct, 11.0);
    }

    #[test]
    fn test_empty_project_has_insufficient_schedule() {
        let results = recompute(&Catalog::new(), &RecipeBook::new(), &Project::default());
        assert_eq!(results.summary.grand_total, 0.0);
        assert_eq!(results.schedule.status, ScheduleStatus::InsufficientData);
        assert!(results.line_items.is_empty());
    }
}
