// ==========================================
// RAB 估价引擎 - 估价会话
// ==========================================
// 职责: 持有 {目录, 分析集合, 项目} 与最近一次的派生结果
// 红线: 所有修改经 apply(Edit)；每次修改返回前同步全量重算
//       会话之间不共享可变状态，无需加锁
// ==========================================

use crate::config::{ConfigResult, EstimateConfigReader};
use crate::domain::catalog::{Catalog, ResourceItem};
use crate::domain::project::{LineItem, Project, ProjectIdentity};
use crate::domain::recipe::{Recipe, RecipeBook};
use crate::domain::report::DerivedResults;
use crate::engine::recalc::recompute;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

// ==========================================
// Edit - 会话修改操作
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Edit {
    /// 新增或覆盖目录条目
    UpsertResource { item: ResourceItem },
    /// 改价（按名称规范化匹配）
    SetResourcePrice { name: String, unit_price: f64 },
    RemoveResource { name: String },
    /// 合并导入的目录（同键后者覆盖）
    ImportCatalog { catalog: Catalog },
    /// 合并导入的分析（同编码后者覆盖）
    ImportRecipes { recipes: Vec<Recipe> },
    AddLineItem { item: LineItem },
    /// 批量追加（工程量关联结果）
    AddLineItems { items: Vec<LineItem> },
    /// 按 line_no 整行替换
    UpdateLineItem { item: LineItem },
    RemoveLineItem { line_no: u32 },
    SetOverheadPct { pct: f64 },
    SetTaxPct { pct: f64 },
}

impl Edit {
    /// 日志用名称
    pub fn name(&self) -> &'static str {
        match self {
            Edit::UpsertResource { .. } => "UPSERT_RESOURCE",
            Edit::SetResourcePrice { .. } => "SET_RESOURCE_PRICE",
            Edit::RemoveResource { .. } => "REMOVE_RESOURCE",
            Edit::ImportCatalog { .. } => "IMPORT_CATALOG",
            Edit::ImportRecipes { .. } => "IMPORT_RECIPES",
            Edit::AddLineItem { .. } => "ADD_LINE_ITEM",
            Edit::AddLineItems { .. } => "ADD_LINE_ITEMS",
            Edit::UpdateLineItem { .. } => "UPDATE_LINE_ITEM",
            Edit::RemoveLineItem { .. } => "REMOVE_LINE_ITEM",
            Edit::SetOverheadPct { .. } => "SET_OVERHEAD_PCT",
            Edit::SetTaxPct { .. } => "SET_TAX_PCT",
        }
    }
}

/// 修改被拒绝（会话状态保持不变）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditError {
    #[error("目录中不存在资源: {0}")]
    ResourceNotFound(String),

    #[error("明细行不存在: {0}")]
    LineItemNotFound(u32),

    #[error("明细行号重复: {0}")]
    DuplicateLineNo(u32),
}

// ==========================================
// EstimateSession - 估价会话
// ==========================================
#[derive(Debug, Clone)]
pub struct EstimateSession {
    catalog: Catalog,
    recipes: RecipeBook,
    project: Project,
    results: DerivedResults,
}

impl Default for EstimateSession {
    fn default() -> Self {
        Self::new(Project::default())
    }
}

impl EstimateSession {
    pub fn new(project: Project) -> Self {
        Self::with_data(Catalog::new(), RecipeBook::new(), project)
    }

    /// 由已有数据创建（立即重算一次）
    pub fn with_data(catalog: Catalog, recipes: RecipeBook, project: Project) -> Self {
        let results = recompute(&catalog, &recipes, &project);
        Self {
            catalog,
            recipes,
            project,
            results,
        }
    }

    /// 按配置初始化项目标识与费率
    pub fn from_config<C: EstimateConfigReader + ?Sized>(config: &C) -> ConfigResult<Self> {
        let identity = ProjectIdentity {
            name: config.get_project_name()?,
            location: config.get_project_location()?,
        };
        let project = Project::new(identity, config.get_overhead_pct()?, config.get_tax_pct()?);
        Ok(Self::new(project))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn results(&self) -> &DerivedResults {
        &self.results
    }

    /// 应用修改并全量重算
    ///
    /// # 返回
    /// - Ok: 重算后的派生结果
    /// - Err: 修改被拒绝，状态与结果均不变
    pub fn apply(&mut self, edit: Edit) -> Result<&DerivedResults, EditError> {
        let edit_name = edit.name();
        self.mutate(edit)?;
        self.results = recompute(&self.catalog, &self.recipes, &self.project);

        info!(
            edit = edit_name,
            grand_total = self.results.summary.grand_total,
            "修改已应用"
        );
        Ok(&self.results)
    }

    fn mutate(&mut self, edit: Edit) -> Result<(), EditError> {
        match edit {
            Edit::UpsertResource { item } => {
                self.catalog.upsert(item);
            }
            Edit::SetResourcePrice { name, unit_price } => {
                let item = self
                    .catalog
                    .get_mut_by_name(&name)
                    .ok_or_else(|| EditError::ResourceNotFound(name.clone()))?;
                debug!(name = %name, old = item.unit_price, new = unit_price, "资源改价");
                item.unit_price = unit_price;
            }
            Edit::RemoveResource { name } => {
                self.catalog
                    .remove(&name)
                    .ok_or(EditError::ResourceNotFound(name))?;
            }
            Edit::ImportCatalog { catalog } => {
                let overwritten = self.catalog.merge(catalog);
                debug!(overwritten, "目录合并完成");
            }
            Edit::ImportRecipes { recipes } => {
                let overwritten = self.recipes.extend(recipes);
                debug!(overwritten, "分析合并完成");
            }
            Edit::AddLineItem { item } => {
                if self.project.find_line_item(item.line_no).is_some() {
                    return Err(EditError::DuplicateLineNo(item.line_no));
                }
                self.project.line_items.push(item);
            }
            Edit::AddLineItems { items } => {
                for (idx, item) in items.iter().enumerate() {
                    let clash = self.project.find_line_item(item.line_no).is_some()
                        || items[..idx].iter().any(|other| other.line_no == item.line_no);
                    if clash {
                        return Err(EditError::DuplicateLineNo(item.line_no));
                    }
                }
                self.project.line_items.extend(items);
            }
            Edit::UpdateLineItem { item } => {
                let slot = self
                    .project
                    .line_items
                    .iter_mut()
                    .find(|existing| existing.line_no == item.line_no)
                    .ok_or(EditError::LineItemNotFound(item.line_no))?;
                *slot = item;
            }
            Edit::RemoveLineItem { line_no } => {
                let before = self.project.line_items.len();
                self.project.line_items.retain(|item| item.line_no != line_no);
                if self.project.line_items.len() == before {
                    return Err(EditError::LineItemNotFound(line_no));
                }
            }
            Edit::SetOverheadPct { pct } => {
                self.project.global_overhead_pct = pct;
            }
            Edit::SetTaxPct { pct } => {
                self.project.global_tax_pct = pct;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ResourceCategory;

    fn session() -> EstimateSession {
        let mut session = EstimateSession::default();
        session
            .apply(Edit::ImportCatalog {
                catalog: Catalog::from_items(vec![ResourceItem::new(
                    "M.01",
                    "Batu Kali",
                    "m3",
                    286500.0,
                    ResourceCategory::Material,
                )]),
            })
            .unwrap();
        session
            .apply(Edit::ImportRecipes {
                recipes: vec![Recipe::new("A.2.2.1", "Pasangan Batu Kali", "Pasangan")
                    .with_component("Batu Kali", 1.2, ResourceCategory::Material)],
            })
            .unwrap();
        session
            .apply(Edit::SetOverheadPct { pct: 0.0 })
            .unwrap();
        session
            .apply(Edit::AddLineItem {
                item: LineItem::new(1, "Struktur", "Pondasi", "A.2.2.1", 1.0),
            })
            .unwrap();
        session
    }

    #[test]
    fn test_price_edit_cascades_to_line_items() {
        let mut session = session();
        assert_eq!(session.results().line_items[0].total_cost, 343800.0);

        let results = session
            .apply(Edit::SetResourcePrice {
                name: "batu kali".to_string(),
                unit_price: 300000.0,
            })
            .unwrap();
        assert_eq!(results.recipe_costs.entries[0].components[0].subtotal, 360000.0);
        assert_eq!(results.line_items[0].total_cost, 360000.0);
    }

    #[test]
    fn test_rejected_edit_leaves_state_untouched() {
        let mut session = session();
        let before = session.results().clone();

        let err = session
            .apply(Edit::AddLineItem {
                item: LineItem::new(1, "Struktur", "Duplikat", "A.2.2.1", 5.0),
            })
            .unwrap_err();
        assert_eq!(err, EditError::DuplicateLineNo(1));
        assert_eq!(session.results(), &before);

        assert_eq!(
            session.apply(Edit::RemoveLineItem { line_no: 99 }).unwrap_err(),
            EditError::LineItemNotFound(99)
        );
        assert!(matches!(
            session.apply(Edit::SetResourcePrice {
                name: "Emas".to_string(),
                unit_price: 1.0
            }),
            Err(EditError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_removing_resource_unresolves_component() {
        let mut session = session();
        let results = session
            .apply(Edit::RemoveResource {
                name: "Batu Kali".to_string(),
            })
            .unwrap();
        assert_eq!(results.diagnostics.unresolved_count(), 1);
        assert_eq!(results.line_items[0].total_cost, 0.0);
    }

    #[test]
    fn test_overhead_and_tax_edits() {
        let mut session = session();
        session.apply(Edit::SetOverheadPct { pct: 10.0 }).unwrap();
        let results = session.apply(Edit::SetTaxPct { pct: 0.0 }).unwrap();
        assert!((results.line_items[0].unit_price - 343800.0 * 1.1).abs() < 1e-6);
        assert_eq!(results.summary.tax_amount, 0.0);
    }

    #[test]
    fn test_update_and_batch_add_line_items() {
        let mut session = session();
        session
            .apply(Edit::UpdateLineItem {
                item: LineItem::new(1, "Struktur", "Pondasi", "A.2.2.1", 2.0),
            })
            .unwrap();
        assert_eq!(session.results().line_items[0].total_cost, 687600.0);

        let clash = session.apply(Edit::AddLineItems {
            items: vec![
                LineItem::new(2, "Arsitektur", "a", "A.2.2.1", 1.0),
                LineItem::new(2, "Arsitektur", "b", "A.2.2.1", 1.0),
            ],
        });
        assert_eq!(clash.unwrap_err(), EditError::DuplicateLineNo(2));
        assert_eq!(session.project().line_items.len(), 1);
    }
}
