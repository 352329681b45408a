// ==========================================
// AHSP 结构解析器 - 状态机
// ==========================================
// 状态: AwaitingHeader -> InRecipe(section)
// 判定顺序: 空行 -> 表头 -> 分段 -> 合计行 -> 组成明细 -> 跳过
// 红线: 单行异常只计数，从不使整表失败
// ==========================================

use super::detect::RowDetector;
use crate::config::ParserConfig;
use crate::domain::cell::{Cell, RawSheet};
use crate::domain::import::{ParseDiagnostic, SkipReason};
use crate::domain::recipe::Recipe;
use crate::domain::types::ResourceCategory;
use crate::importer::importer_trait::{SheetContext, SheetMapper, SheetOutcome};
use tracing::{debug, info};

/// 解析状态
#[derive(Debug, Clone, PartialEq)]
pub enum ParserState {
    AwaitingHeader,
    InRecipe {
        recipe: Recipe,
        section: Option<ResourceCategory>,
    },
}

/// AHSP 分析表解析器
#[derive(Debug, Clone, Default)]
pub struct RecipeParser {
    config: ParserConfig,
}

impl RecipeParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// 逐行解析
    ///
    /// # 参数
    /// - sheet_name: 诊断中使用的工作表名
    /// - division: 新建分析的分部标签
    /// - rows: 原始行序列
    pub fn parse_rows(
        &self,
        sheet_name: &str,
        division: &str,
        rows: &[Vec<Cell>],
    ) -> SheetOutcome<Recipe> {
        let detector = RowDetector::new(&self.config);
        let mut outcome = SheetOutcome::default();
        let mut state = ParserState::AwaitingHeader;

        for (idx, row) in rows.iter().enumerate() {
            let row_number = idx + 1;
            let skip = |reason: SkipReason, outcome: &mut SheetOutcome<Recipe>| {
                outcome.skipped.record(reason);
                outcome.diagnostics.push(ParseDiagnostic {
                    sheet: sheet_name.to_string(),
                    row_number,
                    reason,
                });
            };

            if row.iter().all(Cell::is_empty) {
                skip(SkipReason::Blank, &mut outcome);
                continue;
            }

            // 1. 表头: 关闭当前分析，打开新分析
            if let Some(header) = detector.detect_header(row) {
                if let ParserState::InRecipe { recipe, .. } = state {
                    outcome.items.push(recipe);
                }
                debug!(
                    sheet = %sheet_name,
                    row = row_number,
                    code = %header.code,
                    "识别到分析表头"
                );
                state = ParserState::InRecipe {
                    recipe: Recipe::new(header.code, header.description, division),
                    section: None,
                };
                continue;
            }

            // 2. 分段: 仅改变当前类别，本行不产出明细
            if let Some(category) = detector.detect_section(row) {
                if let ParserState::InRecipe { section, .. } = &mut state {
                    *section = Some(category);
                }
                continue;
            }

            // 3. 合计/小计行
            if detector.is_summary(row) {
                skip(SkipReason::Summary, &mut outcome);
                continue;
            }

            // 4. 组成明细: 需要已打开的分析且分段已知
            if let ParserState::InRecipe {
                recipe,
                section: Some(category),
            } = &mut state
            {
                if let Some(component) = detector.detect_component(row) {
                    recipe.push_component(component.name, component.coefficient, *category);
                    continue;
                }
            }

            skip(SkipReason::Unrecognized, &mut outcome);
        }

        if let ParserState::InRecipe { recipe, .. } = state {
            outcome.items.push(recipe);
        }

        outcome
    }
}

impl SheetMapper for RecipeParser {
    type Output = Recipe;

    fn map_sheet(&self, sheet: &RawSheet, context: &SheetContext) -> SheetOutcome<Recipe> {
        let division = context.division.as_deref().unwrap_or(&sheet.name);
        let outcome = self.parse_rows(&sheet.name, division, &sheet.rows);

        let components: usize = outcome.items.iter().map(|r| r.components.len()).sum();
        info!(
            sheet = %sheet.name,
            division = %division,
            recipes = outcome.items.len(),
            components = components,
            skipped = outcome.skipped_rows(),
            "分析表解析完成"
        );
        outcome
    }
}
