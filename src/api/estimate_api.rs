// ==========================================
// RAB 估价引擎 - 估价 API
// ==========================================
// 职责: 封装 导入 → 校验 → 会话修改 → 报表 的完整流程
// 说明: 每个 API 实例持有独立会话，不跨会话共享可变状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::{EditValidator, ValidationMode};
use crate::config::{config_keys, ConfigManager, EstimateConfigReader};
use crate::domain::catalog::ResourceItem;
use crate::domain::import::{ImportBatch, ParseDiagnostic};
use crate::domain::project::{ProjectIdentity, VolumeRow};
use crate::domain::report::{
    CostedLineItem, Diagnostics, DivisionTotal, MaterialRequirement, ProjectSummary, RecipeCost,
    ScheduleCurve,
};
use crate::domain::types::ResourceCategory;
use crate::engine::linker::{LinkedRow, RecipeLinker};
use crate::engine::session::{Edit, EstimateSession};
use crate::i18n;
use crate::importer::EstimateImporter;

// ==========================================
// DTO
// ==========================================

/// 单个文件的导入报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch: ImportBatch,
    pub diagnostics: Vec<ParseDiagnostic>,
    /// 面向用户的提示（当前语言）
    pub messages: Vec<String>,
}

impl ImportReport {
    fn new(batch: ImportBatch, diagnostics: Vec<ParseDiagnostic>) -> Self {
        let messages = i18n::describe_import(&batch);
        Self {
            batch,
            diagnostics,
            messages,
        }
    }
}

/// 工程量导入 + 关联报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkReport {
    pub import: ImportReport,
    pub linked: Vec<LinkedRow>,
    /// 新增明细的行号
    pub added_line_nos: Vec<u32>,
    pub needs_review: usize,
}

/// 分析单价表行（导出用扁平结构）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCostRow {
    pub code: String,
    pub description: String,
    pub division: String,
    pub labor_subtotal: f64,
    pub material_subtotal: f64,
    pub equipment_subtotal: f64,
    pub base_cost: f64,
    pub overhead_amount: f64,
    pub unit_price: f64,
    pub unresolved_count: usize,
}

impl From<&RecipeCost> for RecipeCostRow {
    fn from(cost: &RecipeCost) -> Self {
        Self {
            code: cost.code.clone(),
            description: cost.description.clone(),
            division: cost.division.clone(),
            labor_subtotal: cost.labor_subtotal,
            material_subtotal: cost.material_subtotal,
            equipment_subtotal: cost.equipment_subtotal,
            base_cost: cost.base_cost,
            overhead_amount: cost.overhead_amount,
            unit_price: cost.unit_price,
            unresolved_count: cost.unresolved_count,
        }
    }
}

/// 估价报表（供导出协作方渲染）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateReport {
    pub project: ProjectIdentity,
    pub overhead_pct: f64,
    pub summary: ProjectSummary,
    pub recipe_costs: Vec<RecipeCostRow>,
    pub line_items: Vec<CostedLineItem>,
    pub divisions: Vec<DivisionTotal>,
    pub materials: Vec<MaterialRequirement>,
    pub schedule: ScheduleCurve,
    pub diagnostics: Diagnostics,
    pub messages: Vec<String>,
}

// ==========================================
// EstimateApi
// ==========================================
pub struct EstimateApi {
    session: EstimateSession,
    importer: EstimateImporter,
    validator: EditValidator,
    linker: RecipeLinker,
}

impl EstimateApi {
    /// 由配置创建（费率、项目标识、解析参数）
    pub fn from_config<C: EstimateConfigReader + ?Sized>(config: &C) -> ApiResult<Self> {
        Ok(Self::with_parts(
            EstimateSession::from_config(config)?,
            EstimateImporter::from_config(config)?,
        ))
    }

    pub fn with_parts(session: EstimateSession, importer: EstimateImporter) -> Self {
        Self {
            session,
            importer,
            validator: EditValidator::default(),
            linker: RecipeLinker::default(),
        }
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validator = EditValidator::new(mode);
        self
    }

    pub fn with_linker(mut self, linker: RecipeLinker) -> Self {
        self.linker = linker;
        self
    }

    pub fn session(&self) -> &EstimateSession {
        &self.session
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入资源目录文件并合并到会话
    ///
    /// # 参数
    /// - file_path: 目录文件
    /// - category: 文件声明的资源类别（可选）
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入报告
    /// - Err(ApiError::ImportError): 文件不可读，会话不变
    pub fn import_catalog_file(
        &mut self,
        file_path: &Path,
        category: Option<ResourceCategory>,
    ) -> ApiResult<ImportReport> {
        let result = self.importer.import_catalog(file_path, category)?;
        self.session.apply(Edit::ImportCatalog {
            catalog: result.catalog,
        })?;
        Ok(ImportReport::new(result.batch, result.diagnostics))
    }

    /// 导入 AHSP 分析文件（工作簿中的目录表一并合并）
    pub fn import_recipe_file(
        &mut self,
        file_path: &Path,
        division: Option<&str>,
    ) -> ApiResult<ImportReport> {
        let result = self.importer.import_recipes(file_path, division)?;
        if !result.catalog.is_empty() {
            self.session.apply(Edit::ImportCatalog {
                catalog: result.catalog,
            })?;
        }
        self.session.apply(Edit::ImportRecipes {
            recipes: result.recipes,
        })?;
        Ok(ImportReport::new(result.batch, result.diagnostics))
    }

    /// 导入工程量模板，关联分析后追加为明细
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn import_volume_file(&mut self, file_path: &Path) -> ApiResult<LinkReport> {
        let result = self.importer.import_volumes(file_path)?;
        let import = ImportReport::new(result.batch, result.diagnostics);
        let (linked, added_line_nos) = self.link_volumes(&result.rows)?;
        let needs_review = linked.iter().filter(|l| l.needs_review).count();

        Ok(LinkReport {
            import,
            linked,
            added_line_nos,
            needs_review,
        })
    }

    /// 工程量行 → 关联分析 → 追加明细（行号从当前最大行号之后开始）
    pub fn link_volumes(&mut self, rows: &[VolumeRow]) -> ApiResult<(Vec<LinkedRow>, Vec<u32>)> {
        let linked = self.linker.link(rows, self.session.recipes().recipes());
        let items = self
            .linker
            .to_line_items(&linked, self.session.project().next_line_no());
        let added: Vec<u32> = items.iter().map(|item| item.line_no).collect();

        for row in linked.iter().filter(|l| l.needs_review) {
            warn!(
                row = row.row.row_number,
                score = row.score,
                description = %row.row.description,
                "关联得分偏低，需要人工复核"
            );
        }

        if !items.is_empty() {
            self.apply_edit(Edit::AddLineItems { items })?;
        }
        info!(linked = linked.len(), added = added.len(), "工程量关联完成");
        Ok((linked, added))
    }

    // ==========================================
    // 修改
    // ==========================================

    /// 校验并应用修改（返回重算后的报表）
    pub fn apply_edit(&mut self, edit: Edit) -> ApiResult<EstimateReport> {
        let edit = self.validator.validate(edit, self.session.project())?;
        self.session.apply(edit)?;
        Ok(self.report())
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 当前报表
    pub fn report(&self) -> EstimateReport {
        let results = self.session.results();
        let project = self.session.project();
        EstimateReport {
            project: project.identity.clone(),
            overhead_pct: project.global_overhead_pct,
            summary: results.summary,
            recipe_costs: results.recipe_costs.entries.iter().map(RecipeCostRow::from).collect(),
            line_items: results.line_items.clone(),
            divisions: results.divisions.clone(),
            materials: results.materials.clone(),
            schedule: results.schedule.clone(),
            diagnostics: results.diagnostics.clone(),
            messages: i18n::describe_diagnostics(&results.diagnostics),
        }
    }

    /// 合价最高的前 n 条明细
    pub fn top_line_items(&self, n: usize) -> Vec<CostedLineItem> {
        self.session
            .results()
            .top_line_items(n)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 目录搜索（不区分大小写的子串匹配）
    pub fn search_catalog(&self, term: &str) -> Vec<ResourceItem> {
        self.session
            .catalog()
            .search(term)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 单条分析的单价明细
    pub fn recipe_cost(&self, code: &str) -> ApiResult<RecipeCost> {
        self.session
            .results()
            .recipe_costs
            .get(code)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("分析(code={})不存在", code)))
    }

    /// 报表 JSON
    pub fn report_json(&self) -> ApiResult<String> {
        serde_json::to_string_pretty(&self.report())
            .map_err(|e| ApiError::InternalError(format!("报表序列化失败: {}", e)))
    }

    /// 将当前费率写回配置库
    pub fn persist_rates(&self, config: &ConfigManager) -> ApiResult<()> {
        let project = self.session.project();
        config.set_value(config_keys::OVERHEAD_PCT, &project.global_overhead_pct.to_string())?;
        config.set_value(config_keys::TAX_PCT, &project.global_tax_pct.to_string())?;
        Ok(())
    }
}
