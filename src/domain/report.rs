// ==========================================
// RAB 估价引擎 - 派生结果
// ==========================================
// 职责: 汇总引擎的全部输出（均可整体重算，无独立身份）
// 输出对象: 分析单价表 / 明细合价 / 分部汇总 / 资源需求 / S 曲线
// ==========================================

use crate::domain::project::WeekWindow;
use crate::domain::types::{MatchKind, ResourceCategory, ScheduleStatus};
use crate::importer::normalizer::normalize_name;
use serde::{Deserialize, Serialize};

// ==========================================
// ResolvedComponent - 已解析的组成明细
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedComponent {
    pub component_name: String,
    pub coefficient: f64,
    pub section: ResourceCategory,
    pub resolved_unit_price: f64,
    pub resolved_unit: String,
    pub resolved_category: ResourceCategory,
    pub match_kind: MatchKind,
    /// 命中的目录名称（未命中为 None）
    pub matched_name: Option<String>,
    /// coefficient × resolved_unit_price
    pub subtotal: f64,
}

impl ResolvedComponent {
    pub fn is_unresolved(&self) -> bool {
        !self.match_kind.is_resolved()
    }
}

// ==========================================
// RecipeCost - 单条分析的单价
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCost {
    pub code: String,
    pub description: String,
    pub division: String,
    pub components: Vec<ResolvedComponent>,
    pub labor_subtotal: f64,
    pub material_subtotal: f64,
    pub equipment_subtotal: f64,
    /// 全部小计之和（不含间接费）
    pub base_cost: f64,
    pub overhead_pct: f64,
    pub overhead_amount: f64,
    /// base_cost × (1 + overhead_pct/100)
    pub unit_price: f64,
    pub unresolved_count: usize,
}

impl RecipeCost {
    pub fn subtotal_for(&self, category: ResourceCategory) -> f64 {
        match category {
            ResourceCategory::Labor => self.labor_subtotal,
            ResourceCategory::Material => self.material_subtotal,
            ResourceCategory::Equipment => self.equipment_subtotal,
        }
    }
}

// ==========================================
// RecipeCostTable - 分析单价表（保持分析顺序）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeCostTable {
    pub entries: Vec<RecipeCost>,
}

impl RecipeCostTable {
    /// 按编码查找（规范化匹配）
    pub fn get(&self, code: &str) -> Option<&RecipeCost> {
        let key = normalize_name(code);
        self.entries.iter().find(|e| normalize_name(&e.code) == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ==========================================
// CostedLineItem - 已计价明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostedLineItem {
    pub line_no: u32,
    pub division: String,
    pub description: String,
    pub recipe_ref: String,
    pub unit: String,
    pub volume: f64,
    pub start_week: u32,
    pub duration_weeks: u32,
    /// 含间接费单价
    pub unit_price: f64,
    /// 不含间接费单价（资源需求对账口径）
    pub base_unit_price: f64,
    /// volume × unit_price
    pub total_cost: f64,
    /// 引用的分析编码是否存在
    pub recipe_found: bool,
}

impl CostedLineItem {
    pub fn window(&self) -> WeekWindow {
        WeekWindow::new(self.start_week, self.duration_weeks)
    }
}

// ==========================================
// DivisionTotal - 分部汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DivisionTotal {
    pub division: String,
    pub item_count: usize,
    pub total_cost: f64,
}

// ==========================================
// MaterialRequirement - 资源需求汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequirement {
    pub component_name: String,
    pub unit: String,
    pub category: ResourceCategory,
    pub total_quantity: f64,
    /// 不含间接费
    pub total_cost: f64,
}

// ==========================================
// ScheduleCurve - S 曲线
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulePoint {
    pub week_index: u32,
    pub weekly_weight_pct: f64,
    pub cumulative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleCurve {
    pub status: ScheduleStatus,
    pub points: Vec<SchedulePoint>,
}

impl ScheduleCurve {
    pub fn insufficient_data() -> Self {
        Self {
            status: ScheduleStatus::InsufficientData,
            points: Vec::new(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ScheduleStatus::Ready
    }

    /// 第 week 周的数据点（超出曲线范围返回 None）
    pub fn point(&self, week: u32) -> Option<&SchedulePoint> {
        self.points.iter().find(|p| p.week_index == week)
    }
}

// ==========================================
// ProjectSummary - 项目总价
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub subtotal: f64,
    pub tax_pct: f64,
    pub tax_amount: f64,
    pub grand_total: f64,
}

// ==========================================
// Diagnostics - 汇总诊断（非致命问题）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedComponent {
    pub recipe_code: String,
    pub component_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub unresolved_components: Vec<UnresolvedComponent>,
    pub fallback_matches: usize,
    /// 引用了不存在分析编码的明细行号
    pub unknown_recipe_refs: Vec<u32>,
    pub schedule_status: ScheduleStatus,
}

impl Diagnostics {
    pub fn unresolved_count(&self) -> usize {
        self.unresolved_components.len()
    }

    pub fn is_clean(&self) -> bool {
        self.unresolved_components.is_empty()
            && self.unknown_recipe_refs.is_empty()
            && self.schedule_status == ScheduleStatus::Ready
    }
}

// ==========================================
// DerivedResults - 一次完整重算的全部输出
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedResults {
    pub recipe_costs: RecipeCostTable,
    pub line_items: Vec<CostedLineItem>,
    pub divisions: Vec<DivisionTotal>,
    pub materials: Vec<MaterialRequirement>,
    pub schedule: ScheduleCurve,
    pub summary: ProjectSummary,
    pub diagnostics: Diagnostics,
}

impl DerivedResults {
    /// 合价最高的前 n 条明细（同价保持原顺序）
    pub fn top_line_items(&self, n: usize) -> Vec<&CostedLineItem> {
        let mut sorted: Vec<&CostedLineItem> = self.line_items.iter().collect();
        sorted.sort_by(|a, b| {
            b.total_cost
                .partial_cmp(&a.total_cost)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted.truncate(n);
        sorted
    }
}
