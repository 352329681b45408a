// ==========================================
// RAB 估价引擎 - 项目与工程量清单
// ==========================================
// 职责: RAB 明细行（引用 AHSP 编码 + 工程量 + 工期窗口）
// 红线: 单价与合价为派生值，按当前分析集合实时查找
// ==========================================

use serde::{Deserialize, Serialize};

/// 默认间接费率（%）
pub const DEFAULT_OVERHEAD_PCT: f64 = 15.0;

/// 默认税率（%）
pub const DEFAULT_TAX_PCT: f64 = 11.0;

/// 排程周次上限（含），约 10 年
pub const MAX_SCHEDULE_WEEK: u32 = 520;

// ==========================================
// WeekWindow - 施工窗口（周，含首尾）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    pub start: u32,
    pub duration: u32,
    pub end: u32,
}

impl WeekWindow {
    /// 开始周与工期至少按 1 周处理，结束周饱和计算
    pub fn new(start_week: u32, duration_weeks: u32) -> Self {
        let start = start_week.max(1);
        let duration = duration_weeks.max(1);
        Self {
            start,
            duration,
            end: start.saturating_add(duration - 1),
        }
    }

    pub fn contains(&self, week: u32) -> bool {
        self.start <= week && week <= self.end
    }

    /// 结束周不超过 MAX_SCHEDULE_WEEK
    pub fn within_limit(&self) -> bool {
        self.end <= MAX_SCHEDULE_WEEK
    }
}

// ==========================================
// LineItem - RAB 明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_no: u32,
    pub division: String,
    pub description: String,
    /// 引用的 AHSP 编码
    pub recipe_ref: String,
    pub unit: String,
    /// 工程量（>= 0）
    pub volume: f64,
    /// 开始周（>= 1）
    pub start_week: u32,
    /// 持续周数（>= 1）
    pub duration_weeks: u32,
}

impl LineItem {
    pub fn new(
        line_no: u32,
        division: impl Into<String>,
        description: impl Into<String>,
        recipe_ref: impl Into<String>,
        volume: f64,
    ) -> Self {
        Self {
            line_no,
            division: division.into(),
            description: description.into(),
            recipe_ref: recipe_ref.into(),
            unit: String::new(),
            volume,
            start_week: 1,
            duration_weeks: 1,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_schedule(mut self, start_week: u32, duration_weeks: u32) -> Self {
        self.start_week = start_week;
        self.duration_weeks = duration_weeks;
        self
    }

    pub fn window(&self) -> WeekWindow {
        WeekWindow::new(self.start_week, self.duration_weeks)
    }
}

// ==========================================
// ProjectIdentity - 项目标识（对引擎不透明）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub name: String,
    pub location: String,
}

// ==========================================
// Project - 项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub identity: ProjectIdentity,
    pub line_items: Vec<LineItem>,
    pub global_overhead_pct: f64,
    pub global_tax_pct: f64,
}

impl Default for Project {
    fn default() -> Self {
        Self {
            identity: ProjectIdentity::default(),
            line_items: Vec::new(),
            global_overhead_pct: DEFAULT_OVERHEAD_PCT,
            global_tax_pct: DEFAULT_TAX_PCT,
        }
    }
}

impl Project {
    pub fn new(identity: ProjectIdentity, overhead_pct: f64, tax_pct: f64) -> Self {
        Self {
            identity,
            line_items: Vec::new(),
            global_overhead_pct: overhead_pct,
            global_tax_pct: tax_pct,
        }
    }

    /// 下一个可用行号
    pub fn next_line_no(&self) -> u32 {
        self.line_items
            .iter()
            .map(|item| item.line_no)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn find_line_item(&self, line_no: u32) -> Option<&LineItem> {
        self.line_items.iter().find(|item| item.line_no == line_no)
    }
}

// ==========================================
// VolumeRow - 工程量模板行（尚未关联分析）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRow {
    /// 来源行号（1 起始）
    pub row_number: usize,
    pub description: String,
    pub volume: f64,
    /// 缺省 "-"
    pub location: String,
    pub unit: Option<String>,
    pub start_week: u32,
    pub duration_weeks: u32,
}
