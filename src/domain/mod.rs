// ==========================================
// RAB 估价引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与派生结果结构
// 红线: 不含文件读取逻辑，不含汇总计算逻辑
// ==========================================

pub mod catalog;
pub mod cell;
pub mod import;
pub mod project;
pub mod recipe;
pub mod report;
pub mod types;

// 重导出核心类型
pub use catalog::{Catalog, ResourceItem};
pub use cell::{Cell, RawSheet, Row};
pub use import::{ImportBatch, ImportKind, ParseDiagnostic, SkipReason, SkipSummary};
pub use project::{LineItem, Project, ProjectIdentity, VolumeRow, WeekWindow, MAX_SCHEDULE_WEEK};
pub use recipe::{Recipe, RecipeBook, RecipeComponent};
pub use report::{
    CostedLineItem, DerivedResults, Diagnostics, DivisionTotal, MaterialRequirement,
    ProjectSummary, RecipeCost, RecipeCostTable, ResolvedComponent, ScheduleCurve,
    SchedulePoint, UnresolvedComponent,
};
pub use types::{MatchKind, ResourceCategory, ScheduleStatus};
