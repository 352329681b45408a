// ==========================================
// RAB 估价引擎 - 引擎层
// ==========================================
// 职责: 价格解析、分析单价、明细合价、汇总、S 曲线、工程量关联
// 红线: 引擎只处理内存结构，不做文件与数据库 I/O
//       任何单行问题都不抛错，只进入诊断汇总
// ==========================================

pub mod line_items;
pub mod linker;
pub mod price_resolver;
pub mod recalc;
pub mod recipe_cost;
pub mod rollup;
pub mod schedule;
pub mod session;

// 重导出核心引擎
pub use line_items::compute_line_items;
pub use linker::{similarity, LinkedRow, RecipeLinker, DEFAULT_REVIEW_THRESHOLD};
pub use price_resolver::{resolve, PriceResolver, Resolution};
pub use recalc::{compute_project_summary, recompute};
pub use recipe_cost::{compute_recipe_cost, compute_recipe_costs};
pub use rollup::{compute_division_rollup, compute_material_rollup};
pub use schedule::compute_s_curve;
pub use session::{Edit, EditError, EstimateSession};
