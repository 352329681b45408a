// ==========================================
// RAB 估价引擎 - AHSP 结构解析器
// ==========================================
// 职责: 把无固定结构的表格行还原为层级的分析模型
// 状态机: AWAITING_HEADER / IN_RECIPE(section)
// 判定顺序: 表头 → 分段 → 合计行 → 组成明细 → 跳过计数
// 红线: 单行格式错误从不报错，只计入诊断
// ==========================================

mod machine;
mod detect;

#[cfg(test)]
mod tests;

pub use machine::{ParserState, RecipeParser};
pub use detect::{is_hierarchical_code, ComponentMatch, HeaderMatch, RowDetector};
