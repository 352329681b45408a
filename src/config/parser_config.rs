// ==========================================
// RAB 估价引擎 - 结构解析配置
// ==========================================
// 职责: 表头/分段/明细识别的阈值与关键字
// 存储: config_kv 中 key = parser_config 的 JSON（缺省取默认值）
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// 编码所在列（None: 取行内第一个文本单元格）
    pub code_column: Option<usize>,
    /// 系数所在列（None 或该列不合理时: 自左向右取第一个合理值）
    pub coefficient_column: Option<usize>,
    /// 表头描述最小长度（严格大于）
    pub min_description_len: usize,
    /// 组成名称最小长度（严格大于）
    pub min_component_name_len: usize,
    /// 系数合理区间上界 (0, max_coefficient]
    pub max_coefficient: f64,
    pub labor_keywords: Vec<String>,
    pub material_keywords: Vec<String>,
    pub equipment_keywords: Vec<String>,
    /// 合计/小计行关键字
    pub summary_keywords: Vec<String>,
    /// 表头描述中出现即不视为分析表头（如 "Analisa Harga Satuan ..." 标题行）
    pub header_exclude_keywords: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            code_column: None,
            coefficient_column: None,
            min_description_len: 3,
            min_component_name_len: 3,
            max_coefficient: 10_000.0,
            labor_keywords: words(&["tenaga", "upah", "labor"]),
            material_keywords: words(&["bahan", "material"]),
            equipment_keywords: words(&["peralatan", "equipment"]),
            summary_keywords: words(&["jumlah", "total", "overhead"]),
            header_exclude_keywords: words(&["analisa"]),
        }
    }
}
