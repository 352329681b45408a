// ==========================================
// AHSP 结构解析器 - 行判定
// ==========================================
// 职责: 单行上的表头 / 分段 / 合计 / 组成明细识别（纯函数）
// ==========================================

use crate::config::ParserConfig;
use crate::domain::cell::{joined_text, Cell};
use crate::domain::types::ResourceCategory;
use crate::importer::normalizer::{cell_coefficient, try_parse_coefficient};

/// 表头命中
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderMatch {
    pub code: String,
    pub description: String,
    pub code_column: usize,
}

/// 组成明细命中
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMatch {
    pub name: String,
    pub coefficient: f64,
    pub name_column: usize,
    pub coefficient_column: usize,
}

/// 层级编码：字母数字组以 '.' 连接，至少两组，允许末尾带一个 '.'
///
/// 例: `A.2.2.1`、`2.2.1.`、`L.01`；纯数值（`0.150`、`286.500`）不是编码
pub fn is_hierarchical_code(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.parse::<f64>().is_ok() {
        return false;
    }
    let body = trimmed.strip_suffix('.').unwrap_or(trimmed);
    let groups: Vec<&str> = body.split('.').collect();
    groups.len() >= 2
        && groups
            .iter()
            .all(|g| !g.is_empty() && g.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// 行判定器
pub struct RowDetector<'a> {
    config: &'a ParserConfig,
}

impl<'a> RowDetector<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 表头
    // ==========================================

    /// 表头识别
    ///
    /// 编码单元格: 配置了 code_column 时取该列，否则取行内第一个文本单元格；
    /// 其右侧（或左侧）相邻文本长度 > min_description_len 即为表头
    pub fn detect_header(&self, row: &[Cell]) -> Option<HeaderMatch> {
        let code_column = match self.config.code_column {
            Some(col) => col,
            None => row.iter().position(|c| matches!(c, Cell::Text(_)))?,
        };

        let code = row.get(code_column)?.as_text()?;
        if !is_hierarchical_code(code) {
            return None;
        }

        let mut neighbours = vec![code_column + 1];
        if code_column > 0 {
            neighbours.push(code_column - 1);
        }

        let description = neighbours
            .into_iter()
            .filter_map(|col| row.get(col).and_then(Cell::as_text))
            .find(|text| self.is_header_description(text))?;

        Some(HeaderMatch {
            code: code.trim().trim_end_matches('.').to_string(),
            description: description.trim().to_string(),
            code_column,
        })
    }

    fn is_header_description(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() <= self.config.min_description_len {
            return false;
        }
        if is_hierarchical_code(trimmed) || try_parse_coefficient(trimmed).was_parsed {
            return false;
        }
        let lower = trimmed.to_lowercase();
        !self
            .config
            .header_exclude_keywords
            .iter()
            .any(|k| lower.contains(k.as_str()))
    }

    // ==========================================
    // 分段
    // ==========================================

    /// 分段识别：行文本包含人工/材料/机具关键字；多个命中时取最靠前的关键字
    pub fn detect_section(&self, row: &[Cell]) -> Option<ResourceCategory> {
        let text = joined_text(row).to_lowercase();
        if text.is_empty() {
            return None;
        }

        let groups = [
            (ResourceCategory::Labor, &self.config.labor_keywords),
            (ResourceCategory::Material, &self.config.material_keywords),
            (ResourceCategory::Equipment, &self.config.equipment_keywords),
        ];

        groups
            .iter()
            .flat_map(|(category, keywords)| {
                keywords
                    .iter()
                    .filter_map(|k| text.find(k.as_str()).map(|pos| (pos, *category)))
            })
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, category)| category)
    }

    // ==========================================
    // 合计行
    // ==========================================

    pub fn is_summary(&self, row: &[Cell]) -> bool {
        let text = joined_text(row).to_lowercase();
        self.config
            .summary_keywords
            .iter()
            .any(|k| text.contains(k.as_str()))
    }

    // ==========================================
    // 组成明细
    // ==========================================

    fn plausible(&self, value: f64) -> bool {
        value > 0.0 && value <= self.config.max_coefficient
    }

    fn coefficient_at(&self, row: &[Cell], col: usize) -> Option<f64> {
        let cell = row.get(col)?;
        if let Cell::Text(s) = cell {
            if is_hierarchical_code(s) {
                return None;
            }
        }
        let parsed = cell_coefficient(cell);
        (parsed.was_parsed && self.plausible(parsed.value)).then_some(parsed.value)
    }

    /// 组成明细识别
    ///
    /// - 系数: 优先配置列，否则自左向右第一个落在 (0, max_coefficient] 的值
    /// - 名称: 最长的非数值、非编码文本（长度 > min_component_name_len，同长取靠左）
    pub fn detect_component(&self, row: &[Cell]) -> Option<ComponentMatch> {
        let fixed = self
            .config
            .coefficient_column
            .and_then(|col| self.coefficient_at(row, col).map(|v| (col, v)));

        let (coefficient_column, coefficient) = match fixed {
            Some(hit) => hit,
            None => (0..row.len()).find_map(|col| self.coefficient_at(row, col).map(|v| (col, v)))?,
        };

        let mut best: Option<(usize, &str)> = None;
        for (col, cell) in row.iter().enumerate() {
            let Some(text) = cell.as_text() else {
                continue;
            };
            let text = text.trim();
            if text.chars().count() <= self.config.min_component_name_len
                || is_hierarchical_code(text)
                || try_parse_coefficient(text).was_parsed
            {
                continue;
            }
            let longer = match best {
                Some((_, current)) => text.chars().count() > current.chars().count(),
                None => true,
            };
            if longer {
                best = Some((col, text));
            }
        }

        let (name_column, name) = best?;
        Some(ComponentMatch {
            name: name.to_string(),
            coefficient,
            name_column,
            coefficient_column,
        })
    }
}
