// ==========================================
// RAB 估价引擎 - 表格单元格
// ==========================================
// 职责: 导入行的单元格统一表示 {Empty, Number, Text}
// 说明: 单元格由 importer::normalizer::classify_cell 统一产生
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元格取值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

/// 一行单元格
pub type Row = Vec<Cell>;

/// 拼接行内所有非空单元格（空格分隔），用于关键字检测
pub fn joined_text(row: &[Cell]) -> String {
    row.iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// 一个工作表 / 一个 CSV 文件的全部行
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSheet {
    /// 工作表名（CSV 为文件名去扩展名）
    pub name: String,
    pub rows: Vec<Row>,
}

impl RawSheet {
    pub fn new(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}
