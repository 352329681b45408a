// ==========================================
// RAB 估价引擎 - 数值/文本规范化
// ==========================================
// 职责: 货币/系数字符串的容错解析 + 名称规范化 + 单元格分类
// 红线: 解析函数为全函数，失败返回 0.0 并置 was_parsed=false，从不 panic
// ==========================================

use crate::domain::cell::Cell;
use serde::{Deserialize, Serialize};

/// 货币前缀/后缀（小写比较）
const CURRENCY_TOKENS: [&str; 5] = ["rp.", "rp", "idr", "$", "€"];

/// 名称中需要剔除的引号字符
const QUOTE_CHARS: [char; 7] = ['"', '\'', '`', '‘', '’', '“', '”'];

// ==========================================
// ParsedNumber - 带解析标记的数值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedNumber {
    pub value: f64,
    pub was_parsed: bool,
}

impl ParsedNumber {
    pub fn parsed(value: f64) -> Self {
        Self {
            value,
            was_parsed: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            value: 0.0,
            was_parsed: false,
        }
    }
}

// 分隔符约定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DotPolicy {
    /// 仅出现 '.' 且末组恰为 3 位时视为千分位
    ThousandsWhenTrailingThree,
    /// 仅出现 '.' 时一律视为小数点
    AlwaysDecimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommaPolicy {
    /// 仅出现 ',' 且末组恰为 3 位时视为千分位
    ThousandsWhenTrailingThree,
    /// 仅出现 ',' 时一律视为小数点
    AlwaysDecimal,
}

// ==========================================
// 对外解析函数
// ==========================================

/// 解析货币字符串（印尼格式优先）
///
/// # 规则
/// - 去掉货币符号（Rp / IDR / $ / €）与空白
/// - 同时出现 '.' 与 ',': '.' 为千分位, ',' 为小数点
/// - 仅出现 '.': 末组恰为 3 位视为千分位（"1.234" → 1234），否则为小数点
/// - 仅出现 ',': 末组恰为 3 位视为千分位（"1,300" → 1300），否则为小数点
/// - 无法解析返回 0.0
pub fn try_parse_currency(raw: &str) -> ParsedNumber {
    parse_with_policy(
        raw,
        DotPolicy::ThousandsWhenTrailingThree,
        CommaPolicy::ThousandsWhenTrailingThree,
    )
}

pub fn parse_currency(raw: &str) -> f64 {
    try_parse_currency(raw).value
}

/// 解析系数字符串
///
/// # 规则
/// - 与货币同样的容错处理
/// - 仅出现 ',': 一律为小数点（"1,2" → 1.2）
/// - 仅出现 '.': 一律为小数点（"0.125" → 0.125，系数不存在千分位）
pub fn try_parse_coefficient(raw: &str) -> ParsedNumber {
    parse_with_policy(raw, DotPolicy::AlwaysDecimal, CommaPolicy::AlwaysDecimal)
}

pub fn parse_coefficient(raw: &str) -> f64 {
    try_parse_coefficient(raw).value
}

/// 名称规范化：小写 + 去引号 + 去首尾空白
///
/// 两个名称规范化后相等，即视为同一组成资源
pub fn normalize_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| !QUOTE_CHARS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// 单元格分类（字符串来源）
///
/// - 去空白后为空 → Empty
/// - 可直接解析为有限浮点数（如 "0.52"、"1300"）→ Number
/// - 小数点后恰为 3 位数字（如 "286.500"）→ Text，由货币/系数语义决定取值
/// - 其余 → Text（保留去空白后的原文，带分隔符的数字由调用方按语义再解析）
pub fn classify_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if has_thousands_group(trimmed) {
        return Cell::Text(trimmed.to_string());
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        _ => Cell::Text(trimmed.to_string()),
    }
}

/// 单元格文本（数值转为文本，空白为 None）
pub fn cell_text(cell: Option<&Cell>) -> Option<String> {
    match cell? {
        Cell::Empty => None,
        Cell::Number(v) => Some(v.to_string()),
        Cell::Text(s) => normalize_null(Some(s.clone())),
    }
}

/// 单元格按系数语义取值
pub fn cell_coefficient(cell: &Cell) -> ParsedNumber {
    match cell {
        Cell::Empty => ParsedNumber::failed(),
        Cell::Number(v) => ParsedNumber::parsed(*v),
        Cell::Text(s) => try_parse_coefficient(s),
    }
}

/// 单元格按货币语义取值
pub fn cell_currency(cell: &Cell) -> ParsedNumber {
    match cell {
        Cell::Empty => ParsedNumber::failed(),
        Cell::Number(v) => ParsedNumber::parsed(*v),
        Cell::Text(s) => try_parse_currency(s),
    }
}

/// 文本清洗（TRIM，可选 UPPER）
pub fn clean_text(value: &str, uppercase: bool) -> String {
    let trimmed = value.trim();
    if uppercase {
        trimmed.to_uppercase()
    } else {
        trimmed.to_string()
    }
}

/// 空白 → None
pub fn normalize_null(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ==========================================
// 内部实现
// ==========================================

fn strip_currency_and_spaces(raw: &str) -> String {
    let mut s: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .collect::<String>()
        .to_lowercase();

    for token in CURRENCY_TOKENS {
        if let Some(rest) = s.strip_prefix(token) {
            s = rest.to_string();
        }
        if let Some(rest) = s.strip_suffix(token) {
            s = rest.to_string();
        }
    }
    s
}

/// 末组为 3 位纯数字的 '.' 分组（千分位与小数有歧义）
fn has_thousands_group(s: &str) -> bool {
    s.rsplit_once('.')
        .is_some_and(|(_, tail)| tail.len() == 3 && tail.chars().all(|c| c.is_ascii_digit()))
}

fn trailing_group_len(s: &str, sep: char) -> usize {
    s.rsplit(sep).next().map(|g| g.len()).unwrap_or(0)
}

fn parse_with_policy(raw: &str, dot: DotPolicy, comma: CommaPolicy) -> ParsedNumber {
    let stripped = strip_currency_and_spaces(raw);
    if stripped.is_empty() {
        return ParsedNumber::failed();
    }

    // 仅允许数字、分隔符与前导负号
    let body = stripped.strip_prefix('-').unwrap_or(&stripped);
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return ParsedNumber::failed();
    }
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return ParsedNumber::failed();
    }

    let has_dot = body.contains('.');
    let has_comma = body.contains(',');

    let canonical = match (has_dot, has_comma) {
        (true, true) => body.replace('.', "").replace(',', "."),
        (true, false) => match dot {
            DotPolicy::ThousandsWhenTrailingThree if trailing_group_len(body, '.') == 3 => {
                body.replace('.', "")
            }
            _ => body.to_string(),
        },
        (false, true) => match comma {
            CommaPolicy::ThousandsWhenTrailingThree if trailing_group_len(body, ',') == 3 => {
                body.replace(',', "")
            }
            _ => body.replace(',', "."),
        },
        (false, false) => body.to_string(),
    };

    let negative = stripped.starts_with('-');
    match canonical.parse::<f64>() {
        Ok(v) if v.is_finite() => ParsedNumber::parsed(if negative { -v } else { v }),
        _ => ParsedNumber::failed(),
    }
}
