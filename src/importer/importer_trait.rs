// ==========================================
// RAB 估价引擎 - 导入接口 Trait
// ==========================================
// 职责: 定义导入管道的两个接缝（文件切分 / 工作表映射）
// ==========================================

use crate::domain::cell::RawSheet;
use crate::domain::import::{ParseDiagnostic, SkipSummary};
use crate::domain::types::ResourceCategory;
use crate::importer::error::ImportResult;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件 → 工作表（行 × 单元格）
// 实现者: CsvParser, ExcelParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为工作表列表
    ///
    /// # 返回
    /// - Ok(Vec<RawSheet>): 每个工作表的全部行
    /// - Err: 文件不存在、格式不支持、内容无法切分为行（整文件致命）
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>>;
}

// ==========================================
// SheetContext - 工作表声明信息
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SheetContext {
    /// 分部标签（默认取工作表名）
    pub division: Option<String>,
    /// 文件声明的资源类别（目录导入用）
    pub category: Option<ResourceCategory>,
}

impl SheetContext {
    pub fn division(division: impl Into<String>) -> Self {
        Self {
            division: Some(division.into()),
            category: None,
        }
    }

    pub fn category(category: ResourceCategory) -> Self {
        Self {
            division: None,
            category: Some(category),
        }
    }
}

// ==========================================
// SheetOutcome - 单表映射结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SheetOutcome<T> {
    pub items: Vec<T>,
    pub skipped: SkipSummary,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl<T> Default for SheetOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: SkipSummary::default(),
            diagnostics: Vec::new(),
        }
    }
}

impl<T> SheetOutcome<T> {
    /// 跳过的行数（诊断总数）
    pub fn skipped_rows(&self) -> usize {
        self.skipped.total()
    }
}

// ==========================================
// SheetMapper Trait
// ==========================================
// 用途: 工作表 → 领域对象（从不因单行错误失败）
// 实现者: StructureParser, CatalogMapper, VolumeMapper
pub trait SheetMapper {
    type Output;

    fn map_sheet(&self, sheet: &RawSheet, context: &SheetContext) -> SheetOutcome<Self::Output>;
}
