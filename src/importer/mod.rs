// ==========================================
// RAB 估价引擎 - 导入层
// ==========================================
// 职责: 外部表格 → 领域对象（目录 / AHSP 分析 / 工程量模板）
// 支持: Excel（全部工作表）, CSV
// 红线: 行级问题只计入诊断；整文件不可读才返回错误
// ==========================================

// 模块声明
pub mod catalog_mapper;
pub mod error;
pub mod estimate_importer;
pub mod file_parser;
pub mod importer_trait;
pub mod normalizer;
pub mod recipe_parser;
pub mod volume_mapper;

// 重导出核心类型
pub use catalog_mapper::{CatalogLayout, CatalogMapper};
pub use error::{ImportError, ImportResult};
pub use estimate_importer::{CatalogImport, EstimateImporter, RecipeImport, SheetRole, VolumeImport};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use normalizer::{
    classify_cell, normalize_name, parse_coefficient, parse_currency, try_parse_coefficient,
    try_parse_currency, ParsedNumber,
};
pub use recipe_parser::{ParserState, RecipeParser};
pub use volume_mapper::VolumeMapper;

// 重导出 Trait 接口
pub use importer_trait::{FileParser, SheetContext, SheetMapper, SheetOutcome};
