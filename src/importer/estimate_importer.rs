// ==========================================
// RAB 估价引擎 - 导入管道
// ==========================================
// 职责: 整合导入流程，从文件到领域对象
// 流程: 切分(FileParser) → 工作表角色判定 → 映射(SheetMapper) → 批次汇总
// 红线: 单文件原子: 要么返回完整结果，要么返回错误且不产生任何部分结果
// ==========================================

use crate::config::{ConfigResult, EstimateConfigReader, ParserConfig};
use crate::domain::catalog::Catalog;
use crate::domain::cell::RawSheet;
use crate::domain::import::{ImportBatch, ImportKind, ParseDiagnostic, SkipSummary};
use crate::domain::project::VolumeRow;
use crate::domain::recipe::Recipe;
use crate::domain::types::ResourceCategory;
use crate::importer::catalog_mapper::CatalogMapper;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FileParser, SheetContext, SheetMapper};
use crate::importer::recipe_parser::RecipeParser;
use crate::importer::volume_mapper::VolumeMapper;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{info, instrument, warn};
use uuid::Uuid;

// ==========================================
// 工作表角色（多工作表分析文件）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetRole {
    /// 名称含 upah / harga: 基础单价目录
    Catalog,
    /// 名称含 rekap: 汇总表，忽略
    Summary,
    /// 其他: 分析表，表名即分部
    Recipes,
}

impl SheetRole {
    pub fn classify(sheet_name: &str) -> Self {
        let lower = sheet_name.to_lowercase();
        if lower.contains("rekap") {
            SheetRole::Summary
        } else if lower.contains("upah") || lower.contains("harga") {
            SheetRole::Catalog
        } else {
            SheetRole::Recipes
        }
    }
}

// ==========================================
// 导入结果
// ==========================================

/// 目录文件导入结果
#[derive(Debug, Clone)]
pub struct CatalogImport {
    pub batch: ImportBatch,
    pub catalog: Catalog,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// 分析文件导入结果（工作簿中的目录表一并返回）
#[derive(Debug, Clone)]
pub struct RecipeImport {
    pub batch: ImportBatch,
    pub recipes: Vec<Recipe>,
    pub catalog: Catalog,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// 工程量模板导入结果
#[derive(Debug, Clone)]
pub struct VolumeImport {
    pub batch: ImportBatch,
    pub rows: Vec<VolumeRow>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

// ==========================================
// EstimateImporter - 导入器
// ==========================================
pub struct EstimateImporter {
    file_parser: Box<dyn FileParser>,
    recipe_parser: RecipeParser,
    catalog_mapper: CatalogMapper,
    volume_mapper: VolumeMapper,
}

impl EstimateImporter {
    /// 使用通用文件解析器创建导入器
    pub fn new(parser_config: ParserConfig) -> Self {
        Self::with_file_parser(Box::new(UniversalFileParser), parser_config)
    }

    /// 从配置读取器创建导入器
    pub fn from_config<C: EstimateConfigReader + ?Sized>(config: &C) -> ConfigResult<Self> {
        Ok(Self::new(config.get_parser_config()?))
    }

    pub fn with_file_parser(file_parser: Box<dyn FileParser>, parser_config: ParserConfig) -> Self {
        Self {
            file_parser,
            recipe_parser: RecipeParser::new(parser_config.clone()),
            catalog_mapper: CatalogMapper::new(parser_config),
            volume_mapper: VolumeMapper,
        }
    }

    fn new_batch(kind: ImportKind, file_name: Option<String>, sheets: &[RawSheet]) -> ImportBatch {
        ImportBatch {
            batch_id: Uuid::new_v4().to_string(),
            kind,
            file_name,
            sheets: Vec::new(),
            skipped_sheets: Vec::new(),
            total_rows: sheets.iter().map(|s| s.rows.len()).sum(),
            accepted: 0,
            components: 0,
            skipped: SkipSummary::default(),
            imported_at: Utc::now(),
            elapsed_ms: 0,
        }
    }

    fn file_name(path: &Path) -> Option<String> {
        path.file_name()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
    }

    // ==========================================
    // 基础单价目录
    // ==========================================

    /// 导入目录文件
    ///
    /// # 参数
    /// - file_path: 目录文件（.csv / .xlsx ...）
    /// - category: 文件声明的资源类别（None 时由分段行决定，缺省 MATERIAL）
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn import_catalog(
        &self,
        file_path: &Path,
        category: Option<ResourceCategory>,
    ) -> ImportResult<CatalogImport> {
        let start_time = Instant::now();
        let sheets = self.file_parser.parse_sheets(file_path)?;
        let mut result = self.catalog_from_sheets(&sheets, Self::file_name(file_path), category);
        result.batch.elapsed_ms = start_time.elapsed().as_millis();

        info!(
            batch_id = %result.batch.batch_id,
            items = result.catalog.len(),
            skipped = result.batch.skipped.total(),
            elapsed_ms = result.batch.elapsed_ms,
            "目录导入完成"
        );
        Ok(result)
    }

    /// 目录工作表 → Catalog（同键后者覆盖前者）
    pub fn catalog_from_sheets(
        &self,
        sheets: &[RawSheet],
        file_name: Option<String>,
        category: Option<ResourceCategory>,
    ) -> CatalogImport {
        let mut batch = Self::new_batch(ImportKind::Catalog, file_name, sheets);
        let mut catalog = Catalog::new();
        let mut diagnostics = Vec::new();
        let context = SheetContext {
            division: None,
            category,
        };

        for sheet in sheets {
            let outcome = self.catalog_mapper.map_sheet(sheet, &context);
            batch.sheets.push(sheet.name.clone());
            batch.skipped.absorb(&outcome.skipped);
            diagnostics.extend(outcome.diagnostics);
            for item in outcome.items {
                catalog.upsert(item);
            }
        }

        batch.accepted = catalog.len();
        CatalogImport {
            batch,
            catalog,
            diagnostics,
        }
    }

    // ==========================================
    // AHSP 分析
    // ==========================================

    /// 导入分析文件
    ///
    /// # 参数
    /// - file_path: 分析文件
    /// - division: 文件声明的分部（None 时取工作表名）
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn import_recipes(
        &self,
        file_path: &Path,
        division: Option<&str>,
    ) -> ImportResult<RecipeImport> {
        let start_time = Instant::now();
        let sheets = self.file_parser.parse_sheets(file_path)?;
        let mut result = self.recipes_from_sheets(&sheets, Self::file_name(file_path), division);
        result.batch.elapsed_ms = start_time.elapsed().as_millis();

        if result.recipes.is_empty() {
            warn!(batch_id = %result.batch.batch_id, "文件中未识别到任何分析");
        }
        info!(
            batch_id = %result.batch.batch_id,
            recipes = result.recipes.len(),
            components = result.batch.components,
            catalog_items = result.catalog.len(),
            skipped = result.batch.skipped.total(),
            skipped_sheets = result.batch.skipped_sheets.len(),
            elapsed_ms = result.batch.elapsed_ms,
            "分析导入完成"
        );
        Ok(result)
    }

    /// 分析工作表 → Recipe 列表
    ///
    /// 多工作表时按表名判定角色；单工作表（CSV）一律按分析表解析
    pub fn recipes_from_sheets(
        &self,
        sheets: &[RawSheet],
        file_name: Option<String>,
        division: Option<&str>,
    ) -> RecipeImport {
        let mut batch = Self::new_batch(ImportKind::Recipes, file_name, sheets);
        let mut recipes = Vec::new();
        let mut catalog = Catalog::new();
        let mut diagnostics = Vec::new();
        let multi_sheet = sheets.len() > 1;

        for sheet in sheets {
            let role = if multi_sheet {
                SheetRole::classify(&sheet.name)
            } else {
                SheetRole::Recipes
            };

            match role {
                SheetRole::Summary => {
                    batch.skipped_sheets.push(sheet.name.clone());
                }
                SheetRole::Catalog => {
                    let outcome = self.catalog_mapper.map_sheet(sheet, &SheetContext::default());
                    batch.sheets.push(sheet.name.clone());
                    batch.skipped.absorb(&outcome.skipped);
                    diagnostics.extend(outcome.diagnostics);
                    for item in outcome.items {
                        catalog.upsert(item);
                    }
                }
                SheetRole::Recipes => {
                    let context = SheetContext {
                        division: division.map(|d| d.to_string()),
                        category: None,
                    };
                    let outcome = self.recipe_parser.map_sheet(sheet, &context);
                    batch.sheets.push(sheet.name.clone());
                    batch.skipped.absorb(&outcome.skipped);
                    diagnostics.extend(outcome.diagnostics);
                    recipes.extend(outcome.items);
                }
            }
        }

        batch.accepted = recipes.len();
        batch.components = recipes.iter().map(|r: &Recipe| r.components.len()).sum();
        RecipeImport {
            batch,
            recipes,
            catalog,
            diagnostics,
        }
    }

    // ==========================================
    // 工程量模板
    // ==========================================

    /// 导入工程量模板（只读取第一个工作表）
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn import_volumes(&self, file_path: &Path) -> ImportResult<VolumeImport> {
        let start_time = Instant::now();
        let sheets = self.file_parser.parse_sheets(file_path)?;
        let mut result = self.volumes_from_sheets(&sheets, Self::file_name(file_path));
        result.batch.elapsed_ms = start_time.elapsed().as_millis();

        info!(
            batch_id = %result.batch.batch_id,
            rows = result.rows.len(),
            skipped = result.batch.skipped.total(),
            "工程量模板导入完成"
        );
        Ok(result)
    }

    pub fn volumes_from_sheets(&self, sheets: &[RawSheet], file_name: Option<String>) -> VolumeImport {
        let mut batch = Self::new_batch(ImportKind::Volumes, file_name, &sheets[..sheets.len().min(1)]);
        let mut rows = Vec::new();
        let mut diagnostics = Vec::new();

        for (idx, sheet) in sheets.iter().enumerate() {
            if idx > 0 {
                batch.skipped_sheets.push(sheet.name.clone());
                continue;
            }
            let outcome = self.volume_mapper.map_sheet(sheet, &SheetContext::default());
            batch.sheets.push(sheet.name.clone());
            batch.skipped.absorb(&outcome.skipped);
            diagnostics.extend(outcome.diagnostics);
            rows = outcome.items;
        }

        batch.accepted = rows.len();
        VolumeImport {
            batch,
            rows,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::Cell;
    use crate::importer::error::ImportError;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn num(v: f64) -> Cell {
        Cell::Number(v)
    }

    #[test]
    fn test_sheet_roles() {
        assert_eq!(SheetRole::classify("Harga Upah Bahan"), SheetRole::Catalog);
        assert_eq!(SheetRole::classify("DAFTAR HARGA"), SheetRole::Catalog);
        assert_eq!(SheetRole::classify("REKAP"), SheetRole::Summary);
        assert_eq!(SheetRole::classify("Pekerjaan Tanah"), SheetRole::Recipes);
    }

    #[test]
    fn test_workbook_roles_split_catalog_and_recipes() {
        let importer = EstimateImporter::new(ParserConfig::default());
        let sheets = vec![
            RawSheet::new(
                "Harga Upah",
                vec![
                    vec![text("KODE"), text("URAIAN"), text("SATUAN"), text("HARGA")],
                    vec![text("L.01"), text("Pekerja"), text("OH"), num(100000.0)],
                ],
            ),
            RawSheet::new(
                "Pekerjaan Tanah",
                vec![
                    vec![text("A.1.1"), text("Galian tanah biasa")],
                    vec![text("Tenaga")],
                    vec![text("Pekerja"), text("OH"), num(0.75)],
                ],
            ),
            RawSheet::new("Rekap", vec![vec![text("TOTAL"), num(1.0)]]),
        ];

        let result = importer.recipes_from_sheets(&sheets, Some("ahsp.xlsx".to_string()), None);
        assert_eq!(result.recipes.len(), 1);
        assert_eq!(result.recipes[0].division, "Pekerjaan Tanah");
        assert_eq!(result.batch.components, 1);
        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.batch.skipped_sheets, vec!["Rekap".to_string()]);
        assert_eq!(result.batch.total_rows, 6);
    }

    #[test]
    fn test_single_sheet_always_recipes() {
        let importer = EstimateImporter::new(ParserConfig::default());
        let sheets = vec![RawSheet::new(
            "daftar_harga_ahsp",
            vec![vec![text("A.1.1"), text("Galian tanah biasa")]],
        )];
        let result = importer.recipes_from_sheets(&sheets, None, Some("Persiapan"));
        assert_eq!(result.recipes.len(), 1);
        assert_eq!(result.recipes[0].division, "Persiapan");
        assert!(result.catalog.is_empty());
    }

    #[test]
    fn test_catalog_duplicates_last_wins() {
        let importer = EstimateImporter::new(ParserConfig::default());
        let sheets = vec![RawSheet::new(
            "harga",
            vec![
                vec![text("KODE"), text("URAIAN"), text("SATUAN"), text("HARGA")],
                vec![text("M.01"), text("Batu Kali"), text("m3"), num(250000.0)],
                vec![text("M.02"), text("Semen Portland"), text("kg"), num(1300.0)],
                vec![text("M.01"), text("BATU KALI "), text("m3"), num(286500.0)],
            ],
        )];
        let result = importer.catalog_from_sheets(&sheets, None, None);
        assert_eq!(result.catalog.len(), 2);
        assert_eq!(result.batch.accepted, 2);
        let batu = result.catalog.get_by_name("Batu Kali").unwrap();
        assert_eq!(batu.unit_price, 286500.0);
        // 覆盖保留首次位置
        assert_eq!(result.catalog.items()[0].unit_price, 286500.0);
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let importer = EstimateImporter::new(ParserConfig::default());
        let result = importer.import_recipes(Path::new("tidak_ada.csv"), None);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }
}
