// ==========================================
// RAB 估价引擎 - 基础单价目录映射
// ==========================================
// 职责: 目录工作表 → ResourceItem 列表
// 列定位: 关键字表头（kode/no, uraian/nama, satuan, harga），缺省取固定列
// 类别: 分段行（upah/bahan/peralatan）> 文件声明类别 > MATERIAL
// ==========================================

use crate::config::ParserConfig;
use crate::domain::cell::{Cell, RawSheet};
use crate::domain::catalog::ResourceItem;
use crate::domain::import::{ParseDiagnostic, SkipReason};
use crate::domain::types::ResourceCategory;
use crate::importer::importer_trait::{SheetContext, SheetMapper, SheetOutcome};
use crate::importer::normalizer::{cell_currency, cell_text, try_parse_coefficient};
use crate::importer::recipe_parser::RowDetector;
use tracing::{debug, info};

/// 目录列布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogLayout {
    pub code: Option<usize>,
    pub name: usize,
    pub unit: Option<usize>,
    pub price: usize,
}

impl Default for CatalogLayout {
    /// 无表头时的固定列位置
    fn default() -> Self {
        Self {
            code: None,
            name: 2,
            unit: Some(3),
            price: 4,
        }
    }
}

impl CatalogLayout {
    /// 从表头行识别列位置；名称列与价格列都命中才算表头
    pub fn from_header(row: &[Cell]) -> Option<Self> {
        let find = |pred: &dyn Fn(&str) -> bool| {
            row.iter().position(|cell| {
                cell.as_text()
                    .map(|t| pred(&t.trim().to_lowercase()))
                    .unwrap_or(false)
            })
        };

        let name = find(&|t: &str| t.contains("uraian") || t.contains("nama"))?;
        let price = find(&|t: &str| t.contains("harga"))?;
        if name == price {
            return None;
        }
        let code = find(&|t: &str| t.contains("kode") || t == "no" || t == "no.");
        let unit = find(&|t: &str| t.contains("satuan") && !t.contains("harga"));

        Some(Self {
            code,
            name,
            unit,
            price,
        })
    }
}

/// 目录工作表映射器
#[derive(Debug, Clone, Default)]
pub struct CatalogMapper {
    config: ParserConfig,
}

impl CatalogMapper {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }
}

impl SheetMapper for CatalogMapper {
    type Output = ResourceItem;

    fn map_sheet(&self, sheet: &RawSheet, context: &SheetContext) -> SheetOutcome<ResourceItem> {
        let detector = RowDetector::new(&self.config);
        let mut outcome = SheetOutcome::default();

        // 1. 定位表头
        let header = sheet
            .rows
            .iter()
            .enumerate()
            .find_map(|(idx, row)| CatalogLayout::from_header(row).map(|layout| (idx, layout)));
        let (data_start, layout) = match header {
            Some((idx, layout)) => {
                debug!(sheet = %sheet.name, header_row = idx + 1, ?layout, "识别到目录表头");
                (idx + 1, layout)
            }
            None => {
                debug!(sheet = %sheet.name, "未识别到目录表头，使用固定列");
                (0, CatalogLayout::default())
            }
        };

        let mut category = context.category.unwrap_or_default();

        for (idx, row) in sheet.rows.iter().enumerate() {
            let row_number = idx + 1;
            let mut skip = |reason: SkipReason| {
                outcome.skipped.record(reason);
                outcome.diagnostics.push(ParseDiagnostic {
                    sheet: sheet.name.clone(),
                    row_number,
                    reason,
                });
            };

            if row.iter().all(Cell::is_empty) {
                skip(SkipReason::Blank);
                continue;
            }
            if idx + 1 == data_start && header.is_some() {
                continue;
            }
            if idx < data_start {
                skip(SkipReason::Unrecognized);
                continue;
            }

            let price = row
                .get(layout.price)
                .map(cell_currency)
                .filter(|p| p.was_parsed);

            // 2. 分段行: 无价格且含类别关键字
            if price.is_none() {
                if let Some(section) = detector.detect_section(row) {
                    category = section;
                    continue;
                }
            }

            if detector.is_summary(row) {
                skip(SkipReason::Summary);
                continue;
            }

            // 3. 条目行
            let name = cell_text(row.get(layout.name))
                .filter(|n| !try_parse_coefficient(n).was_parsed);
            let Some(name) = name else {
                skip(SkipReason::MissingName);
                continue;
            };
            let Some(price) = price else {
                skip(SkipReason::MissingPrice);
                continue;
            };
            if price.value < 0.0 {
                skip(SkipReason::NegativePrice);
                continue;
            }

            let code = layout
                .code
                .and_then(|col| cell_text(row.get(col)))
                .unwrap_or_default();
            let unit = layout
                .unit
                .and_then(|col| cell_text(row.get(col)))
                .unwrap_or_else(|| "-".to_string());

            outcome
                .items
                .push(ResourceItem::new(code, name, unit, price.value, category));
        }

        info!(
            sheet = %sheet.name,
            items = outcome.items.len(),
            skipped = outcome.skipped_rows(),
            "目录工作表映射完成"
        );
        outcome
    }
}
