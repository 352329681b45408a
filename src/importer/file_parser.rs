// ==========================================
// RAB 估价引擎 - 文件解析器实现
// ==========================================
// 职责: 把上传文件切分为行 × 单元格（不假设表头、不假设固定列）
// 支持: Excel (.xlsx/.xls/.ods，全部工作表) / CSV (.csv)
// ==========================================

use crate::domain::cell::{Cell, RawSheet, Row};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use crate::importer::normalizer::classify_cell;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("sheet")
        .to_string()
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 从任意 reader 切分行（CSV 只有一张"表"）
    pub fn parse_reader<R: Read>(&self, sheet_name: &str, reader: R) -> ImportResult<RawSheet> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let mut rows: Vec<Row> = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(classify_cell).collect());
        }

        debug!(sheet = %sheet_name, rows = rows.len(), "CSV 切分完成");
        Ok(RawSheet::new(sheet_name, rows))
    }
}

impl FileParser for CsvParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        let sheet = self.parse_reader(&file_stem(file_path), file)?;
        Ok(vec![sheet])
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> Cell {
        match cell {
            Data::Empty => Cell::Empty,
            Data::Int(v) => Cell::Number(*v as f64),
            Data::Float(v) if v.is_finite() => Cell::Number(*v),
            Data::String(s) => classify_cell(s),
            other => classify_cell(&other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        ensure_exists(file_path)?;

        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if !matches!(ext.as_str(), "xlsx" | "xls" | "xlsm" | "ods") {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(file_path)?;
        let sheet_names = workbook.sheet_names().to_owned();
        if sheet_names.is_empty() {
            return Err(ImportError::EmptySource(file_path.display().to_string()));
        }

        let mut sheets = Vec::with_capacity(sheet_names.len());
        for name in sheet_names {
            let range = workbook.worksheet_range(&name)?;

            // Range 从第一个非空单元格开始，补齐前导行列以保持列位置
            let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
            let mut rows: Vec<Row> = (0..row_offset).map(|_| Vec::new()).collect();
            for data_row in range.rows() {
                let mut row: Row = vec![Cell::Empty; col_offset as usize];
                row.extend(data_row.iter().map(Self::convert_cell));
                rows.push(row);
            }

            debug!(sheet = %name, rows = rows.len(), "工作表切分完成");
            sheets.push(RawSheet::new(name, rows));
        }

        Ok(sheets)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_sheets(&self, file_path: &Path) -> ImportResult<Vec<RawSheet>> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_sheets(file_path),
            "xlsx" | "xls" | "xlsm" | "ods" => ExcelParser.parse_sheets(file_path),
            _ => {
                ensure_exists(file_path)?;
                Err(ImportError::UnsupportedFormat(ext))
            }
        }
    }
}
