use super::*;
use crate::config::ParserConfig;
use crate::domain::cell::{Cell, RawSheet};
use crate::domain::types::ResourceCategory;
use crate::importer::importer_trait::{SheetContext, SheetMapper};

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn num(v: f64) -> Cell {
    Cell::Number(v)
}

/// 典型 AHSP 工作表：标题行、两个分析、分段、合计行、空行与噪声行
fn ahsp_sheet() -> RawSheet {
    let rows = vec![
        vec![Cell::Empty, text("Analisa Harga Satuan Pekerjaan")],
        vec![num(1.0), text("A.2.2.1"), text("Pasangan Batu Kali 1:4"), text("m3")],
        vec![text("A"), text("TENAGA KERJA")],
        vec![Cell::Empty, text("Pekerja"), text("OH"), num(1.5)],
        vec![Cell::Empty, text("Tukang batu"), text("OH"), num(0.75)],
        vec![Cell::Empty, text("JUMLAH A"), Cell::Empty, num(150000.0)],
        vec![text("B"), text("BAHAN")],
        vec![Cell::Empty, text("Batu Kali"), text("m3"), num(1.2), text("286.500")],
        vec![Cell::Empty, text("Semen Portland"), text("kg"), num(163.0)],
        vec![],
        vec![Cell::Empty, text("keterangan lain")],
        vec![num(2.0), text("A.2.2.2"), text("Plesteran 1:4 tebal 15 mm"), text("m2")],
        vec![Cell::Empty, text("Pekerja"), text("OH"), num(0.3)],
        vec![text("A"), text("Tenaga")],
        vec![Cell::Empty, text("Mandor"), text("OH"), num(0.015)],
    ];
    RawSheet::new("Pekerjaan Pasangan", rows)
}

#[test]
fn test_parse_full_sheet() {
    let parser = RecipeParser::default();
    let outcome = parser.map_sheet(&ahsp_sheet(), &SheetContext::default());

    assert_eq!(outcome.items.len(), 2);

    let first = &outcome.items[0];
    assert_eq!(first.code, "A.2.2.1");
    assert_eq!(first.description, "Pasangan Batu Kali 1:4");
    assert_eq!(first.division, "Pekerjaan Pasangan");
    let names: Vec<&str> = first
        .components
        .iter()
        .map(|c| c.component_name.as_str())
        .collect();
    assert_eq!(names, vec!["Pekerja", "Tukang batu", "Batu Kali", "Semen Portland"]);
    assert_eq!(first.components[0].section, ResourceCategory::Labor);
    assert_eq!(first.components[2].section, ResourceCategory::Material);
    assert_eq!(first.components[2].coefficient, 1.2);
    assert!(first.components.iter().all(|c| c.recipe_code == "A.2.2.1"));

    // 新表头重置分段: "Pekerja 0.3" 出现在分段之前，不计入明细
    let second = &outcome.items[1];
    assert_eq!(second.code, "A.2.2.2");
    assert_eq!(second.components.len(), 1);
    assert_eq!(second.components[0].component_name, "Mandor");
    assert_eq!(second.components[0].coefficient, 0.015);
}

#[test]
fn test_skipped_rows_are_counted() {
    let parser = RecipeParser::default();
    let outcome = parser.map_sheet(&ahsp_sheet(), &SheetContext::default());

    // 标题行、噪声行、分段前的明细 = 3 个无法识别；1 个合计；1 个空行
    assert_eq!(outcome.skipped.unrecognized, 3);
    assert_eq!(outcome.skipped.summary, 1);
    assert_eq!(outcome.skipped.blank, 1);
    assert_eq!(outcome.skipped_rows(), 5);

    let rows: Vec<usize> = outcome.diagnostics.iter().map(|d| d.row_number).collect();
    assert_eq!(rows, vec![1, 6, 10, 11, 13]);
    assert!(outcome.diagnostics.iter().all(|d| d.sheet == "Pekerjaan Pasangan"));
}

#[test]
fn test_declared_division_overrides_sheet_name() {
    let parser = RecipeParser::default();
    let outcome = parser.map_sheet(&ahsp_sheet(), &SheetContext::division("Struktur"));
    assert!(outcome.items.iter().all(|r| r.division == "Struktur"));
}

#[test]
fn test_components_before_any_header_are_skipped() {
    let parser = RecipeParser::default();
    let rows = vec![
        vec![text("B"), text("BAHAN")],
        vec![Cell::Empty, text("Batu Kali"), text("m3"), num(1.2)],
    ];
    let outcome = parser.parse_rows("Sheet1", "Sheet1", &rows);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.skipped.unrecognized, 1);
}

#[test]
fn test_header_without_components_is_kept() {
    let parser = RecipeParser::default();
    let rows = vec![
        vec![text("A.1.1"), text("Pembersihan lapangan")],
        vec![text("A.1.2"), text("Pengukuran dan pemasangan bouwplank")],
    ];
    let outcome = parser.parse_rows("Persiapan", "Persiapan", &rows);
    assert_eq!(outcome.items.len(), 2);
    assert!(outcome.items[0].components.is_empty());
    assert_eq!(outcome.skipped_rows(), 0);
}

#[test]
fn test_fixed_coefficient_column_with_numbering() {
    // 首列为序号时，配置系数列避免把序号当作系数
    let config = ParserConfig {
        coefficient_column: Some(3),
        ..ParserConfig::default()
    };
    let parser = RecipeParser::new(config);
    let rows = vec![
        vec![Cell::Empty, text("A.3.1"), text("Galian tanah biasa"), text("m3")],
        vec![text("A"), text("Tenaga kerja")],
        vec![num(1.0), text("Pekerja"), text("OH"), num(0.75)],
        vec![num(2.0), text("Mandor"), text("OH"), num(0.025)],
    ];
    let outcome = parser.parse_rows("Tanah", "Tanah", &rows);
    let recipe = &outcome.items[0];
    assert_eq!(recipe.components.len(), 2);
    assert_eq!(recipe.components[0].coefficient, 0.75);
    assert_eq!(recipe.components[1].coefficient, 0.025);
}

#[test]
fn test_text_coefficient_with_comma_decimal() {
    let parser = RecipeParser::default();
    let rows = vec![
        vec![text("A.4.1"), text("Beton mutu K-225")],
        vec![text("Bahan")],
        vec![text("Pasir beton"), text("m3"), text("0,52")],
    ];
    let outcome = parser.parse_rows("Beton", "Beton", &rows);
    let component = &outcome.items[0].components[0];
    assert_eq!(component.component_name, "Pasir beton");
    assert_eq!(component.coefficient, 0.52);
    assert_eq!(component.section, ResourceCategory::Material);
}

#[test]
fn test_state_starts_awaiting_header() {
    let parser = RecipeParser::default();
    let outcome = parser.parse_rows("Kosong", "Kosong", &[]);
    assert!(outcome.items.is_empty());
    assert_eq!(outcome.skipped_rows(), 0);
    assert_eq!(ParserState::AwaitingHeader, ParserState::AwaitingHeader);
}

#[test]
fn test_csv_three_decimal_coefficient() {
    use crate::importer::file_parser::CsvParser;

    let csv = "1,A.2.2.1,Pasangan Batu Kali 1:4,m3\nA,TENAGA KERJA\n,Mandor,OH,0.150,\"Rp 15.000\"\nB,BAHAN\n,Batu Kali,m3,1.200,286.500\n";
    let sheet = CsvParser.parse_reader("Pasangan", csv.as_bytes()).unwrap();

    let outcome = RecipeParser::default().map_sheet(&sheet, &SheetContext::default());
    assert_eq!(outcome.items.len(), 1);
    let components = &outcome.items[0].components;
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].component_name, "Mandor");
    assert_eq!(components[0].coefficient, 0.15);
    assert_eq!(components[1].component_name, "Batu Kali");
    assert_eq!(components[1].coefficient, 1.2);
}
