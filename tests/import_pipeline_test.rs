// ==========================================
// 导入流程集成测试
// ==========================================
// 测试目标: 文件 → 目录/分析/工程量 → 会话 → 报表
// ==========================================

mod test_helpers;

use rab_estimator::api::{ApiError, EstimateApi};
use rab_estimator::config::{ParserConfig, StaticConfig};
use rab_estimator::domain::types::{MatchKind, ResourceCategory, ScheduleStatus};
use rab_estimator::engine::Edit;
use rab_estimator::LineItem;
use rab_estimator::importer::{EstimateImporter, ImportError};
use rab_estimator::logging;
use std::path::Path;
use tempfile::TempDir;
use test_helpers::{assert_close, sample_files, write_file};

fn create_test_api() -> EstimateApi {
    EstimateApi::from_config(&StaticConfig::default()).expect("Failed to create EstimateApi")
}

#[test]
fn test_import_catalog_csv() {
    logging::init_test();
    let files = sample_files();
    let importer = EstimateImporter::new(ParserConfig::default());

    let result = importer.import_catalog(&files.catalog, None).unwrap();

    assert_eq!(result.catalog.len(), 5);
    assert_eq!(result.batch.total_rows, 11);
    assert_eq!(result.batch.skipped.unrecognized, 1);
    assert_eq!(result.batch.skipped.missing_price, 1);
    assert_eq!(result.batch.skipped.negative_price, 1);
    assert!(result.catalog.get_by_name("potongan retur").is_none());
    assert_eq!(result.batch.file_name.as_deref(), Some("harga_satuan.csv"));

    let pekerja = result.catalog.get_by_name("PEKERJA").unwrap();
    assert_eq!(pekerja.unit_price, 100000.0);
    assert_eq!(pekerja.category, ResourceCategory::Labor);

    let semen = result.catalog.get_by_name("semen portland").unwrap();
    assert_eq!(semen.unit_price, 1300.0);
    assert_eq!(semen.category, ResourceCategory::Material);

    // 未加引号的点分千位价格
    let kerikil = result.catalog.get_by_name("Kerikil").unwrap();
    assert_eq!(kerikil.unit_price, 286500.0);
}

#[test]
fn test_import_recipes_csv() {
    logging::init_test();
    let files = sample_files();
    let importer = EstimateImporter::new(ParserConfig::default());

    let result = importer.import_recipes(&files.recipes, Some("Pasangan")).unwrap();

    assert_eq!(result.recipes.len(), 2);
    assert_eq!(result.batch.components, 7);
    assert_eq!(result.batch.skipped.summary, 1);
    assert_eq!(result.batch.skipped.unrecognized, 1);
    assert!(result.catalog.is_empty());

    let first = &result.recipes[0];
    assert_eq!(first.code, "A.2.2.1");
    assert_eq!(first.division, "Pasangan");
    assert_eq!(first.components.len(), 5);
    // "1,2" 按系数语义解析为 1.2
    assert_eq!(first.components[2].component_name, "Batu Kali");
    assert_eq!(first.components[2].coefficient, 1.2);
    assert_eq!(first.components[2].section, ResourceCategory::Material);
}

#[test]
fn test_full_pipeline_costs() {
    logging::init_test();
    let files = sample_files();
    let mut api = create_test_api();

    api.import_catalog_file(&files.catalog, None).unwrap();
    api.import_recipe_file(&files.recipes, None).unwrap();
    let link = api.import_volume_file(&files.volumes).unwrap();

    assert_eq!(link.import.batch.skipped.missing_volume, 1);
    assert_eq!(link.linked.len(), 2);
    assert_eq!(link.added_line_nos, vec![1, 2]);
    assert_eq!(link.needs_review, 0);

    let report = api.report();

    // A.2.2.1: 150000 + 90000 + 343800 + 211900 + 0 = 795700
    let pasangan = api.recipe_cost("A.2.2.1").unwrap();
    assert_close(pasangan.base_cost, 795700.0);
    assert_close(pasangan.unit_price, 795700.0 * 1.15);
    assert_eq!(pasangan.unresolved_count, 1);

    // A.4.4.1: "Semen" 回退命中目录中第一个包含它的条目（Semen Portland）
    let plester = api.recipe_cost("A.4.4.1").unwrap();
    assert_eq!(plester.components[1].match_kind, MatchKind::Fallback);
    assert_eq!(plester.components[1].matched_name.as_deref(), Some("Semen Portland"));
    assert_close(plester.base_cost, 30000.0 + 6.24 * 1300.0);

    assert_eq!(report.line_items.len(), 2);
    assert_eq!(report.line_items[0].division, "Pondasi");
    assert_eq!(report.line_items[1].volume, 25.5);
    assert_close(
        report.summary.subtotal,
        10.0 * pasangan.unit_price + 25.5 * plester.unit_price,
    );
    assert_close(report.summary.grand_total, report.summary.subtotal * 1.11);

    assert_eq!(report.diagnostics.unresolved_count(), 1);
    assert_eq!(report.diagnostics.fallback_matches, 1);
    assert_eq!(report.schedule.status, ScheduleStatus::Ready);
    assert_eq!(report.schedule.points.len(), 4);
    assert_close(report.schedule.points[3].cumulative_pct, 100.0);
}

#[test]
fn test_unreadable_file_leaves_session_untouched() {
    logging::init_test();
    let files = sample_files();
    let mut api = create_test_api();
    api.import_catalog_file(&files.catalog, None).unwrap();
    let before = api.session().results().clone();

    let err = api
        .import_recipe_file(Path::new("/nonexistent/ahsp.csv"), None)
        .unwrap_err();
    assert!(matches!(err, ApiError::ImportError(_)));

    let dir = TempDir::new().unwrap();
    let unsupported = write_file(&dir, "ahsp.txt", "A.1,Galian");
    assert!(api.import_recipe_file(&unsupported, None).is_err());

    assert_eq!(api.session().results(), &before);
    assert_eq!(api.session().catalog().len(), 5);
}

#[test]
fn test_importer_reports_missing_file() {
    let importer = EstimateImporter::new(ParserConfig::default());
    let result = importer.import_catalog(Path::new("/nonexistent/harga.csv"), None);
    assert!(matches!(result, Err(ImportError::FileNotFound(_))));
}

#[test]
fn test_reimporting_catalog_reprices_recipes() {
    logging::init_test();
    let files = sample_files();
    let mut api = create_test_api();
    api.import_catalog_file(&files.catalog, None).unwrap();
    api.import_recipe_file(&files.recipes, None).unwrap();
    api.apply_edit(Edit::SetOverheadPct { pct: 0.0 }).unwrap();

    let batu = |api: &EstimateApi| {
        api.recipe_cost("A.2.2.1").unwrap().components[2].subtotal
    };
    assert_close(batu(&api), 343800.0);

    let dir = TempDir::new().unwrap();
    let update = write_file(
        &dir,
        "harga_revisi.csv",
        "KODE,URAIAN,SATUAN,HARGA\nM.01,batu kali,m3,300000\n",
    );
    api.import_catalog_file(&update, Some(ResourceCategory::Material)).unwrap();

    assert_close(batu(&api), 360000.0);
    assert_eq!(api.session().catalog().len(), 5);
}

#[test]
fn test_far_future_volume_rows_do_not_break_schedule() {
    logging::init_test();
    let files = sample_files();
    let mut api = create_test_api();
    api.import_catalog_file(&files.catalog, None).unwrap();
    api.import_recipe_file(&files.recipes, None).unwrap();

    let dir = TempDir::new().unwrap();
    let volumes = write_file(
        &dir,
        "volume_jauh.csv",
        "URAIAN_PEKERJAAN,VOLUME,LOKASI,MINGGU_MULAI,DURASI_MINGGU\n\
         Pasangan batu kali 1:4,10,Pondasi,5e9,2\n\
         Plesteran 1:4 tebal 15 mm,4,Dinding,2,3\n",
    );
    let link = api.import_volume_file(&volumes).unwrap();
    assert_eq!(link.import.batch.skipped.invalid_week, 1);
    assert_eq!(link.added_line_nos, vec![1]);

    let report = api.report();
    assert_eq!(report.schedule.status, ScheduleStatus::Ready);
    assert_eq!(report.schedule.points.len(), 4);

    let err = api
        .apply_edit(Edit::AddLineItem {
            item: LineItem::new(9, "Pondasi", "Galian", "A.2.2.1", 1.0).with_schedule(u32::MAX, 2),
        })
        .unwrap_err();
    assert!(matches!(err, ApiError::ValidationError { .. }));
    assert_eq!(api.session().project().line_items.len(), 1);
}
