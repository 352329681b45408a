// ==========================================
// RAB 估价引擎 - 命令行入口
// ==========================================
// 流程: 读取配置 → 导入目录/分析/工程量 → 全量重算 → 输出汇总
// 用法:
//   rab-estimator --catalog harga.xlsx --recipes ahsp.xlsx --volumes volume.csv
//   rab-estimator --recipes ahsp.csv --overhead 10 --json
// ==========================================

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;

use rab_estimator::api::{EstimateApi, EstimateReport, ImportReport};
use rab_estimator::config::{ConfigManager, EstimateConfigReader, StaticConfig};
use rab_estimator::engine::Edit;
use rab_estimator::{db, i18n, logging, ResourceCategory, APP_NAME, VERSION};

/// 目录文件声明的资源类别
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryArg {
    Labor,
    Material,
    Equipment,
}

impl From<CategoryArg> for ResourceCategory {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Labor => ResourceCategory::Labor,
            CategoryArg::Material => ResourceCategory::Material,
            CategoryArg::Equipment => ResourceCategory::Equipment,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rab-estimator")]
#[command(about = "RAB estimator: AHSP unit-price analysis and cost rollups")]
#[command(version)]
struct Args {
    /// Price catalog file (.xlsx/.xls/.ods/.csv)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Category declared for the catalog file
    #[arg(long, value_enum)]
    catalog_category: Option<CategoryArg>,

    /// AHSP recipe files
    #[arg(long, num_args = 1..)]
    recipes: Vec<PathBuf>,

    /// Division label for single-sheet recipe files (defaults to the sheet name)
    #[arg(long)]
    division: Option<String>,

    /// Volume template to link against the imported recipes
    #[arg(long)]
    volumes: Option<PathBuf>,

    /// SQLite configuration database
    #[arg(long, env = "RAB_CONFIG_DB")]
    config_db: Option<PathBuf>,

    /// Use the per-user configuration database in the data directory
    #[arg(long, conflicts_with = "config_db")]
    user_config: bool,

    /// Write the effective overhead/tax back to the configuration database
    #[arg(long)]
    save_rates: bool,

    /// Override the overhead percentage
    #[arg(long)]
    overhead: Option<f64>,

    /// Override the tax percentage
    #[arg(long)]
    tax: Option<f64>,

    /// Message language (id / en)
    #[arg(long, default_value = "id", env = "RAB_LOCALE")]
    locale: String,

    /// Number of most expensive line items to list
    #[arg(long, default_value_t = 5)]
    top: usize,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    i18n::set_locale(&args.locale);
    info!(version = VERSION, "{} 启动", APP_NAME);

    let config_path = match (&args.config_db, args.user_config) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => {
            let path = db::default_db_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("无法创建数据目录: {}", parent.display()))?;
            }
            Some(path)
        }
        (None, false) => None,
    };

    let manager = match &config_path {
        Some(path) => {
            let db_path = path.to_string_lossy().to_string();
            info!(db_path = %db_path, "使用配置库");
            Some(
                ConfigManager::new(&db_path)
                    .with_context(|| format!("无法打开配置库: {}", db_path))?,
            )
        }
        None => None,
    };

    let mut api = match &manager {
        Some(manager) => build_api(manager)?,
        None => build_api(&StaticConfig::default())?,
    };

    if let Some(pct) = args.overhead {
        api.apply_edit(Edit::SetOverheadPct { pct })?;
    }
    if let Some(pct) = args.tax {
        api.apply_edit(Edit::SetTaxPct { pct })?;
    }
    if args.save_rates {
        match &manager {
            Some(manager) => api.persist_rates(manager)?,
            None => anyhow::bail!("--save-rates 需要 --config-db 或 --user-config"),
        }
    }

    if let Some(path) = &args.catalog {
        let report = api
            .import_catalog_file(path, args.catalog_category.map(Into::into))
            .with_context(|| format!("目录导入失败: {}", path.display()))?;
        print_import(&report, args.json);
    }

    for path in &args.recipes {
        let report = api
            .import_recipe_file(path, args.division.as_deref())
            .with_context(|| format!("分析导入失败: {}", path.display()))?;
        print_import(&report, args.json);
    }

    if let Some(path) = &args.volumes {
        let link = api
            .import_volume_file(path)
            .with_context(|| format!("工程量导入失败: {}", path.display()))?;
        print_import(&link.import, args.json);
        if !args.json {
            for row in link.linked.iter().filter(|l| l.needs_review) {
                eprintln!(
                    "{}",
                    i18n::t_with_args(
                        "link.needs_review",
                        &[
                            ("row", &row.row.row_number.to_string()),
                            ("score", &format!("{:.1}", row.score)),
                        ],
                    )
                );
            }
        }
    }

    if args.json {
        println!("{}", api.report_json()?);
    } else {
        print_report(&api.report(), &api, args.top);
    }
    Ok(())
}

fn build_api<C: EstimateConfigReader + ?Sized>(config: &C) -> Result<EstimateApi> {
    EstimateApi::from_config(config).context("无法读取估价配置")
}

fn print_import(report: &ImportReport, json: bool) {
    // JSON 模式下 stdout 只输出最终报表
    if json {
        return;
    }
    for line in &report.messages {
        eprintln!("{}", line);
    }
}

fn print_report(report: &EstimateReport, api: &EstimateApi, top: usize) {
    if !report.project.name.is_empty() {
        println!("{} - {}", report.project.name, report.project.location);
    }

    println!("\n== Analisa ({}) ==", report.recipe_costs.len());
    for row in &report.recipe_costs {
        println!(
            "{:<12} {:<40} {:>16.2}",
            row.code,
            truncate(&row.description, 40),
            row.unit_price
        );
    }

    println!("\n== Divisi ==");
    for division in &report.divisions {
        println!(
            "{:<30} {:>4} {:>18.2}",
            truncate(&division.division, 30),
            division.item_count,
            division.total_cost
        );
    }

    println!("\n== Kebutuhan Sumber Daya ==");
    for material in &report.materials {
        println!(
            "{:<36} {:>12.4} {:<6} {:>18.2}",
            truncate(&material.component_name, 36),
            material.total_quantity,
            material.unit,
            material.total_cost
        );
    }

    if top > 0 && !report.line_items.is_empty() {
        println!("\n== Top {} ==", top);
        for item in api.top_line_items(top) {
            println!(
                "{:>4} {:<40} {:>18.2}",
                item.line_no,
                truncate(&item.description, 40),
                item.total_cost
            );
        }
    }

    if report.schedule.is_ready() {
        println!("\n== Kurva S ==");
        for point in &report.schedule.points {
            println!(
                "M{:<3} {:>8.2}% {:>8.2}%",
                point.week_index, point.weekly_weight_pct, point.cumulative_pct
            );
        }
    }

    println!("\nSubtotal      {:>18.2}", report.summary.subtotal);
    println!(
        "PPN {:>5.1}%    {:>18.2}",
        report.summary.tax_pct, report.summary.tax_amount
    );
    println!("Grand total   {:>18.2}", report.summary.grand_total);

    for line in &report.messages {
        eprintln!("{}", line);
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}
