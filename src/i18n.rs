// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持印尼语（默认）和英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::import::ImportBatch;
use crate::domain::report::Diagnostics;
use crate::domain::types::ScheduleStatus;

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言
///
/// # 参数
/// - locale: 语言代码（"id" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use rab_estimator::i18n::t;
/// let msg = t("recompute.clean");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use rab_estimator::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/ahsp.csv")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 导入批次的用户提示（每个非零计数一行）
pub fn describe_import(batch: &ImportBatch) -> Vec<String> {
    let mut lines = vec![t_with_args(
        "import.batch_done",
        &[
            ("file", batch.file_name.as_deref().unwrap_or("-")),
            ("imported", &batch.accepted.to_string()),
            ("total", &batch.total_rows.to_string()),
        ],
    )];

    let counters = [
        ("import.skipped_blank", batch.skipped.blank),
        ("import.skipped_unrecognized", batch.skipped.unrecognized),
        ("import.skipped_summary", batch.skipped.summary),
        ("import.skipped_missing_name", batch.skipped.missing_name),
        ("import.skipped_missing_price", batch.skipped.missing_price),
        ("import.skipped_missing_volume", batch.skipped.missing_volume),
        ("import.skipped_negative_price", batch.skipped.negative_price),
        ("import.skipped_invalid_week", batch.skipped.invalid_week),
    ];
    if !batch.skipped_sheets.is_empty() {
        lines.push(t_with_args(
            "import.skipped_sheets",
            &[("sheets", &batch.skipped_sheets.join(", "))],
        ));
    }
    for (key, count) in counters {
        if count > 0 {
            lines.push(t_with_args(key, &[("count", &count.to_string())]));
        }
    }
    lines
}

/// 重算诊断的用户提示
pub fn describe_diagnostics(diagnostics: &Diagnostics) -> Vec<String> {
    if diagnostics.is_clean() && diagnostics.fallback_matches == 0 {
        return vec![t("recompute.clean")];
    }

    let mut lines = Vec::new();
    for unresolved in &diagnostics.unresolved_components {
        lines.push(t_with_args(
            "recompute.unresolved_component",
            &[
                ("name", unresolved.component_name.as_str()),
                ("code", unresolved.recipe_code.as_str()),
            ],
        ));
    }
    if diagnostics.fallback_matches > 0 {
        lines.push(t_with_args(
            "recompute.fallback_matches",
            &[("count", &diagnostics.fallback_matches.to_string())],
        ));
    }
    for line_no in &diagnostics.unknown_recipe_refs {
        lines.push(t_with_args(
            "recompute.unknown_recipe_ref",
            &[("line", &line_no.to_string())],
        ));
    }
    if diagnostics.schedule_status == ScheduleStatus::InsufficientData {
        lines.push(t("recompute.schedule_insufficient"));
    }
    lines
}
