// ==========================================
// RAB 估价引擎 - 修改操作校验器
// ==========================================
// 职责: 在修改进入会话前校验数值边界
// 规则: volume ≥ 0；start_week ≥ 1；duration_weeks ≥ 1；
//       结束周 ≤ MAX_SCHEDULE_WEEK；百分比与单价有限且 ≥ 0；明细行号唯一
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::catalog::ResourceItem;
use crate::domain::project::{LineItem, Project, MAX_SCHEDULE_WEEK};
use crate::engine::session::Edit;

// ==========================================
// ValidationMode - 校验模式
// ==========================================

/// 校验模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationMode {
    /// 严格模式：任何违规都返回错误
    Strict,
    /// 自动修复模式：周次小于 1 时修正为 1，其余违规仍返回错误
    AutoFix,
}

// ==========================================
// EditValidator - 修改操作校验器
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct EditValidator {
    mode: ValidationMode,
}

impl Default for EditValidator {
    fn default() -> Self {
        Self::new(ValidationMode::Strict)
    }
}

impl EditValidator {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// 校验修改操作
    ///
    /// # 参数
    /// - edit: 待应用的修改
    /// - project: 当前项目（用于行号唯一性检查）
    ///
    /// # 返回
    /// - Ok(Edit): 校验通过（AutoFix 模式下可能已修正）
    /// - Err(ApiError::ValidationError): 校验失败，带全部违规明细
    pub fn validate(&self, edit: Edit, project: &Project) -> ApiResult<Edit> {
        let mut violations = Vec::new();

        let edit = match edit {
            Edit::AddLineItem { item } => {
                let item = self.check_line_item(item, &mut violations);
                if project.find_line_item(item.line_no).is_some() {
                    violations.push(duplicate_line_no(item.line_no));
                }
                Edit::AddLineItem { item }
            }
            Edit::AddLineItems { items } => {
                let mut seen: HashSet<u32> =
                    project.line_items.iter().map(|item| item.line_no).collect();
                let items = items
                    .into_iter()
                    .map(|item| {
                        let item = self.check_line_item(item, &mut violations);
                        if !seen.insert(item.line_no) {
                            violations.push(duplicate_line_no(item.line_no));
                        }
                        item
                    })
                    .collect();
                Edit::AddLineItems { items }
            }
            Edit::UpdateLineItem { item } => Edit::UpdateLineItem {
                item: self.check_line_item(item, &mut violations),
            },
            Edit::SetOverheadPct { pct } => {
                check_non_negative("global_overhead_pct", pct, "INVALID_PCT", &mut violations);
                Edit::SetOverheadPct { pct }
            }
            Edit::SetTaxPct { pct } => {
                check_non_negative("global_tax_pct", pct, "INVALID_PCT", &mut violations);
                Edit::SetTaxPct { pct }
            }
            Edit::SetResourcePrice { name, unit_price } => {
                check_non_negative("unit_price", unit_price, "INVALID_PRICE", &mut violations);
                Edit::SetResourcePrice { name, unit_price }
            }
            Edit::UpsertResource { item } => {
                check_resource(&item, &mut violations);
                Edit::UpsertResource { item }
            }
            Edit::ImportCatalog { catalog } => {
                for item in catalog.items() {
                    check_resource(item, &mut violations);
                }
                Edit::ImportCatalog { catalog }
            }
            other => other,
        };

        if violations.is_empty() {
            return Ok(edit);
        }
        Err(ApiError::ValidationError {
            reason: format!("{}校验失败，{}个违规", edit.name(), violations.len()),
            violations,
        })
    }

    fn check_line_item(&self, mut item: LineItem, violations: &mut Vec<ValidationViolation>) -> LineItem {
        if !item.volume.is_finite() || item.volume < 0.0 {
            violations.push(
                ValidationViolation::new(
                    "NEGATIVE_VOLUME",
                    "volume",
                    format!("工程量必须 ≥ 0，实际为{}", item.volume),
                )
                .at_line(item.line_no),
            );
        }

        for (field, value) in [("start_week", item.start_week), ("duration_weeks", item.duration_weeks)] {
            if value >= 1 {
                continue;
            }
            match self.mode {
                ValidationMode::Strict => violations.push(
                    ValidationViolation::new("INVALID_WEEK", field, format!("{}必须 ≥ 1", field))
                        .at_line(item.line_no),
                ),
                ValidationMode::AutoFix => {
                    warn!(line_no = item.line_no, field, "AutoFix模式: 周次修正为 1");
                }
            }
        }
        if self.mode == ValidationMode::AutoFix {
            item.start_week = item.start_week.max(1);
            item.duration_weeks = item.duration_weeks.max(1);
        }

        let window = item.window();
        if !window.within_limit() {
            violations.push(
                ValidationViolation::new(
                    "INVALID_WEEK",
                    "duration_weeks",
                    format!(
                        "结束周必须 ≤ {}，实际开始周{}、工期{}",
                        MAX_SCHEDULE_WEEK, window.start, window.duration
                    ),
                )
                .at_line(item.line_no),
            );
        }
        item
    }
}

fn check_resource(item: &ResourceItem, violations: &mut Vec<ValidationViolation>) {
    if item.name.trim().is_empty() {
        violations.push(ValidationViolation::new("MISSING_NAME", "name", "资源名称不能为空"));
    }
    check_non_negative("unit_price", item.unit_price, "INVALID_PRICE", violations);
}

fn check_non_negative(
    field: &str,
    value: f64,
    violation_type: &str,
    violations: &mut Vec<ValidationViolation>,
) {
    if !value.is_finite() || value < 0.0 {
        violations.push(ValidationViolation::new(
            violation_type,
            field,
            format!("{}必须为有限且 ≥ 0 的数值，实际为{}", field, value),
        ));
    }
}

fn duplicate_line_no(line_no: u32) -> ValidationViolation {
    ValidationViolation::new("DUPLICATE_LINE_NO", "line_no", format!("行号{}已存在", line_no))
        .at_line(line_no)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        let mut project = Project::default();
        project.line_items.push(LineItem::new(1, "Struktur", "Pondasi", "A.1", 10.0));
        project
    }

    fn violations_of(result: ApiResult<Edit>) -> Vec<ValidationViolation> {
        match result {
            Err(ApiError::ValidationError { violations, .. }) => violations,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_collects_all_violations() {
        let validator = EditValidator::default();
        let item = LineItem::new(1, "Struktur", "Kolom", "A.1", -2.0).with_schedule(0, 0);
        let violations = violations_of(validator.validate(Edit::AddLineItem { item }, &project()));

        let types: Vec<&str> = violations.iter().map(|v| v.violation_type.as_str()).collect();
        assert_eq!(
            types,
            vec!["NEGATIVE_VOLUME", "INVALID_WEEK", "INVALID_WEEK", "DUPLICATE_LINE_NO"]
        );
        assert!(violations.iter().all(|v| v.line_no == Some(1)));
    }

    #[test]
    fn test_autofix_clamps_weeks() {
        let validator = EditValidator::new(ValidationMode::AutoFix);
        let item = LineItem::new(2, "Struktur", "Kolom", "A.1", 2.0).with_schedule(0, 0);
        let edit = validator.validate(Edit::AddLineItem { item }, &project()).unwrap();
        match edit {
            Edit::AddLineItem { item } => {
                assert_eq!(item.start_week, 1);
                assert_eq!(item.duration_weeks, 1);
            }
            _ => panic!("Expected AddLineItem"),
        }
    }

    #[test]
    fn test_batch_duplicates_within_batch() {
        let validator = EditValidator::default();
        let items = vec![
            LineItem::new(2, "A", "a", "A.1", 1.0),
            LineItem::new(2, "A", "b", "A.1", 1.0),
        ];
        let violations = violations_of(validator.validate(Edit::AddLineItems { items }, &project()));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].line_no, Some(2));
    }

    #[test]
    fn test_percentages_must_be_finite_and_non_negative() {
        let validator = EditValidator::default();
        assert!(validator.validate(Edit::SetOverheadPct { pct: 15.0 }, &project()).is_ok());
        assert!(validator.validate(Edit::SetTaxPct { pct: 0.0 }, &project()).is_ok());

        let violations = violations_of(validator.validate(Edit::SetTaxPct { pct: -1.0 }, &project()));
        assert_eq!(violations[0].violation_type, "INVALID_PCT");
        assert!(validator
            .validate(Edit::SetOverheadPct { pct: f64::NAN }, &project())
            .is_err());
    }

    #[test]
    fn test_other_edits_pass_through() {
        let validator = EditValidator::default();
        let edit = Edit::RemoveLineItem { line_no: 1 };
        assert_eq!(validator.validate(edit.clone(), &project()).unwrap(), edit);
    }

    #[test]
    fn test_week_beyond_limit_rejected_in_both_modes() {
        let item = LineItem::new(2, "Struktur", "Kolom", "A.1", 1.0).with_schedule(u32::MAX, 2);
        for mode in [ValidationMode::Strict, ValidationMode::AutoFix] {
            let validator = EditValidator::new(mode);
            let violations = violations_of(
                validator.validate(Edit::AddLineItem { item: item.clone() }, &project()),
            );
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].violation_type, "INVALID_WEEK");
            assert_eq!(violations[0].line_no, Some(2));
        }

        let edge = LineItem::new(2, "Struktur", "Kolom", "A.1", 1.0)
            .with_schedule(MAX_SCHEDULE_WEEK, 1);
        assert!(EditValidator::default()
            .validate(Edit::AddLineItem { item: edge }, &project())
            .is_ok());
    }

    #[test]
    fn test_imported_catalog_prices_checked() {
        use crate::domain::catalog::Catalog;
        use crate::domain::types::ResourceCategory;

        let catalog = Catalog::from_items(vec![
            ResourceItem::new("M.01", "Batu Kali", "m3", 286500.0, ResourceCategory::Material),
            ResourceItem::new("M.09", "Potongan retur", "ls", -1500.0, ResourceCategory::Material),
        ]);
        let violations = violations_of(
            EditValidator::default().validate(Edit::ImportCatalog { catalog }, &project()),
        );
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].violation_type, "INVALID_PRICE");
    }
}
